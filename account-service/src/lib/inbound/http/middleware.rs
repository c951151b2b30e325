use std::collections::HashMap;
use std::sync::Arc;

use auth::scope::AuthRequirement;
use auth::AuthorizationError;
use auth::Authenticator;
use axum::extract::Path;
use axum::extract::Request;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::{self};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;

use crate::inbound::http::handlers::ApiError;

/// Route-group authentication state: the verifier plus what the group
/// demands of a token.
#[derive(Clone)]
pub struct Guard {
    authenticator: Arc<Authenticator>,
    requirement: Arc<AuthRequirement>,
}

impl Guard {
    pub fn new(authenticator: Arc<Authenticator>, requirement: AuthRequirement) -> Self {
        Self {
            authenticator,
            requirement: Arc::new(requirement),
        }
    }
}

/// Why the guard refused a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardRejection {
    MissingToken,
    Rejected(AuthorizationError),
}

impl IntoResponse for GuardRejection {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            GuardRejection::MissingToken => (
                StatusCode::UNAUTHORIZED,
                ApiError::Unauthorized("Missing Authorization header".to_string()),
            ),
            GuardRejection::Rejected(AuthorizationError::Forbidden) => (
                StatusCode::FORBIDDEN,
                ApiError::Forbidden(AuthorizationError::Forbidden.to_string()),
            ),
            GuardRejection::Rejected(e) => {
                (StatusCode::UNAUTHORIZED, ApiError::InvalidToken(e.to_string()))
            }
        };

        (status, error).into_response()
    }
}

/// Middleware that verifies the bearer token against the route group's
/// requirement and adds the verified claims to request extensions.
pub async fn authenticate(
    State(guard): State<Guard>,
    params: Option<Path<HashMap<String, String>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, GuardRejection> {
    let token = extract_token_from_header(&req).ok_or_else(|| {
        tracing::warn!(uri = %req.uri(), "Missing Authorization header");
        GuardRejection::MissingToken
    })?;

    let params = params.map(|Path(params)| params).unwrap_or_default();

    let claims = guard
        .authenticator
        .authorize(token, &guard.requirement, &params)
        .map_err(|e| {
            tracing::warn!(uri = %req.uri(), "Token rejected: {}", e);
            GuardRejection::Rejected(e)
        })?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Accepts `Bearer <token>` as well as a bare token.
fn extract_token_from_header(req: &Request) -> Option<&str> {
    let auth_str = req
        .headers()
        .get(http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .trim();

    if auth_str.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = match auth_str.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => token.trim(),
        _ => auth_str,
    };

    (!token.is_empty()).then_some(token)
}

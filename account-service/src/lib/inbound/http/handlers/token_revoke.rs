use axum::extract::rejection::JsonRejection;
use axum::extract::Path;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::domain::user::models::UserId;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::router::AppState;
use crate::inbound::http::validation::Violations;
use crate::user::errors::UserError;
use crate::user::ports::UserServicePort;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TokenRevokeRequest {
    pub user_id: Option<Value>,
    #[serde(flatten)]
    pub unknown: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRevokeResponseData {
    pub rows_affected: u64,
}

/// Rotate the user's `jti`. The body must name the same user as the path,
/// which is what the guard authorised.
pub async fn token_revoke(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<TokenRevokeRequest>, JsonRejection>,
) -> Result<ApiSuccess<TokenRevokeResponseData>, ApiError> {
    let path_id = UserId::from_string(&id).map_err(UserError::from)?;
    let Json(req) = body?;

    let mut violations = Violations::new();
    match violations.user_id("userId", req.user_id) {
        Some(user_id) if user_id != path_id => {
            violations.push("userId", "\"userId\" must match the user in the path");
        }
        _ => {}
    }
    violations.unknown(&req.unknown);
    violations.finish()?;

    state
        .user_service
        .revoke(&path_id)
        .await
        .map_err(ApiError::from)
        .map(|rows_affected| ApiSuccess::new(TokenRevokeResponseData { rows_affected }))
}

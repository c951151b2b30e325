use axum::extract::State;
use axum::Extension;
use serde::Serialize;

use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::router::AppState;
use crate::user::ports::UserServicePort;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAccessResponseData {
    pub access_token: String,
}

/// Exchange the refresh token verified by the guard for an access token.
pub async fn token_access(
    State(state): State<AppState>,
    Extension(claims): Extension<auth::Claims>,
) -> Result<ApiSuccess<TokenAccessResponseData>, ApiError> {
    state
        .user_service
        .issue_access_token(&claims)
        .await
        .map_err(ApiError::from)
        .map(|access_token| ApiSuccess::new(TokenAccessResponseData { access_token }))
}

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::Map;
use serde_json::Value;

use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::router::AppState;
use crate::inbound::http::validation::Violations;
use crate::user::ports::UserServicePort;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub user_id: Option<Value>,
    #[serde(flatten)]
    pub unknown: Map<String, Value>,
}

/// Generates a new password for the user. The password is delivered
/// out-of-band and never echoed to the caller.
pub async fn reset_password(
    State(state): State<AppState>,
    body: Result<Json<ResetPasswordRequest>, JsonRejection>,
) -> Result<ApiSuccess<()>, ApiError> {
    let Json(req) = body?;

    let mut violations = Violations::new();
    let user_id = violations.user_id("userId", req.user_id);
    violations.unknown(&req.unknown);
    let Some(user_id) = user_id else {
        return Err(violations.into());
    };
    violations.finish()?;

    state
        .user_service
        .reset_password(&user_id)
        .await
        .map_err(ApiError::from)
        .map(|_| ApiSuccess::new(()))
}

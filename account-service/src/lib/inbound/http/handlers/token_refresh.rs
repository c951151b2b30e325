use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::LoginCommand;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::router::AppState;
use crate::inbound::http::validation;
use crate::inbound::http::validation::Violations;
use crate::user::ports::UserServicePort;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TokenRefreshRequest {
    pub email: Option<Value>,
    pub password: Option<Value>,
    #[serde(flatten)]
    pub unknown: Map<String, Value>,
}

impl TokenRefreshRequest {
    fn try_into_command(self) -> Result<LoginCommand, ApiError> {
        let mut violations = Violations::new();

        let email = violations.required("email", self.email, EmailAddress::new);
        let password = violations.required("password", self.password, validation::any);
        violations.unknown(&self.unknown);

        let (Some(email), Some(password)) = (email, password) else {
            return Err(violations.into());
        };
        violations.finish()?;

        Ok(LoginCommand { email, password })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRefreshResponseData {
    pub refresh_token: String,
}

/// Log in with email and password, receiving a refresh token.
pub async fn token_refresh(
    State(state): State<AppState>,
    body: Result<Json<TokenRefreshRequest>, JsonRejection>,
) -> Result<ApiSuccess<TokenRefreshResponseData>, ApiError> {
    let Json(req) = body?;

    state
        .user_service
        .issue_refresh_token(req.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|refresh_token| ApiSuccess::new(TokenRefreshResponseData { refresh_token }))
}

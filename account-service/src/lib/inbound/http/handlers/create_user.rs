use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use super::get_user::UserResponseData;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::DisplayName;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Password;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::Registration;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;
use crate::inbound::http::validation::Violations;

pub async fn create_user(
    State(state): State<AppState>,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<ApiSuccess<CreateUserResponseData>, ApiError> {
    let Json(body) = body?;

    state
        .user_service
        .register(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|registration| ApiSuccess::new(registration.into()))
}

/// HTTP request body for registering a user (raw JSON)
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateUserRequest {
    username: Option<Value>,
    email: Option<Value>,
    password: Option<Value>,
    display_name: Option<Value>,
    return_token: Option<Value>,
    #[serde(flatten)]
    unknown: Map<String, Value>,
}

impl CreateUserRequest {
    fn try_into_command(self) -> Result<RegisterCommand, ApiError> {
        let mut violations = Violations::new();

        let username = violations.required("username", self.username, Username::new);
        let email = violations.required("email", self.email, EmailAddress::new);
        let password = violations.required("password", self.password, Password::new);
        let display_name = violations.optional("displayName", self.display_name, DisplayName::new);
        let return_token = violations.boolean("returnToken", self.return_token);
        violations.unknown(&self.unknown);

        let (Some(username), Some(email), Some(password), Some(display_name), Some(return_token)) =
            (username, email, password, display_name, return_token)
        else {
            return Err(violations.into());
        };
        violations.finish()?;

        Ok(RegisterCommand {
            username,
            email,
            password,
            display_name,
            return_token: return_token.unwrap_or(true),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserResponseData {
    pub user: UserResponseData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

impl From<Registration> for CreateUserResponseData {
    fn from(registration: Registration) -> Self {
        let (refresh_token, access_token) = match registration.tokens {
            Some(tokens) => (Some(tokens.refresh_token), Some(tokens.access_token)),
            None => (None, None),
        };

        Self {
            user: registration.user.profile().into(),
            refresh_token,
            access_token,
        }
    }
}

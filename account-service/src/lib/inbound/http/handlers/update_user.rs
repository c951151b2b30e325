use axum::extract::rejection::JsonRejection;
use axum::extract::Path;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::Map;
use serde_json::Value;

use crate::domain::user::models::DisplayName;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::router::AppState;
use crate::inbound::http::validation::Violations;
use crate::user::errors::UserError;
use crate::user::ports::UserServicePort;

/// HTTP request body for updating a user (raw JSON)
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub username: Option<Value>,
    pub email: Option<Value>,
    pub display_name: Option<Value>,
    #[serde(flatten)]
    pub unknown: Map<String, Value>,
}

impl UpdateUserRequest {
    fn try_into_command(self) -> Result<UpdateUserCommand, ApiError> {
        let mut violations = Violations::new();

        let username = violations.optional("username", self.username, Username::new);
        let email = violations.optional("email", self.email, EmailAddress::new);
        let display_name = violations.optional("displayName", self.display_name, DisplayName::new);
        violations.unknown(&self.unknown);

        let (Some(username), Some(email), Some(display_name)) = (username, email, display_name)
        else {
            return Err(violations.into());
        };
        violations.finish()?;

        Ok(UpdateUserCommand {
            username,
            email,
            display_name,
        })
    }
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<ApiSuccess<()>, ApiError> {
    let user_id = UserId::from_string(&id).map_err(UserError::from)?;
    let Json(req) = body?;
    let command = req.try_into_command()?;

    state
        .user_service
        .update_user(&user_id, command)
        .await
        .map_err(ApiError::from)
        .map(|_| ApiSuccess::new(()))
}

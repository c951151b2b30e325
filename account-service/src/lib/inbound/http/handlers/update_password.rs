use axum::extract::rejection::JsonRejection;
use axum::extract::Path;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::Map;
use serde_json::Value;

use crate::domain::user::models::Password;
use crate::domain::user::models::UpdatePasswordCommand;
use crate::domain::user::models::UserId;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::router::AppState;
use crate::inbound::http::validation;
use crate::inbound::http::validation::Violations;
use crate::user::errors::UserError;
use crate::user::ports::UserServicePort;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub password: Option<Value>,
    pub new_password: Option<Value>,
    pub confirm_password: Option<Value>,
    #[serde(flatten)]
    pub unknown: Map<String, Value>,
}

impl UpdatePasswordRequest {
    fn try_into_command(self) -> Result<UpdatePasswordCommand, ApiError> {
        let mut violations = Violations::new();

        let password = violations.required("password", self.password, |password| {
            Password::new(password).map(Password::into_inner)
        });
        let new_password = violations.required("newPassword", self.new_password, Password::new);
        let confirm_password =
            violations.required("confirmPassword", self.confirm_password, validation::any);
        violations.unknown(&self.unknown);

        if let (Some(password), Some(new_password)) = (&password, &new_password) {
            if password == new_password.as_str() {
                violations.push("newPassword", "\"newPassword\" cannot match \"password\"");
            }
        }
        if let (Some(new_password), Some(confirm_password)) = (&new_password, &confirm_password) {
            if new_password.as_str() != confirm_password {
                violations.push(
                    "confirmPassword",
                    "\"confirmPassword\" must match \"newPassword\"",
                );
            }
        }

        match (password, new_password, violations.is_empty()) {
            (Some(password), Some(new_password), true) => Ok(UpdatePasswordCommand {
                password,
                new_password,
            }),
            _ => Err(violations.into()),
        }
    }
}

pub async fn update_password(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdatePasswordRequest>, JsonRejection>,
) -> Result<ApiSuccess<()>, ApiError> {
    let user_id = UserId::from_string(&id).map_err(UserError::from)?;
    let Json(req) = body?;

    state
        .user_service
        .update_password(&user_id, req.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|_| ApiSuccess::new(()))
}

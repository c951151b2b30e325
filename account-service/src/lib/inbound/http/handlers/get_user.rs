use axum::extract::Path;
use axum::extract::State;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserProfile;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<ApiSuccess<UserResponseData>, ApiError> {
    let user_id = UserId::from_string(&user_id).map_err(UserError::from)?;

    state
        .user_service
        .get_user(&user_id)
        .await
        .map_err(ApiError::from)
        .map(|user| ApiSuccess::new(user.profile().into()))
}

/// Safe user projection; credentials and flags never appear here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponseData {
    pub username: String,
    pub email: String,
    pub display_name: Option<String>,
}

impl From<UserProfile> for UserResponseData {
    fn from(profile: UserProfile) -> Self {
        Self {
            username: profile.username.as_str().to_string(),
            email: profile.email.as_str().to_string(),
            display_name: profile.display_name.map(|name| name.as_str().to_string()),
        }
    }
}

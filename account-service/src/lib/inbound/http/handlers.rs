use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;

use crate::inbound::http::validation::FieldViolation;
use crate::user::errors::UserError;

pub mod create_user;
pub mod delete_user;
pub mod get_user;
pub mod health;
pub mod reset_password;
pub mod token_access;
pub mod token_refresh;
pub mod token_revoke;
pub mod update_password;
pub mod update_user;

/// Application status carried in every response envelope.
///
/// The transport status stays 200 for all of these; only the guard answers
/// with 401 or 403.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiStatus {
    Ok,
    Unauthorized,
    ValidationError,
    InvalidToken,
    Forbidden,
    AccountCreationError,
    PasswordIncorrect,
    UserNotFound,
    ServerError,
}

impl ApiStatus {
    pub fn code(self) -> u32 {
        match self {
            ApiStatus::Ok => 0,
            ApiStatus::Unauthorized => 40100,
            ApiStatus::ValidationError => 40101,
            ApiStatus::InvalidToken => 40102,
            ApiStatus::Forbidden => 40300,
            ApiStatus::AccountCreationError => 40301,
            ApiStatus::PasswordIncorrect => 40302,
            ApiStatus::UserNotFound => 40303,
            ApiStatus::ServerError => 50000,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ApiStatus::Ok => "Ok",
            ApiStatus::Unauthorized => "Unauthorized",
            ApiStatus::ValidationError => "Validation error",
            ApiStatus::InvalidToken => "Invalid token",
            ApiStatus::Forbidden => "Forbidden",
            ApiStatus::AccountCreationError => "Account creation error",
            ApiStatus::PasswordIncorrect => "Password incorrect",
            ApiStatus::UserNotFound => "User not found",
            ApiStatus::ServerError => "Server error",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(data: T) -> Self {
        ApiSuccess(StatusCode::OK, Json(ApiResponseBody::new(data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

/// One entry of `errorDetails`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Field {
        path: String,
        message: String,
    },
    UniqueViolation {
        #[serde(rename = "type")]
        kind: &'static str,
        path: String,
        value: String,
        message: String,
    },
    Message {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    Validation(Vec<FieldViolation>),
    Unauthorized(String),
    InvalidToken(String),
    Forbidden(String),
    AccountCreation {
        path: String,
        value: String,
        message: String,
    },
    PasswordIncorrect(String),
    UserNotFound(String),
    ServerError(String),
}

impl ApiError {
    pub fn status(&self) -> ApiStatus {
        match self {
            ApiError::Validation(_) => ApiStatus::ValidationError,
            ApiError::Unauthorized(_) => ApiStatus::Unauthorized,
            ApiError::InvalidToken(_) => ApiStatus::InvalidToken,
            ApiError::Forbidden(_) => ApiStatus::Forbidden,
            ApiError::AccountCreation { .. } => ApiStatus::AccountCreationError,
            ApiError::PasswordIncorrect(_) => ApiStatus::PasswordIncorrect,
            ApiError::UserNotFound(_) => ApiStatus::UserNotFound,
            ApiError::ServerError(_) => ApiStatus::ServerError,
        }
    }

    fn details(self) -> Vec<ErrorDetail> {
        match self {
            ApiError::Validation(violations) => violations
                .into_iter()
                .map(|v| ErrorDetail::Field {
                    path: v.path,
                    message: v.message,
                })
                .collect(),
            ApiError::AccountCreation {
                path,
                value,
                message,
            } => vec![ErrorDetail::UniqueViolation {
                kind: "unique violation",
                path,
                value,
                message,
            }],
            ApiError::Unauthorized(message)
            | ApiError::InvalidToken(message)
            | ApiError::Forbidden(message)
            | ApiError::PasswordIncorrect(message)
            | ApiError::UserNotFound(message)
            | ApiError::ServerError(message) => vec![ErrorDetail::Message { message }],
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::ServerError(message) = &self {
            tracing::error!("Request failed: {}", message);
        }

        let status = self.status();
        (
            StatusCode::OK,
            Json(ApiResponseBody::new_error(status, self.details())),
        )
            .into_response()
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::InvalidUserId(_) => {
                ApiError::Validation(vec![FieldViolation::new("id", err.to_string())])
            }
            UserError::InvalidUsername(_) => {
                ApiError::Validation(vec![FieldViolation::new("username", err.to_string())])
            }
            UserError::InvalidEmail(_) => {
                ApiError::Validation(vec![FieldViolation::new("email", err.to_string())])
            }
            UserError::InvalidDisplayName(_) => {
                ApiError::Validation(vec![FieldViolation::new("displayName", err.to_string())])
            }
            UserError::InvalidPassword(_) => {
                ApiError::Validation(vec![FieldViolation::new("password", err.to_string())])
            }
            UserError::AlreadyExists { field, ref value } => ApiError::AccountCreation {
                path: field.to_string(),
                value: value.clone(),
                message: err.to_string(),
            },
            UserError::NotFound(_) => ApiError::UserNotFound(err.to_string()),
            UserError::Unauthorized(reason) => ApiError::Unauthorized(reason.to_string()),
            UserError::PasswordIncorrect => ApiError::PasswordIncorrect(err.to_string()),
            UserError::InvalidToken(_) => ApiError::InvalidToken(err.to_string()),
            UserError::RowCountMismatch { .. }
            | UserError::ConcurrentModification(_)
            | UserError::Password(_)
            | UserError::Token(_)
            | UserError::DatabaseError(_) => ApiError::ServerError(err.to_string()),
        }
    }
}

/// Response envelope shared by every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u32,
    message: &'static str,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_details: Option<Vec<ErrorDetail>>,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(data: T) -> Self {
        Self {
            status_code: ApiStatus::Ok.code(),
            message: ApiStatus::Ok.message(),
            data,
            error_details: None,
        }
    }
}

impl ApiResponseBody<()> {
    pub fn new_error(status: ApiStatus, details: Vec<ErrorDetail>) -> Self {
        Self {
            status_code: status.code(),
            message: status.message(),
            data: (),
            error_details: Some(details),
        }
    }
}

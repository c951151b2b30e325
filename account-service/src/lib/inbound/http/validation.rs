use std::fmt;

use axum::extract::rejection::JsonRejection;
use serde_json::Map;
use serde_json::Value;

use crate::domain::user::models::UserId;
use crate::inbound::http::handlers::ApiError;

/// A single rejected input field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub path: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Collects every violation of a request body before any business logic
/// runs, so clients see all problems at once.
#[derive(Debug, Default)]
pub struct Violations(Vec<FieldViolation>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: &str, message: impl Into<String>) {
        self.0.push(FieldViolation::new(path, message));
    }

    /// Parse a mandatory string field. Absent, empty and non-string values
    /// are violations.
    pub fn required<T, E>(
        &mut self,
        path: &str,
        value: Option<Value>,
        parse: impl FnOnce(String) -> Result<T, E>,
    ) -> Option<T>
    where
        E: fmt::Display,
    {
        match value {
            None => {
                self.push(path, format!("\"{path}\" is required"));
                None
            }
            Some(value) => self.parse(path, value, parse),
        }
    }

    /// Parse a field that may be omitted. Yields `Some(None)` when absent and
    /// `None` when present but invalid.
    pub fn optional<T, E>(
        &mut self,
        path: &str,
        value: Option<Value>,
        parse: impl FnOnce(String) -> Result<T, E>,
    ) -> Option<Option<T>>
    where
        E: fmt::Display,
    {
        match value {
            None => Some(None),
            Some(value) => self.parse(path, value, parse).map(Some),
        }
    }

    /// Optional boolean flag, same `Option<Option<_>>` convention as
    /// [`Violations::optional`].
    pub fn boolean(&mut self, path: &str, value: Option<Value>) -> Option<Option<bool>> {
        match value {
            None => Some(None),
            Some(Value::Bool(flag)) => Some(Some(flag)),
            Some(_) => {
                self.push(path, format!("\"{path}\" must be a boolean"));
                None
            }
        }
    }

    /// Every key the body schema does not declare is a violation.
    pub fn unknown(&mut self, fields: &Map<String, Value>) {
        for key in fields.keys() {
            self.push(key, format!("\"{key}\" is not allowed"));
        }
    }

    /// Parse a user id sent either as a JSON number or a numeric string.
    pub fn user_id(&mut self, path: &str, value: Option<Value>) -> Option<UserId> {
        let parsed = match value {
            None | Some(Value::Null) => {
                self.push(path, format!("\"{path}\" is required"));
                return None;
            }
            Some(Value::Number(n)) => n
                .as_i64()
                .map(|id| id.to_string())
                .and_then(|id| UserId::from_string(&id).ok()),
            Some(Value::String(s)) => UserId::from_string(&s).ok(),
            Some(_) => None,
        };

        if parsed.is_none() {
            self.push(path, format!("\"{path}\" must be a positive integer"));
        }
        parsed
    }

    fn parse<T, E>(
        &mut self,
        path: &str,
        value: Value,
        parse: impl FnOnce(String) -> Result<T, E>,
    ) -> Option<T>
    where
        E: fmt::Display,
    {
        let Value::String(value) = value else {
            self.push(path, format!("\"{path}\" must be a string"));
            return None;
        };
        if value.is_empty() {
            self.push(path, format!("\"{path}\" is not allowed to be empty"));
            return None;
        }
        match parse(value) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                self.push(path, e.to_string());
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `Ok` when nothing was rejected.
    pub fn finish(self) -> Result<(), ApiError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self.into())
        }
    }
}

impl From<Violations> for ApiError {
    fn from(violations: Violations) -> Self {
        ApiError::Validation(violations.0)
    }
}

/// Only reached for bodies serde cannot read as a JSON object at all; field
/// types are checked by [`Violations`].
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(vec![FieldViolation::new("body", rejection.body_text())])
    }
}

/// Accept any string as-is; for fields whose content is checked elsewhere.
pub fn any(value: String) -> Result<String, std::convert::Infallible> {
    Ok(value)
}

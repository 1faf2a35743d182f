use std::collections::BTreeMap;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::models::Role;

/// Field name -> messages, in the shape clients render next to form inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: &str) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn first_message(&self) -> Option<&str> {
        self.0.values().flatten().next().map(String::as_str)
    }

    /// `Ok(())` when nothing was recorded, otherwise a validation error.
    pub fn into_result(self) -> Result<(), AppError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self))
        }
    }
}

#[derive(Debug)]
pub enum AppError {
    Validation(FieldErrors),
    /// A request body or path axum could not extract.
    Rejected { status: StatusCode, message: String },
    InvalidCredentials,
    Unauthenticated(String),
    Forbidden(String),
    RoleRequired { actual: Role, required: Role },
    NotFound(String),
    Conflict(String),
    RateLimited(String),
    Internal(String),
    Database(sqlx::Error),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Validation(errors) => write!(
                f,
                "Validation failed: {}",
                errors.first_message().unwrap_or("invalid input")
            ),
            AppError::Rejected { status, message } => write!(f, "Rejected ({status}): {message}"),
            AppError::InvalidCredentials => write!(f, "Invalid credentials"),
            AppError::Unauthenticated(msg) => write!(f, "Unauthenticated: {msg}"),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
            AppError::RoleRequired { actual, required } => {
                write!(f, "Forbidden: role {actual} where {required} is required")
            }
            AppError::NotFound(msg) => write!(f, "Not Found: {msg}"),
            AppError::Conflict(msg) => write!(f, "Conflict: {msg}"),
            AppError::RateLimited(msg) => write!(f, "Rate Limited: {msg}"),
            AppError::Internal(msg) => write!(f, "Internal Error: {msg}"),
            AppError::Database(err) => write!(f, "Database Error: {err}"),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({
                    "message": errors.first_message().unwrap_or("The given data was invalid."),
                    "errors": errors,
                }),
            ),
            AppError::Rejected { status, message } => (*status, json!({ "message": message })),
            AppError::InvalidCredentials => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({
                    "message": "Invalid credentials",
                    "errors": FieldErrors::single("email", "The provided credentials are incorrect."),
                }),
            ),
            AppError::Unauthenticated(msg) => (StatusCode::UNAUTHORIZED, json!({ "message": msg })),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, json!({ "message": msg })),
            AppError::RoleRequired { actual, required } => (
                StatusCode::FORBIDDEN,
                json!({
                    "message": "Unauthorized. Insufficient permissions.",
                    "user_role": actual,
                    "required_role": required,
                }),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "message": msg })),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, json!({ "message": msg })),
            AppError::RateLimited(msg) => {
                (StatusCode::TOO_MANY_REQUESTS, json!({ "message": msg }))
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "message": "Internal server error" }),
                )
            }
            AppError::Database(err) => {
                tracing::error!("Database error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "message": "Internal server error" }),
                )
            }
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_errors_collect_per_field() {
        let mut errors = FieldErrors::new();
        assert!(errors.clone().into_result().is_ok());

        errors.add("email", "This email is already registered");
        errors.add("email", "Please enter a valid email address");
        errors.add("name", "Please enter your name");

        assert_eq!(errors.get("email").map(|m| m.len()), Some(2));
        assert_eq!(errors.first_message(), Some("This email is already registered"));
        assert!(matches!(errors.into_result(), Err(AppError::Validation(_))));
    }

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn internal_errors_do_not_leak_detail() {
        let resp = AppError::Internal("connection refused at 10.0.0.3".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(resp).await, json!({ "message": "Internal server error" }));

        let resp = AppError::Database(sqlx::Error::PoolTimedOut).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(resp).await, json!({ "message": "Internal server error" }));
    }

    #[tokio::test]
    async fn role_guard_failure_names_both_roles() {
        let resp = AppError::RoleRequired {
            actual: Role::Employee,
            required: Role::Admin,
        }
        .into_response();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            body_json(resp).await,
            json!({
                "message": "Unauthorized. Insufficient permissions.",
                "user_role": "employee",
                "required_role": "admin",
            })
        );
    }

    #[tokio::test]
    async fn invalid_credentials_point_at_email() {
        let body = body_json(AppError::InvalidCredentials.into_response()).await;
        assert_eq!(body["message"], "Invalid credentials");
        assert_eq!(body["errors"]["email"][0], "The provided credentials are incorrect.");
    }
}

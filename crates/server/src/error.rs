//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers return `Result<T, AppError>`.
//!
//! Every error body has the same envelope:
//!
//! ```json
//! { "success": false, "message": "...", "errors": [ { "field": "...", "message": "..." } ] }
//! ```
//!
//! `errors` is only present for validation failures. Internal details are
//! never part of the body built here; see [`ErrorDetail`].

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use user_apis_core::Role;

use crate::db::RepositoryError;
use crate::services::auth::{AuthError, FieldViolation, ValidationErrors};

pub const VALIDATION_FAILED: &str = "Validation failed";
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
pub const INTERNAL_SERVER_ERROR: &str = "Internal server error";
pub const USER_EXISTS: &str = "User already exists with this email or username";
pub const ADMIN_EXISTS: &str = "Admin already exists with this email";

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication or registration failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Request body failed validation before reaching a service.
    #[error("Validation error: {0}")]
    Validation(ValidationErrors),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldViolation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorBody {
    /// A failure envelope with only a message.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            errors: None,
            error: None,
        }
    }
}

/// Internal error text attached to 500 responses as an extension.
///
/// Stripped by [`crate::middleware::expose_error_detail`], which copies it
/// into the body only in development.
#[derive(Debug, Clone)]
pub struct ErrorDetail(pub String);

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Auth(err) => match err {
                AuthError::Validation(_) => StatusCode::BAD_REQUEST,
                AuthError::AlreadyExists { .. } => StatusCode::CONFLICT,
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::Repository(_) | AuthError::PasswordHash | AuthError::Token(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            Self::Auth(AuthError::Validation(errors)) | Self::Validation(errors) => ErrorBody {
                errors: Some(errors.violations().to_vec()),
                ..ErrorBody::message(VALIDATION_FAILED)
            },
            Self::Auth(AuthError::AlreadyExists { role: Role::User }) => {
                ErrorBody::message(USER_EXISTS)
            }
            Self::Auth(AuthError::AlreadyExists { role: Role::Admin }) => {
                ErrorBody::message(ADMIN_EXISTS)
            }
            Self::Auth(AuthError::InvalidCredentials) => ErrorBody::message(INVALID_CREDENTIALS),
            Self::NotFound(what) => ErrorBody::message(what.clone()),
            Self::BadRequest(reason) => ErrorBody::message(reason.clone()),
            // Don't expose internal error details to clients
            Self::Auth(_) | Self::Database(_) | Self::Internal(_) => {
                ErrorBody::message(INTERNAL_SERVER_ERROR)
            }
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let mut response = (status, Json(self.body())).into_response();
        if status.is_server_error() {
            response
                .extensions_mut()
                .insert(ErrorDetail(self.to_string()));
        }
        response
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;
    use serde_json::{Value, json};

    use super::*;

    async fn body_json(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("User not found".to_string());
        assert_eq!(err.to_string(), "Not found: User not found");

        let err = AppError::BadRequest("Invalid user ID".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid user ID");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            AppError::NotFound("x".to_string()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::BadRequest("x".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Auth(AuthError::InvalidCredentials).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Auth(AuthError::AlreadyExists { role: Role::Admin }).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Auth(AuthError::PasswordHash).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Database(RepositoryError::Closed).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_validation_body_lists_violations() {
        let err = AppError::Validation(ValidationErrors::single("email", "bad"));
        let (status, body) = body_json(err).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({
                "success": false,
                "message": "Validation failed",
                "errors": [{"field": "email", "message": "bad"}]
            })
        );
    }

    #[tokio::test]
    async fn test_conflict_messages_per_role() {
        let (_, user) = body_json(AuthError::AlreadyExists { role: Role::User }.into()).await;
        let (_, admin) = body_json(AuthError::AlreadyExists { role: Role::Admin }.into()).await;
        assert_eq!(user["message"], USER_EXISTS);
        assert_eq!(admin["message"], ADMIN_EXISTS);
    }

    #[tokio::test]
    async fn test_internal_errors_hide_detail() {
        let response = AppError::Internal("pool exhausted".to_string()).into_response();
        let detail = response.extensions().get::<ErrorDetail>().cloned().unwrap();
        assert!(detail.0.contains("pool exhausted"));

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({"success": false, "message": INTERNAL_SERVER_ERROR}));
    }

    #[tokio::test]
    async fn test_client_errors_carry_no_detail() {
        let response = AppError::Auth(AuthError::InvalidCredentials).into_response();
        assert!(response.extensions().get::<ErrorDetail>().is_none());
    }
}

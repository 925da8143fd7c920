//! JSON error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use kudos_core::auth::AuthError;
use kudos_core::ServiceError;
use serde::Serialize;
use tracing::error;

/// Error body returned by every endpoint: `{"code": ..., "message": ...}`
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Creates a validation error (400).
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "validation_error", message)
    }

    /// Creates a not found error (404).
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    /// Creates an authentication/authorization error (401).
    pub fn unauthorized(code: &str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, code, message)
    }

    /// Creates an internal error (500) without leaking the cause.
    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "Internal server error",
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let code = match err {
            AuthError::MissingCredentials => "unauthenticated",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::AuthorMismatch | AuthError::NotOwner => "unauthorized",
        };
        ApiError::unauthorized(code, err.to_string())
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Auth(auth) => auth.into(),
            ServiceError::NotFound(_) => ApiError::not_found("Review not found"),
            ServiceError::Validation(message) => ApiError::validation_error(message),
            ServiceError::Store(store) => {
                error!(error = %store, "Review storage failed");
                ApiError::internal()
            }
        }
    }
}

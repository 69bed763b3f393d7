use crate::domain::auth::Unauthenticated;
use crate::schemas::ValidationError;
use crate::schemas::error::ErrorResponse;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Unauthenticated(#[from] Unauthenticated),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Internal server error")]
    Internal,
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Problems with how the process was assembled. Never recoverable: startup aborts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("procedure group '{0}' is registered more than once")]
    DuplicateGroup(String),
    #[error("procedure group name '{0}' must be non-empty and must not contain '.'")]
    InvalidGroupName(String),
    #[error("procedure '{group}.{procedure}' is registered more than once")]
    DuplicateProcedure { group: String, procedure: String },
    #[error("procedure '{path}' declares group '{declared}' but was composed under '{group}'")]
    MisplacedProcedure { path: String, declared: String, group: String },
    #[error("invalid locale configuration: {0}")]
    Locale(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            Self::Validation(e) => {
                tracing::debug!(issues = %e, "Validation failed");
                (StatusCode::BAD_REQUEST, "VALIDATION_FAILED", e.to_string())
            }
            Self::Unauthenticated(e) => {
                tracing::debug!(reason = %e.reason, "Unauthenticated");
                (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", "Unauthorized".to_string())
            }
            Self::NotFound(what) => {
                tracing::debug!(resource = %what, "Resource not found");
                (StatusCode::NOT_FOUND, "NOT_FOUND", what)
            }
            Self::BadRequest(msg) => {
                tracing::debug!(message = %msg, "Bad request");
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg)
            }
            Self::Internal => {
                tracing::error!("Internal server error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", "Internal server error".to_string())
            }
        };

        let body = ErrorResponse::new(error).with_message(message).with_code(status.as_u16().to_string());

        (status, Json(body)).into_response()
    }
}

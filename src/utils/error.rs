use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::services::ServiceError;
use crate::utils::response::error as error_response;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ConstraintViolation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::ConstraintViolation(_) => "CONSTRAINT_VIOLATION",
            AppError::Conflict(_) => "CONCURRENCY_CONFLICT",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
        }
    }

    fn log(&self) {
        match self {
            AppError::DatabaseError(msg) => {
                error!(code = self.code(), message = %msg, "Database error");
            }
            AppError::ValidationError(msg)
            | AppError::NotFound(msg)
            | AppError::ConstraintViolation(msg)
            | AppError::Conflict(msg) => {
                warn!(code = self.code(), message = %msg, "Request rejected");
            }
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::NotFound(msg) => AppError::NotFound(msg),
            ServiceError::ValidationError(msg) => AppError::ValidationError(msg),
            ServiceError::ConstraintViolation(msg) => AppError::ConstraintViolation(msg),
            ServiceError::ConcurrencyConflict(msg) => AppError::Conflict(msg),
            ServiceError::PersistenceError(msg) => AppError::DatabaseError(msg),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        self.log();

        // Store failures stay in the logs; clients get a generic message.
        let (public_message, details) = match self {
            AppError::DatabaseError(_) => ("A database error occurred".to_string(), None),
            AppError::ValidationError(msg) => {
                let details = json!({ "reason": msg.clone() });
                (msg, Some(details))
            }
            AppError::NotFound(msg)
            | AppError::ConstraintViolation(msg)
            | AppError::Conflict(msg) => (msg, None),
        };

        error_response(code, public_message, details, status)
    }
}

use thiserror::Error;

use crate::store::StoreError;

/// Outcome kinds reported by the account, event and ticket operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    ValidationError(String),

    #[error("{0}")]
    ConstraintViolation(String),

    #[error("{0}")]
    ConcurrencyConflict(String),

    #[error("{0}")]
    PersistenceError(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<StoreError> for ServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound { .. } => ServiceError::NotFound(error.to_string()),
            StoreError::ConstraintViolation(message) => ServiceError::ConstraintViolation(message),
            StoreError::ConcurrencyConflict { .. } => {
                ServiceError::ConcurrencyConflict(error.to_string())
            }
            StoreError::Persistence(message) => ServiceError::PersistenceError(message),
        }
    }
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::ValidationError(message.into())
    }

    /// Translate a failure from the write half of a read-then-write update.
    ///
    /// The row was present when it was read, so its absence now means it was
    /// removed concurrently.
    pub(crate) fn from_guarded_write(error: StoreError) -> Self {
        match error {
            StoreError::NotFound { entity, id } => ServiceError::ConcurrencyConflict(format!(
                "{entity} {id} was removed while being updated"
            )),
            other => other.into(),
        }
    }
}

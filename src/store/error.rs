use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Account,
    Event,
    Ticket,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::Account => "account",
            EntityKind::Event => "event",
            EntityKind::Ticket => "ticket",
        })
    }
}

/// Failures reported by an [`EntityStore`](super::EntityStore) implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: i32 },

    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// The row no longer matches the snapshot the caller read before writing.
    #[error("{entity} {id} was modified concurrently")]
    ConcurrencyConflict { entity: EntityKind, id: i32 },

    #[error("store failure: {0}")]
    Persistence(String),
}

impl StoreError {
    pub fn not_found(entity: EntityKind, id: impl Into<i32>) -> Self {
        StoreError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn conflict(entity: EntityKind, id: impl Into<i32>) -> Self {
        StoreError::ConcurrencyConflict {
            entity,
            id: id.into(),
        }
    }
}

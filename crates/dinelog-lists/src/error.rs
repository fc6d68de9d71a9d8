//! Error types for list engine operations.

use dinelog_models::{ListId, UserId};
use dinelog_persistence::PersistenceError;
use thiserror::Error;

/// Errors that can occur while reading or reordering a list.
#[derive(Error, Debug)]
pub enum ListError {
    /// Caller does not own the list.
    #[error("user {user_id} may not reorder list {list_id}")]
    Unauthorized { list_id: ListId, user_id: UserId },

    /// Operation is not allowed in the session's current state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The batch write or another backend call failed.
    #[error("persistence failure: {0}")]
    PersistenceFailure(#[source] PersistenceError),

    /// List or item not found.
    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: String },

    /// Drag index outside the projection.
    #[error("index {index} out of range for projection of {len} items")]
    InvalidIndex { index: usize, len: usize },

    /// Projections handed to the reconciler do not describe the same items.
    #[error("inconsistent projection: {0}")]
    Inconsistent(String),

    /// Lock poisoned (thread panicked while holding lock).
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

impl From<PersistenceError> for ListError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::NotFound { kind, id } => ListError::NotFound { kind, id },
            other => ListError::PersistenceFailure(other),
        }
    }
}

/// Result type alias for list engine operations.
pub type Result<T> = std::result::Result<T, ListError>;

//! Queue Error Types

use crate::core::error_handling::ContextualError;
use crate::queue::entry::EntryState;

#[derive(Debug, Clone, thiserror::Error)]
pub enum QueueError {
    #[error("Duplicate request id: {request_id}")]
    DuplicateRequest { request_id: String },

    #[error("Request not found: {request_id}")]
    NotFound { request_id: String },

    #[error("Invalid state transition for {request_id}: {from} -> {to}")]
    InvalidTransition {
        request_id: String,
        from: EntryState,
        to: EntryState,
    },

    #[error("Synchronisation error: {message}")]
    LockPoisoned { message: String },
}

impl ContextualError for QueueError {
    fn is_user_actionable(&self) -> bool {
        match self {
            // The caller chose the id; it can retry with a fresh one or treat
            // the collision as an idempotent re-submission
            QueueError::DuplicateRequest { .. } => true,
            QueueError::NotFound { .. } => false,
            QueueError::InvalidTransition { .. } => false,
            QueueError::LockPoisoned { .. } => false,
        }
    }

    fn user_message(&self) -> Option<&str> {
        None
    }
}

/// Result type for queue operations
pub type QueueResult<T> = Result<T, QueueError>;

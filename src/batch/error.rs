//! Batch Error Types

use crate::core::error_handling::ContextualError;
use crate::queue::error::QueueError;

#[derive(Debug, Clone, thiserror::Error)]
pub enum BatchError {
    #[error("Duplicate batch id: {batch_id}")]
    DuplicateBatch { batch_id: String },

    #[error("Unknown batch id: {batch_id}")]
    UnknownBatch { batch_id: String },

    #[error(transparent)]
    Queue(#[from] QueueError),
}

impl ContextualError for BatchError {
    fn is_user_actionable(&self) -> bool {
        match self {
            BatchError::DuplicateBatch { .. } => true,
            BatchError::UnknownBatch { .. } => true,
            BatchError::Queue(err) => err.is_user_actionable(),
        }
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            BatchError::Queue(err) => err.user_message(),
            _ => None,
        }
    }
}

/// Result type for batch operations
pub type BatchResult<T> = Result<T, BatchError>;

//! Error types for the notification system

use crate::core::error_handling::ContextualError;

#[derive(Debug, Clone, thiserror::Error)]
pub enum NotificationError {
    #[error("Channel closed for subscriber: {subscriber_id}")]
    ChannelClosed { subscriber_id: String },

    #[error("Failed to publish {event_type} event to subscribers: {failed_subscribers:?}")]
    PublishFailed {
        event_type: String,
        failed_subscribers: Vec<String>,
    },
}

impl ContextualError for NotificationError {
    fn is_user_actionable(&self) -> bool {
        false // All notification errors are system-level
    }

    fn user_message(&self) -> Option<&str> {
        None
    }
}

/// Result type for notification operations
pub type NotificationResult<T> = Result<T, NotificationError>;

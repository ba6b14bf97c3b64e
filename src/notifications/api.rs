//! Public API for the notification system
//!
//! External modules should import from here rather than directly from
//! internal modules.

// Core event types and enums
pub use crate::notifications::event::{
    BatchEvent, BatchEventType, Event, EventFilter, ScanEvent, ScanEventType, SystemEvent,
    SystemEventType,
};

// Manager and utilities
pub use crate::notifications::error::{NotificationError, NotificationResult};
pub use crate::notifications::manager::{AsyncNotificationManager, EventReceiver};

// Traits and statistics
pub use crate::notifications::traits::{Subscriber, SubscriberStatistics};

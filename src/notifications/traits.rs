//! Traits for the notification system

use crate::notifications::event::Event;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::Instant;

/// Statistics tracking for a subscriber
pub struct SubscriberStatistics {
    queue_size: AtomicUsize,
    events_delivered: AtomicUsize,
    send_errors: AtomicUsize,
    last_event_time: RwLock<Option<Instant>>,
}

impl Default for SubscriberStatistics {
    fn default() -> Self {
        Self::new()
    }
}

impl SubscriberStatistics {
    pub fn new() -> Self {
        Self {
            queue_size: AtomicUsize::new(0),
            events_delivered: AtomicUsize::new(0),
            send_errors: AtomicUsize::new(0),
            last_event_time: RwLock::new(None),
        }
    }

    pub fn queue_size(&self) -> usize {
        self.queue_size.load(Ordering::Relaxed)
    }

    pub fn increment_queue_size(&self) {
        self.queue_size.fetch_add(1, Ordering::Relaxed);
    }

    pub fn decrement_queue_size(&self) {
        self.queue_size
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                Some(current.saturating_sub(1))
            })
            .ok();
    }

    pub fn events_delivered(&self) -> usize {
        self.events_delivered.load(Ordering::Relaxed)
    }

    pub fn record_event_delivered(&self) {
        self.events_delivered.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut time) = self.last_event_time.write() {
            *time = Some(Instant::now());
        }
    }

    pub fn send_errors(&self) -> usize {
        self.send_errors.load(Ordering::Relaxed)
    }

    pub fn record_send_error(&self) {
        self.send_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn last_event_time(&self) -> Option<Instant> {
        *self.last_event_time.read().ok()?
    }
}

/// Trait for event subscribers that prefer a handler interface over the raw
/// channel receiver returned by `subscribe`
#[async_trait]
pub trait Subscriber: Send + Sync {
    /// Handle an incoming event
    async fn handle_event(&self, event: Event) -> Result<(), Box<dyn std::error::Error>>;

    /// Get the unique identifier for this subscriber
    fn subscriber_id(&self) -> &str;

    /// Get the source identifier for debugging
    fn source(&self) -> &str;
}

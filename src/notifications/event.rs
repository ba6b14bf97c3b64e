//! Event types for the notification system

use std::sync::Arc;
use std::time::SystemTime;

use crate::queue::entry::ScanRequest;

#[derive(Clone, Debug, PartialEq)]
pub enum ScanEventType {
    Queued,
    Started,
    Completed,
    Failed,
    Cancelled,
}

#[derive(Clone, Debug, PartialEq)]
pub enum BatchEventType {
    Submitted,
    Cancelled,
    Removed,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SystemEventType {
    Startup,
    Shutdown,
    QueueCleared,
}

/// Lifecycle event for a single scan request
///
/// `Started` events carry the opaque scan request so the executor can launch
/// the scan without a separate lookup; all other event types leave it unset.
#[derive(Clone, Debug)]
pub struct ScanEvent {
    pub event_type: ScanEventType,
    pub timestamp: SystemTime,
    pub request_id: String,
    pub scan_id: String,
    pub image_id: String,
    pub message: Option<String>,
    pub request: Option<Arc<ScanRequest>>,
}

impl ScanEvent {
    pub fn new(
        event_type: ScanEventType,
        request_id: String,
        scan_id: String,
        image_id: String,
    ) -> Self {
        Self {
            event_type,
            timestamp: SystemTime::now(),
            request_id,
            scan_id,
            image_id,
            message: None,
            request: None,
        }
    }

    pub fn with_message(
        event_type: ScanEventType,
        request_id: String,
        scan_id: String,
        image_id: String,
        message: String,
    ) -> Self {
        Self {
            event_type,
            timestamp: SystemTime::now(),
            request_id,
            scan_id,
            image_id,
            message: Some(message),
            request: None,
        }
    }

    pub fn with_request(
        event_type: ScanEventType,
        request_id: String,
        scan_id: String,
        image_id: String,
        request: Arc<ScanRequest>,
    ) -> Self {
        Self {
            event_type,
            timestamp: SystemTime::now(),
            request_id,
            scan_id,
            image_id,
            message: None,
            request: Some(request),
        }
    }
}

/// Lifecycle event for a bulk batch
#[derive(Clone, Debug)]
pub struct BatchEvent {
    pub event_type: BatchEventType,
    pub timestamp: SystemTime,
    pub batch_id: String,
    pub item_count: Option<usize>,
    pub message: Option<String>,
}

impl BatchEvent {
    pub fn new(event_type: BatchEventType, batch_id: String) -> Self {
        Self {
            event_type,
            timestamp: SystemTime::now(),
            batch_id,
            item_count: None,
            message: None,
        }
    }

    pub fn with_item_count(event_type: BatchEventType, batch_id: String, item_count: usize) -> Self {
        Self {
            event_type,
            timestamp: SystemTime::now(),
            batch_id,
            item_count: Some(item_count),
            message: None,
        }
    }
}

/// Queue-wide lifecycle event
#[derive(Clone, Debug)]
pub struct SystemEvent {
    pub event_type: SystemEventType,
    pub timestamp: SystemTime,
    pub message: Option<String>,
}

impl SystemEvent {
    pub fn new(event_type: SystemEventType) -> Self {
        Self {
            event_type,
            timestamp: SystemTime::now(),
            message: None,
        }
    }

    pub fn with_message(event_type: SystemEventType, message: String) -> Self {
        Self {
            event_type,
            timestamp: SystemTime::now(),
            message: Some(message),
        }
    }
}

/// Unified event enum that encompasses all event types
#[derive(Clone, Debug)]
pub enum Event {
    Scan(ScanEvent),
    Batch(BatchEvent),
    System(SystemEvent),
}

/// Event filtering options for subscribers
#[derive(Clone, Debug, PartialEq)]
pub enum EventFilter {
    ScanOnly,
    BatchOnly,
    SystemOnly,
    ScanAndBatch,
    All,
}

impl EventFilter {
    /// Check if an event should be accepted by this filter
    pub fn accepts(&self, event: &Event) -> bool {
        matches!(
            (self, event),
            (EventFilter::ScanOnly, Event::Scan(_))
                | (EventFilter::BatchOnly, Event::Batch(_))
                | (EventFilter::SystemOnly, Event::System(_))
                | (EventFilter::ScanAndBatch, Event::Scan(_))
                | (EventFilter::ScanAndBatch, Event::Batch(_))
                | (EventFilter::All, _)
        )
    }
}

//! Queue types shared across the public surface

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::core::config::DEFAULT_INTERACTIVE_PRIORITY;
use crate::queue::entry::ScanRequest;

/// A scan submission handed to `ScanQueueManager::submit`
///
/// `request_id` identifies the logical scan request end-to-end and must be
/// unique; `scan_id` and `image_id` are opaque identifiers passed through to
/// the executor.
#[derive(Debug, Clone)]
pub struct ScanSubmission {
    pub request_id: String,
    pub scan_id: String,
    pub image_id: String,
    pub request: Arc<ScanRequest>,
    pub priority: i32,
    pub batch_id: Option<String>,
}

impl ScanSubmission {
    pub fn new(
        request_id: String,
        scan_id: String,
        image_id: String,
        request: ScanRequest,
    ) -> Self {
        Self {
            request_id,
            scan_id,
            image_id,
            request: Arc::new(request),
            priority: DEFAULT_INTERACTIVE_PRIORITY,
            batch_id: None,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_batch_id<S: Into<String>>(mut self, batch_id: S) -> Self {
        self.batch_id = Some(batch_id.into());
        self
    }
}

/// What happened to a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A slot was free; the scan was handed to the executor
    Started { request_id: String },
    /// All slots busy; the entry is waiting at `position`
    Queued {
        request_id: String,
        position: usize,
        estimated_wait: Duration,
    },
}

impl SubmitOutcome {
    pub fn request_id(&self) -> &str {
        match self {
            SubmitOutcome::Started { request_id } => request_id,
            SubmitOutcome::Queued { request_id, .. } => request_id,
        }
    }

    pub fn is_started(&self) -> bool {
        matches!(self, SubmitOutcome::Started { .. })
    }
}

/// What happened to a cancellation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The entry was waiting and has been removed
    Cancelled,
    /// The entry already started; stopping it is the executor's concern
    AlreadyRunning,
    /// Unknown or already-terminal id; a no-op, never an error
    NotFound,
}

/// Point-in-time queue counters
///
/// `running` and `queued` are live; the terminal counters are cumulative
/// since construction and survive entry pruning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueueStats {
    pub running: usize,
    pub queued: usize,
    pub completed: u64,
    pub failed: u64,
    pub cancelled: u64,
}

/// Read-only snapshot of one waiting entry, for position display
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedEntryInfo {
    /// 1-based rank in the admission queue
    pub position: usize,
    pub request_id: String,
    pub scan_id: String,
    pub image_id: String,
    pub priority: i32,
    pub enqueued_at: SystemTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_builder_defaults() {
        let submission = ScanSubmission::new(
            "req-1".to_string(),
            "scan-1".to_string(),
            "sha256:abc".to_string(),
            ScanRequest::new("app:1.0"),
        );
        assert_eq!(submission.priority, DEFAULT_INTERACTIVE_PRIORITY);
        assert!(submission.batch_id.is_none());
    }

    #[test]
    fn test_submission_builder_overrides() {
        let submission = ScanSubmission::new(
            "req-1".to_string(),
            "scan-1".to_string(),
            "sha256:abc".to_string(),
            ScanRequest::new("app:1.0"),
        )
        .with_priority(-1)
        .with_batch_id("batch-7");

        assert_eq!(submission.priority, -1);
        assert_eq!(submission.batch_id.as_deref(), Some("batch-7"));
    }

    #[test]
    fn test_submit_outcome_accessors() {
        let started = SubmitOutcome::Started {
            request_id: "req-1".to_string(),
        };
        assert!(started.is_started());
        assert_eq!(started.request_id(), "req-1");

        let queued = SubmitOutcome::Queued {
            request_id: "req-2".to_string(),
            position: 4,
            estimated_wait: Duration::from_secs(160),
        };
        assert!(!queued.is_started());
        assert_eq!(queued.request_id(), "req-2");
    }
}

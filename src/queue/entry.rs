//! Schedulable unit of scan work
//!
//! A `QueueEntry` tracks one scan request from submission to a terminal
//! state. The payload (`ScanRequest`) is opaque to the queue: it is carried
//! to the executor unchanged and never interpreted here.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use crate::queue::error::{QueueError, QueueResult};

/// Opaque description of what to scan, passed through to the executor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRequest {
    /// Image reference, e.g. "registry.local/team/app:1.4"
    pub image_ref: String,
    /// Registry the image lives in, when not part of the reference
    pub registry: Option<String>,
    /// Per-scanner tool configuration, uninterpreted by the queue
    pub tool_config: serde_json::Value,
}

impl ScanRequest {
    pub fn new<S: Into<String>>(image_ref: S) -> Self {
        Self {
            image_ref: image_ref.into(),
            registry: None,
            tool_config: serde_json::Value::Null,
        }
    }

    pub fn with_registry<S: Into<String>>(mut self, registry: S) -> Self {
        self.registry = Some(registry.into());
        self
    }

    pub fn with_tool_config(mut self, tool_config: serde_json::Value) -> Self {
        self.tool_config = tool_config;
        self
    }
}

/// Lifecycle state of a queue entry
///
/// Transitions move in one direction only:
/// `queued -> running -> {completed | failed}`, or `queued -> cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum EntryState {
    Queued,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl EntryState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EntryState::Completed | EntryState::Failed | EntryState::Cancelled
        )
    }

    /// Whether the state machine permits moving to `next`
    pub fn can_transition_to(&self, next: EntryState) -> bool {
        matches!(
            (self, next),
            (EntryState::Queued, EntryState::Running)
                | (EntryState::Queued, EntryState::Cancelled)
                | (EntryState::Running, EntryState::Completed)
                | (EntryState::Running, EntryState::Failed)
        )
    }
}

/// One schedulable unit of scan work
///
/// Created by `ScanQueueManager::submit` and mutated only by the manager;
/// callers observe entries through read-only snapshots.
#[derive(Debug, Clone)]
pub struct QueueEntry {
    request_id: String,
    scan_id: String,
    image_id: String,
    request: Arc<ScanRequest>,
    priority: i32,
    batch_id: Option<String>,
    enqueued_at: SystemTime,
    started_at: Option<Instant>,
    state: EntryState,
}

impl QueueEntry {
    pub(crate) fn new(
        request_id: String,
        scan_id: String,
        image_id: String,
        request: Arc<ScanRequest>,
        priority: i32,
        batch_id: Option<String>,
    ) -> Self {
        Self {
            request_id,
            scan_id,
            image_id,
            request,
            priority,
            batch_id,
            enqueued_at: SystemTime::now(),
            started_at: None,
            state: EntryState::Queued,
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn scan_id(&self) -> &str {
        &self.scan_id
    }

    pub fn image_id(&self) -> &str {
        &self.image_id
    }

    pub fn request(&self) -> &Arc<ScanRequest> {
        &self.request
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn batch_id(&self) -> Option<&str> {
        self.batch_id.as_deref()
    }

    pub fn enqueued_at(&self) -> SystemTime {
        self.enqueued_at
    }

    pub fn state(&self) -> EntryState {
        self.state
    }

    /// Time spent running so far; `None` until the entry has started
    pub fn running_duration(&self) -> Option<Duration> {
        self.started_at.map(|started| started.elapsed())
    }

    /// Move the entry to `next`, enforcing the one-way state machine
    ///
    /// Entering `Running` records the start instant used for duration
    /// statistics.
    pub(crate) fn transition_to(&mut self, next: EntryState) -> QueueResult<()> {
        if !self.state.can_transition_to(next) {
            return Err(QueueError::InvalidTransition {
                request_id: self.request_id.clone(),
                from: self.state,
                to: next,
            });
        }
        if next == EntryState::Running {
            self.started_at = Some(Instant::now());
        }
        self.state = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(request_id: &str) -> QueueEntry {
        QueueEntry::new(
            request_id.to_string(),
            format!("scan-{request_id}"),
            "sha256:abc".to_string(),
            Arc::new(ScanRequest::new("registry.local/app:1.0")),
            0,
            None,
        )
    }

    #[test]
    fn test_new_entry_starts_queued() {
        let e = entry("req-1");
        assert_eq!(e.state(), EntryState::Queued);
        assert!(e.running_duration().is_none());
        assert!(e.batch_id().is_none());
    }

    #[test]
    fn test_happy_path_transitions() {
        let mut e = entry("req-1");
        e.transition_to(EntryState::Running).unwrap();
        assert_eq!(e.state(), EntryState::Running);
        assert!(e.running_duration().is_some());

        e.transition_to(EntryState::Completed).unwrap();
        assert_eq!(e.state(), EntryState::Completed);
        assert!(e.state().is_terminal());
    }

    #[test]
    fn test_queued_can_cancel_but_running_cannot() {
        let mut e = entry("req-1");
        assert!(EntryState::Queued.can_transition_to(EntryState::Cancelled));

        e.transition_to(EntryState::Running).unwrap();
        let result = e.transition_to(EntryState::Cancelled);
        match result {
            Err(QueueError::InvalidTransition { from, to, .. }) => {
                assert_eq!(from, EntryState::Running);
                assert_eq!(to, EntryState::Cancelled);
            }
            other => panic!("Expected InvalidTransition, got {:?}", other),
        }
    }

    #[test]
    fn test_no_reentry_after_terminal() {
        let mut e = entry("req-1");
        e.transition_to(EntryState::Running).unwrap();
        e.transition_to(EntryState::Failed).unwrap();

        assert!(e.transition_to(EntryState::Queued).is_err());
        assert!(e.transition_to(EntryState::Running).is_err());
        assert!(e.transition_to(EntryState::Completed).is_err());
    }

    #[test]
    fn test_queued_cannot_complete_directly() {
        let mut e = entry("req-1");
        assert!(e.transition_to(EntryState::Completed).is_err());
        assert_eq!(e.state(), EntryState::Queued);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(EntryState::Queued.to_string(), "queued");
        assert_eq!(EntryState::Cancelled.to_string(), "cancelled");
    }

    #[test]
    fn test_scan_request_builder() {
        let request = ScanRequest::new("app:latest")
            .with_registry("registry.local")
            .with_tool_config(serde_json::json!({"scanners": ["trivy", "grype"]}));
        assert_eq!(request.image_ref, "app:latest");
        assert_eq!(request.registry.as_deref(), Some("registry.local"));
        assert!(request.tool_config.get("scanners").is_some());
    }
}

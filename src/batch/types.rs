//! Batch aggregate types

use crate::queue::error::QueueError;

/// Derived live status of a batch
///
/// Recomputed from the underlying entry states on every query; never
/// mutated independently, so it cannot drift from the queue's truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchStatus {
    pub total: usize,
    pub queued: usize,
    pub running: usize,
    pub completed: usize,
    pub failed: usize,
    pub cancelled: usize,
}

impl BatchStatus {
    /// Whether every member has reached a terminal state
    pub fn is_finished(&self) -> bool {
        self.completed + self.failed + self.cancelled == self.total
    }
}

/// Per-item result of a bulk submission
#[derive(Debug, Clone)]
pub enum BatchItemOutcome {
    /// The item was admitted (running or queued)
    Accepted { request_id: String },
    /// The item was rejected; the rest of the batch continued
    Rejected {
        request_id: String,
        error: QueueError,
    },
}

impl BatchItemOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, BatchItemOutcome::Accepted { .. })
    }
}

/// Outcome of `submit_batch`: partial success is expected and reported
/// item-by-item
#[derive(Debug, Clone)]
pub struct BatchSubmitReport {
    pub batch_id: String,
    pub items: Vec<BatchItemOutcome>,
}

impl BatchSubmitReport {
    pub fn accepted_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_accepted()).count()
    }

    pub fn rejected_count(&self) -> usize {
        self.items.len() - self.accepted_count()
    }
}

/// Outcome of `cancel_batch`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchCancelReport {
    /// Members removed from the waiting list
    pub cancelled: usize,
    /// Members already running; stopping them is the executor's concern
    pub not_cancellable: usize,
    /// Members that had already reached a terminal state
    pub already_terminal: usize,
}

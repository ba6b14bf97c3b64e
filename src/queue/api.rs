//! Public API for the scan admission queue
//!
//! External modules should import from here rather than directly from
//! internal modules.

// Orchestrator
pub use crate::queue::manager::ScanQueueManager;

// Entry model and opaque payload
pub use crate::queue::entry::{EntryState, QueueEntry, ScanRequest};

// Submission and outcome types
pub use crate::queue::types::{
    CancelOutcome, QueueStats, QueuedEntryInfo, ScanSubmission, SubmitOutcome,
};

// Components, exposed for direct use in tests and advanced wiring
pub use crate::queue::admission::AdmissionQueue;
pub use crate::queue::estimator::WaitTimeEstimator;
pub use crate::queue::governor::ConcurrencyGovernor;

// Error handling
pub use crate::queue::error::{QueueError, QueueResult};

//! Bulk scan submission
//!
//! Expands one bulk request (for example, a registry pattern match) into many
//! queue entries sharing a batch id, tagged with the bulk priority so
//! interactive scans are never starved behind a large batch. Batch status is
//! always derived from entry state, never stored separately.

pub mod api;
pub mod error;
pub mod manager;
pub mod types;

pub use error::{BatchError, BatchResult};
pub use manager::BatchManager;
pub use types::{BatchCancelReport, BatchItemOutcome, BatchStatus, BatchSubmitReport};

#[cfg(test)]
mod tests;

//! Public API for bulk scan submission
//!
//! External modules should import from here rather than directly from
//! internal modules.

// Batch management
pub use crate::batch::manager::BatchManager;

// Aggregate and report types
pub use crate::batch::types::{
    BatchCancelReport, BatchItemOutcome, BatchStatus, BatchSubmitReport,
};

// Error handling
pub use crate::batch::error::{BatchError, BatchResult};

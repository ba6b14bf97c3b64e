//! Scan Admission & Queueing
//!
//! Decides, for every scan request entering the system, whether it runs
//! immediately or waits; enforces a global concurrency ceiling; orders
//! waiting work by priority and arrival time; and promotes queued work when
//! a running slot frees.
//!
//! # Overview
//!
//! - **Bounded concurrency**: at most `max_concurrent` scans run at once,
//!   enforced by an atomic check-and-increment in the governor
//! - **Priority with fairness inside a tier**: waiting entries drain by
//!   priority (descending), strictly first-in first-out among equals
//! - **Non-blocking submission**: `submit` returns immediately with either a
//!   running or a queued outcome; scans execute outside the queue and report
//!   back through `complete`/`fail`
//! - **Lifecycle events**: one event per state transition, delivered in
//!   transition order to the executor and any status consumers
//! - **Bounded retention**: terminal entries are pruned; cumulative counters
//!   and (for batch members) a compact outcome record survive
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────────┐
//! │ Interactive API │     │ BatchManager (bulk)  │
//! └───────┬─────────┘     └──────────┬───────────┘
//!         │ submit                   │ submit (bulk priority)
//!         ▼                          ▼
//! ┌─────────────────────────────────────────────────────┐
//! │                  ScanQueueManager                   │
//! │  ┌──────────────────┐     ┌─────────────────────┐  │
//! │  │ Concurrency      │     │ AdmissionQueue      │  │
//! │  │ Governor         │     │ (priority desc,     │  │
//! │  │ (running ≤ max)  │     │  arrival asc)       │  │
//! │  └──────────────────┘     └─────────────────────┘  │
//! │            │ Started / Queued / Completed /         │
//! │            │ Failed / Cancelled events              │
//! └────────────┼────────────────────────────────────────┘
//!              ▼
//! ┌──────────────────────┐   ┌──────────────────────┐
//! │ Executor (launches   │   │ Status / telemetry   │
//! │ scans on Started)    │   │ consumers            │
//! └──────────────────────┘   └──────────────────────┘
//! ```
//!
//! # Scheduling guarantees
//!
//! Among entries of equal priority, first-submitted is first-promoted. Across
//! tiers no fairness is provided: a continuous stream of higher-priority
//! submissions can delay a lower-priority entry indefinitely. That is
//! documented, accepted behavior: interactive scans are never starved
//! behind a bulk batch, and bulk work waits for quiet capacity.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use scangate::core::config::QueueConfig;
//! use scangate::notifications::api::{Event, EventFilter, ScanEventType};
//! use scangate::queue::api::{ScanQueueManager, ScanRequest, ScanSubmission};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ScanQueueManager::create(QueueConfig::default()).await?;
//! let mut events = manager
//!     .subscribe("executor", EventFilter::ScanOnly, "executor:runner")
//!     .await?;
//!
//! manager
//!     .submit(ScanSubmission::new(
//!         "req-1".to_string(),
//!         "scan-1".to_string(),
//!         "sha256:abc".to_string(),
//!         ScanRequest::new("registry.local/app:1.4"),
//!     ))
//!     .await?;
//!
//! // The executor loop reacts to Started events
//! while let Some(event) = events.recv().await {
//!     if let Event::Scan(scan) = event {
//!         if scan.event_type == ScanEventType::Started {
//!             // launch the scan, then report back:
//!             manager.complete(&scan.request_id).await?;
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod admission;
pub mod api;
pub mod entry;
pub mod error;
pub mod estimator;
pub mod governor;
pub mod manager;
pub mod types;

pub use entry::{EntryState, QueueEntry, ScanRequest};
pub use error::{QueueError, QueueResult};
pub use manager::ScanQueueManager;
pub use types::{CancelOutcome, QueueStats, QueuedEntryInfo, ScanSubmission, SubmitOutcome};

#[cfg(test)]
mod tests;

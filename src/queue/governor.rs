//! Concurrency governor: the sole authority on free slots
//!
//! Tracks the number of running scans against a fixed ceiling. Acquisition is
//! a single atomic check-and-increment, so two callers racing for the last
//! slot can never both win even without an outer lock.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Enforces the global concurrency ceiling
///
/// `max_concurrent` is fixed at construction from validated configuration.
/// Releasing more slots than were acquired is a programming error; the
/// governor logs it, counts it, and leaves the running count untouched.
#[derive(Debug)]
pub struct ConcurrencyGovernor {
    max_concurrent: usize,
    running: AtomicUsize,
    release_violations: AtomicU64,
}

impl ConcurrencyGovernor {
    /// Create a governor with the given ceiling
    ///
    /// The ceiling must be positive; `QueueConfig::validate` enforces this
    /// before construction.
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            max_concurrent,
            running: AtomicUsize::new(0),
            release_violations: AtomicU64::new(0),
        }
    }

    /// Atomically claim a slot if one is free
    pub fn try_acquire(&self) -> bool {
        self.running
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |running| {
                if running < self.max_concurrent {
                    Some(running + 1)
                } else {
                    None
                }
            })
            .is_ok()
    }

    /// Return a slot to the pool
    ///
    /// A release with no slots held never drives the count below zero.
    pub fn release(&self) {
        let result = self
            .running
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |running| {
                running.checked_sub(1)
            });
        if result.is_err() {
            self.release_violations.fetch_add(1, Ordering::Relaxed);
            log::error!("Slot released with none held; running count left at zero");
        }
    }

    pub fn running(&self) -> usize {
        self.running.load(Ordering::SeqCst)
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    pub fn available(&self) -> usize {
        self.max_concurrent.saturating_sub(self.running())
    }

    pub fn is_saturated(&self) -> bool {
        self.available() == 0
    }

    /// How many over-releases have been swallowed since construction
    pub fn release_violations(&self) -> u64 {
        self.release_violations.load(Ordering::Relaxed)
    }
}

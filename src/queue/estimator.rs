//! Wait-time estimation from queue position
//!
//! Advisory only: estimates are reported to users and never consulted for
//! scheduling decisions.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::time::Duration;

/// Rolling-average scan duration and position-based wait estimates
///
/// Seeded with a configured default until real durations arrive; afterwards
/// the average covers the most recent `window` observations.
#[derive(Debug)]
pub struct WaitTimeEstimator {
    default_duration: Duration,
    window: usize,
    samples: VecDeque<Duration>,
}

impl WaitTimeEstimator {
    pub fn new(default_duration: Duration, window: usize) -> Self {
        Self {
            default_duration,
            window,
            samples: VecDeque::with_capacity(window),
        }
    }

    /// Record an observed scan duration
    pub fn record(&mut self, duration: Duration) {
        self.samples.push_back(duration);
        while self.samples.len() > self.window {
            self.samples.pop_front();
        }
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Current average scan duration
    pub fn average(&self) -> Duration {
        if self.samples.is_empty() {
            return self.default_duration;
        }
        let total: Duration = self.samples.iter().sum();
        total / self.samples.len() as u32
    }

    /// Estimated wait for an entry at a 1-based queue position
    ///
    /// `max_concurrent` entries drain in parallel, so the wait shrinks
    /// proportionally with the ceiling.
    pub fn estimate(&self, position: usize, max_concurrent: usize) -> Duration {
        if max_concurrent == 0 {
            // Unreachable with validated configuration; avoid dividing by zero
            return self.average().saturating_mul(position as u32);
        }
        let secs = self.average().as_secs_f64() * position as f64 / max_concurrent as f64;
        Duration::from_secs_f64(secs)
    }

    /// Human-facing wall-clock estimate of when the entry will start
    pub fn estimated_start_at(&self, position: usize, max_concurrent: usize) -> DateTime<Utc> {
        let wait = self.estimate(position, max_concurrent);
        Utc::now()
            + chrono::Duration::from_std(wait).unwrap_or_else(|_| chrono::Duration::seconds(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_duration_before_samples() {
        let estimator = WaitTimeEstimator::new(Duration::from_secs(120), 10);
        assert_eq!(estimator.average(), Duration::from_secs(120));
        assert_eq!(estimator.sample_count(), 0);
    }

    #[test]
    fn test_average_over_recorded_samples() {
        let mut estimator = WaitTimeEstimator::new(Duration::from_secs(120), 10);
        estimator.record(Duration::from_secs(30));
        estimator.record(Duration::from_secs(90));

        assert_eq!(estimator.average(), Duration::from_secs(60));
    }

    #[test]
    fn test_window_evicts_oldest() {
        let mut estimator = WaitTimeEstimator::new(Duration::from_secs(120), 2);
        estimator.record(Duration::from_secs(1000));
        estimator.record(Duration::from_secs(10));
        estimator.record(Duration::from_secs(20));

        assert_eq!(estimator.sample_count(), 2);
        assert_eq!(estimator.average(), Duration::from_secs(15));
    }

    #[test]
    fn test_estimate_scales_with_position_and_ceiling() {
        let mut estimator = WaitTimeEstimator::new(Duration::from_secs(120), 10);
        estimator.record(Duration::from_secs(60));

        // position 3, ceiling 3: one full drain cycle
        assert_eq!(estimator.estimate(3, 3), Duration::from_secs(60));
        // position 6, ceiling 3: two cycles
        assert_eq!(estimator.estimate(6, 3), Duration::from_secs(120));
        // position 1, ceiling 4: a quarter cycle
        assert_eq!(estimator.estimate(1, 4), Duration::from_secs(15));
    }

    #[test]
    fn test_estimated_start_at_is_in_the_future() {
        let mut estimator = WaitTimeEstimator::new(Duration::from_secs(120), 10);
        estimator.record(Duration::from_secs(600));

        let now = Utc::now();
        let start_at = estimator.estimated_start_at(2, 2);
        assert!(start_at > now);
    }
}

//! The retry-history ring a [`super::node::SupervisorNode`] uses to decide
//! whether a failure is within its retry budget.

// Layer 1: Standard library imports
use std::collections::VecDeque;
use std::time::Duration;

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};

// Layer 3: Internal module imports
// (none)

/// Sliding-window count of restart timestamps. A restart is "within budget"
/// as long as fewer than `max_retries` restarts fall inside the trailing
/// `retry_period`; the window itself is not persisted, only recomputed on
/// each [`RetryHistory::record`].
#[derive(Debug, Clone)]
pub struct RetryHistory {
    timestamps: VecDeque<DateTime<Utc>>,
    max_retries: u32,
    retry_period: Duration,
}

impl RetryHistory {
    pub fn new(max_retries: u32, retry_period: Duration) -> Self {
        Self {
            timestamps: VecDeque::new(),
            max_retries,
            retry_period,
        }
    }

    /// Record a failure at `now` and report whether the retry budget for
    /// the current window has been exceeded.
    pub fn record(&mut self, now: DateTime<Utc>) -> bool {
        self.timestamps.push_back(now);
        self.evict_expired(now);
        self.timestamps.len() as u32 > self.max_retries
    }

    fn evict_expired(&mut self, now: DateTime<Utc>) {
        while let Some(&oldest) = self.timestamps.front() {
            let age = now.signed_duration_since(oldest);
            match age.to_std() {
                Ok(age) if age > self.retry_period => {
                    self.timestamps.pop_front();
                }
                _ => break,
            }
        }
    }

    pub fn count_in_window(&self) -> usize {
        self.timestamps.len()
    }
}

//! Shared mailbox types: overflow policy, mailbox kind, and errors.

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Layer 3: Internal module imports
// (none)

/// What an `enqueue` does once a mailbox is at capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverflowPolicy {
    /// Reject the new message, keep the mailbox unchanged.
    Drop,
    /// Evict the oldest queued message, then enqueue the new one.
    DropOldest,
    /// Park the sender up to the mailbox's `backpressure_wait`, then fail
    /// with [`MailboxError::Timeout`] if still full.
    BackPressure,
    /// Fail immediately with [`MailboxError::Full`].
    Reject,
}

impl Default for OverflowPolicy {
    fn default() -> Self {
        Self::Reject
    }
}

/// Which queuing discipline backs a mailbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MailboxKind {
    /// FIFO over an MPMC ring (C11).
    Standard,
    /// 4-level priority heap, FIFO within a level.
    Priority,
}

/// Mailbox-level configuration, independent of the backing queue kind.
#[derive(Debug, Clone, Copy)]
pub struct MailboxConfig {
    pub kind: MailboxKind,
    pub capacity: usize,
    pub overflow_policy: OverflowPolicy,
    pub backpressure_wait: Duration,
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self {
            kind: MailboxKind::Standard,
            capacity: 1024,
            overflow_policy: OverflowPolicy::Reject,
            backpressure_wait: Duration::from_millis(100),
        }
    }
}

#[derive(Debug, Error)]
pub enum MailboxError {
    #[error("mailbox is at capacity ({capacity})")]
    Full { capacity: usize },
    #[error("enqueue rejected: mailbox is closed")]
    Closed,
    #[error("enqueue timed out waiting for capacity after {0:?}")]
    Timeout(Duration),
}

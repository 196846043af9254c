//! FIFO mailbox backend over the shared lock-free MPMC ring (C11).

// Layer 1: Standard library imports
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// Layer 2: Third-party crate imports
use chrono::Utc;
use emberlang_mem::MpmcQueue;
use tokio::sync::Notify;
use tokio::time::timeout;

// Layer 3: Internal module imports
use super::metrics::{AtomicMetrics, MetricsRecorder};
use super::traits::{MailboxConfig, MailboxError, OverflowPolicy};
use crate::message::Envelope;

/// A FIFO mailbox. Capacity and overflow handling come from its
/// [`MailboxConfig`]; the queue itself is the same MPMC ring the allocator
/// uses for block free-lists.
pub struct StandardMailbox {
    queue: MpmcQueue<Envelope>,
    config: MailboxConfig,
    closed: AtomicBool,
    not_empty: Notify,
    not_full: Notify,
    metrics: Arc<AtomicMetrics>,
}

impl StandardMailbox {
    pub fn new(config: MailboxConfig) -> Self {
        Self {
            queue: MpmcQueue::with_capacity(config.capacity),
            config,
            closed: AtomicBool::new(false),
            not_empty: Notify::new(),
            not_full: Notify::new(),
            metrics: Arc::new(AtomicMetrics::new()),
        }
    }

    pub fn metrics(&self) -> &Arc<AtomicMetrics> {
        &self.metrics
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.not_empty.notify_waiters();
        self.not_full.notify_waiters();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Enqueue `envelope`, applying the configured [`OverflowPolicy`] once
    /// the ring is full.
    pub async fn enqueue(&self, envelope: Envelope) -> Result<(), MailboxError> {
        if self.is_closed() {
            return Err(MailboxError::Closed);
        }

        let mut envelope = envelope;
        loop {
            match self.queue.push(envelope) {
                Ok(()) => {
                    self.metrics.record_sent();
                    self.metrics.record_len(self.queue.len());
                    self.not_empty.notify_one();
                    return Ok(());
                }
                Err(returned) => {
                    envelope = returned;
                    match self.config.overflow_policy {
                        OverflowPolicy::Reject => {
                            return Err(MailboxError::Full {
                                capacity: self.config.capacity,
                            });
                        }
                        OverflowPolicy::Drop => {
                            self.metrics.record_dropped();
                            return Ok(());
                        }
                        OverflowPolicy::DropOldest => {
                            if self.queue.pop().is_some() {
                                self.metrics.record_dropped();
                            }
                            continue;
                        }
                        OverflowPolicy::BackPressure => {
                            let wait = self.not_full.notified();
                            match timeout(self.config.backpressure_wait, wait).await {
                                Ok(()) => continue,
                                Err(_) => {
                                    return Err(MailboxError::Timeout(
                                        self.config.backpressure_wait,
                                    ));
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    /// Dequeue the next envelope, waiting until one arrives or the mailbox
    /// is closed.
    pub async fn dequeue(&self) -> Option<Envelope> {
        loop {
            if let Some(envelope) = self.try_dequeue() {
                return Some(envelope);
            }
            if self.is_closed() {
                return None;
            }
            self.not_empty.notified().await;
        }
    }

    pub fn try_dequeue(&self) -> Option<Envelope> {
        let envelope = self.queue.pop();
        if envelope.is_some() {
            self.metrics.record_received();
            self.metrics.update_last_message(Utc::now());
            self.not_full.notify_one();
        }
        envelope
    }
}

//! Priority mailbox backend: a 4-level binary heap, FIFO within each level.

// Layer 1: Standard library imports
use std::cmp::Ordering as CmpOrdering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

// Layer 2: Third-party crate imports
use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::time::timeout;

// Layer 3: Internal module imports
use super::metrics::{AtomicMetrics, MetricsRecorder};
use super::traits::{MailboxConfig, MailboxError, OverflowPolicy};
use crate::message::Envelope;

/// An envelope tagged with its arrival sequence so the heap can order by
/// `(priority desc, seq asc)`: higher priority first, FIFO within a level.
struct Ranked {
    envelope: Envelope,
    seq: u64,
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.envelope.priority == other.envelope.priority && self.seq == other.seq
    }
}

impl Eq for Ranked {}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        self.envelope
            .priority
            .cmp(&other.envelope.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

pub struct PriorityMailbox {
    heap: Mutex<BinaryHeap<Ranked>>,
    next_seq: AtomicU64,
    config: MailboxConfig,
    closed: AtomicBool,
    not_empty: Notify,
    not_full: Notify,
    metrics: Arc<AtomicMetrics>,
}

impl PriorityMailbox {
    pub fn new(config: MailboxConfig) -> Self {
        Self {
            heap: Mutex::new(BinaryHeap::new()),
            next_seq: AtomicU64::new(0),
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
        self.heap.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
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

    /// Returns `None` on success, or the envelope back if the heap is at capacity.
    fn try_push(&self, envelope: Envelope) -> Option<Envelope> {
        let mut heap = self.heap.lock();
        if heap.len() >= self.config.capacity {
            return Some(envelope);
        }
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        heap.push(Ranked { envelope, seq });
        None
    }

    /// Evict the lowest-ranked entry (lowest priority, then longest-waiting).
    fn evict_lowest(&self) -> bool {
        let mut heap = self.heap.lock();
        let mut items: Vec<Ranked> = heap.drain().collect();
        let victim = items
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.cmp(b.1))
            .map(|(index, _)| index);
        let evicted = victim.map(|index| items.remove(index)).is_some();
        *heap = items.into_iter().collect();
        evicted
    }

    pub async fn enqueue(&self, envelope: Envelope) -> Result<(), MailboxError> {
        if self.is_closed() {
            return Err(MailboxError::Closed);
        }

        let mut envelope = envelope;
        loop {
            match self.try_push(envelope) {
                None => {
                    self.metrics.record_sent();
                    self.metrics.record_len(self.len());
                    self.not_empty.notify_one();
                    return Ok(());
                }
                Some(returned) => {
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
                            if self.evict_lowest() {
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
        let ranked = self.heap.lock().pop();
        match ranked {
            Some(ranked) => {
                self.metrics.record_received();
                self.metrics.update_last_message(Utc::now());
                self.not_full.notify_one();
                Some(ranked.envelope)
            }
            None => None,
        }
    }
}

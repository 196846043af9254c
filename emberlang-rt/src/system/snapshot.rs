//! Read-only views into a running [`super::ActorSystem`]: per-actor
//! snapshots, system-wide statistics, and the tracing ring feeding
//! `getRecentMessages` (§6).

// Layer 1: Standard library imports
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
use crate::actor::ActorState;
use crate::util::{ActorId, SupervisorId};

/// `ActorSnapshot{id, name, state, mailboxLen, childCount, supervisorId}` (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorSnapshot {
    pub id: ActorId,
    pub name: Option<String>,
    pub state: ActorState,
    pub mailbox_len: usize,
    pub child_count: usize,
    pub supervisor_id: Option<SupervisorId>,
}

/// Atomic counters backing [`SystemStatistics`] (§3's supplemented ambient
/// types). Reads are a point-in-time snapshot; writes never block.
#[derive(Debug, Default)]
pub struct StatisticsCounters {
    total_messages: AtomicU64,
    actors_created: AtomicU64,
    restarts: AtomicU64,
    io_pauses_read: AtomicU64,
    io_resumes_read: AtomicU64,
    io_rate_limited_drops: AtomicU64,
}

impl StatisticsCounters {
    pub fn record_message(&self) {
        self.total_messages.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_actor_created(&self) {
        self.actors_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_restart(&self) {
        self.restarts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_io_pause(&self) {
        self.io_pauses_read.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_io_resume(&self) {
        self.io_resumes_read.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_io_rate_limited_drop(&self) {
        self.io_rate_limited_drops.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> SystemStatistics {
        SystemStatistics {
            total_messages: self.total_messages.load(Ordering::Relaxed),
            actors_created: self.actors_created.load(Ordering::Relaxed),
            restarts: self.restarts.load(Ordering::Relaxed),
            io_pauses_read: self.io_pauses_read.load(Ordering::Relaxed),
            io_resumes_read: self.io_resumes_read.load(Ordering::Relaxed),
            io_rate_limited_drops: self.io_rate_limited_drops.load(Ordering::Relaxed),
        }
    }
}

/// `SystemStatistics{totalMessages, actorsCreated, restarts, ioPausesRead,
/// ioResumesRead, ioRateLimitedDrops}` (§3, matches `SystemSnapshot.statistics`).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SystemStatistics {
    pub total_messages: u64,
    pub actors_created: u64,
    pub restarts: u64,
    pub io_pauses_read: u64,
    pub io_resumes_read: u64,
    pub io_rate_limited_drops: u64,
}

/// One entry in the tracing ring fed to `getRecentMessages`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEvent {
    pub timestamp: DateTime<Utc>,
    pub sender: ActorId,
    pub receiver: ActorId,
    pub message_type: &'static str,
}

/// Bounded ring buffer of recent message deliveries. Disabled (capacity 0)
/// until `enableTracing(ringSize)` is called.
pub struct TracingRing {
    capacity: Mutex<usize>,
    events: Mutex<VecDeque<TraceEvent>>,
}

impl TracingRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: Mutex::new(capacity),
            events: Mutex::new(VecDeque::new()),
        }
    }

    pub fn enable(&self, ring_size: usize) {
        *self.capacity.lock() = ring_size;
        let mut events = self.events.lock();
        while events.len() > ring_size {
            events.pop_front();
        }
    }

    pub fn record(&self, event: TraceEvent) {
        let capacity = *self.capacity.lock();
        if capacity == 0 {
            return;
        }
        let mut events = self.events.lock();
        if events.len() >= capacity {
            events.pop_front();
        }
        events.push_back(event);
    }

    pub fn recent(&self) -> Vec<TraceEvent> {
        self.events.lock().iter().cloned().collect()
    }
}

/// `SystemSnapshot{actors[], statistics{...}, tracing{recentEvents}}` (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemSnapshot {
    pub actors: Vec<ActorSnapshot>,
    pub statistics: SystemStatistics,
    pub recent_events: Vec<TraceEvent>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_independently() {
        let counters = StatisticsCounters::default();
        counters.record_message();
        counters.record_message();
        counters.record_restart();

        let snapshot = counters.snapshot();
        assert_eq!(snapshot.total_messages, 2);
        assert_eq!(snapshot.restarts, 1);
        assert_eq!(snapshot.actors_created, 0);
    }

    #[test]
    fn ring_disabled_by_default_records_nothing() {
        let ring = TracingRing::new(0);
        ring.record(TraceEvent {
            timestamp: Utc::now(),
            sender: ActorId::nil(),
            receiver: ActorId::new(),
            message_type: "ping",
        });
        assert!(ring.recent().is_empty());
    }

    #[test]
    fn enabling_ring_bounds_history_to_the_new_size() {
        let ring = TracingRing::new(0);
        ring.enable(2);
        for _ in 0..5 {
            ring.record(TraceEvent {
                timestamp: Utc::now(),
                sender: ActorId::nil(),
                receiver: ActorId::new(),
                message_type: "ping",
            });
        }
        assert_eq!(ring.recent().len(), 2);
    }
}

//! Worker pool driving every actor's mailbox (C8).

// Layer 1: Standard library imports
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use emberlang_mem::MpmcQueue;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::warn;

// Layer 3: Internal module imports
use super::scheduled_actor::ScheduledActor;
use crate::actor::{ActorState, BehaviorError, ErrorAction};
use crate::message::Envelope;
use crate::util::ActorId;

/// Looks up a live actor and receives its failures. Implemented by
/// `ActorSystem`; kept as a `dyn` boundary so `scheduler` has no upward
/// dependency on `system` or `supervisor`.
pub trait SchedulerHost: Send + Sync {
    fn lookup(&self, id: ActorId) -> Option<Arc<ScheduledActor>>;
    fn on_failure(&self, actor: ActorId, action: ErrorAction, error: BehaviorError, envelope: Envelope);
}

/// Default shutdown deadline (§5): workers past this are logged, not waited on.
pub const DEFAULT_SHUTDOWN_DEADLINE: Duration = Duration::from_secs(5);

pub struct SchedulerConfig {
    pub worker_count: usize,
    pub throughput_budget: usize,
    pub ready_queue_capacity: usize,
    pub shutdown_deadline: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            worker_count: num_cpus::get().max(1),
            throughput_budget: 32,
            ready_queue_capacity: 65_536,
            shutdown_deadline: DEFAULT_SHUTDOWN_DEADLINE,
        }
    }
}

/// `N` `tokio::task` workers polling a shared MPMC ready-queue (C11) of
/// actor ids. Mirrors the teacher's async-first concurrency model rather
/// than raw OS threads.
pub struct Scheduler {
    ready_queue: Arc<MpmcQueue<ActorId>>,
    host: Arc<dyn SchedulerHost>,
    config: SchedulerConfig,
    stopping: Arc<AtomicBool>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl Scheduler {
    pub fn new(host: Arc<dyn SchedulerHost>, config: SchedulerConfig) -> Self {
        Self {
            ready_queue: Arc::new(MpmcQueue::with_capacity(config.ready_queue_capacity)),
            host,
            config,
            stopping: Arc::new(AtomicBool::new(false)),
            workers: Mutex::new(Vec::new()),
        }
    }

    /// Mark `actor` ready. No-op if it is already in the ready-queue.
    pub fn notify_ready(&self, actor: ActorId) {
        if let Some(scheduled) = self.host.lookup(actor) {
            if scheduled.try_mark_scheduled() {
                // Queue is sized generously; a full queue means the system
                // is already saturated, so drop the (redundant) wake-up
                // rather than block the caller.
                if self.ready_queue.push(actor).is_err() {
                    scheduled.clear_scheduled();
                }
            }
        }
    }

    pub fn start(&self) {
        self.stopping.store(false, Ordering::SeqCst);
        let mut workers = self.workers.lock();
        for _ in 0..self.config.worker_count {
            let ready_queue = Arc::clone(&self.ready_queue);
            let host = Arc::clone(&self.host);
            let stopping = Arc::clone(&self.stopping);
            let budget = self.config.throughput_budget;
            workers.push(tokio::spawn(worker_loop(ready_queue, host, stopping, budget)));
        }
    }

    /// Stop accepting new work and wait for in-flight workers to drain,
    /// up to the configured shutdown deadline.
    pub async fn stop(&self) {
        self.stopping.store(true, Ordering::SeqCst);
        let handles = std::mem::take(&mut *self.workers.lock());
        let joined = tokio::time::timeout(self.config.shutdown_deadline, futures::future::join_all(handles)).await;
        if joined.is_err() {
            warn!(
                deadline_secs = self.config.shutdown_deadline.as_secs(),
                "scheduler workers still running past shutdown deadline"
            );
        }
    }
}

async fn worker_loop(
    ready_queue: Arc<MpmcQueue<ActorId>>,
    host: Arc<dyn SchedulerHost>,
    stopping: Arc<AtomicBool>,
    budget: usize,
) {
    loop {
        match ready_queue.pop() {
            Some(actor_id) => drain_actor(actor_id, &ready_queue, &host, budget).await,
            None => {
                if stopping.load(Ordering::SeqCst) {
                    return;
                }
                tokio::task::yield_now().await;
            }
        }
    }
}

async fn drain_actor(
    actor_id: ActorId,
    ready_queue: &MpmcQueue<ActorId>,
    host: &Arc<dyn SchedulerHost>,
    budget: usize,
) {
    let Some(scheduled) = host.lookup(actor_id) else {
        return;
    };

    let mut processed = 0;
    loop {
        if processed >= budget {
            break;
        }
        let mut actor = scheduled.actor.lock().await;
        // `Suspended` only pauses the I/O source that feeds this actor
        // (§4.9 watermark back-pressure); the actor keeps draining its
        // existing backlog so the mailbox can fall back below the low
        // watermark.
        if !matches!(actor.state(), ActorState::Running | ActorState::Suspended) {
            break;
        }
        let Some(envelope) = actor.mailbox.try_dequeue() else {
            break;
        };
        if let Err((action, error, envelope)) = actor.process_message(envelope).await {
            drop(actor);
            host.on_failure(actor_id, action, error, envelope);
        }
        processed += 1;
    }

    scheduled.clear_scheduled();

    // An enqueue may have landed between the last empty check and the
    // clear above; re-arm so it isn't stranded.
    if !scheduled.actor.lock().await.mailbox.is_empty() && scheduled.try_mark_scheduled() {
        let _ = ready_queue.push(actor_id);
    }
}

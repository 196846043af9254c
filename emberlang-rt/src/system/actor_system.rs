//! The actor system facade (C10): owns every subsystem and is the single
//! concrete implementor of the `dyn` boundary traits that let `actor`,
//! `dispatcher`, and `scheduler` stay ignorant of `system`.

// Layer 1: Standard library imports
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tracing::info;

// Layer 3: Internal module imports
use super::config::SystemConfig;
use super::errors::SystemError;
use super::io::{
    ConnId, FsWatcher, IoError, IoEvent, IoEventKind, IoReadable, IoWritable, NoopFsWatcher,
    NoopPoller, Poller, RateLimiter,
};
use super::snapshot::{ActorSnapshot, StatisticsCounters, SystemSnapshot, TraceEvent, TracingRing};
use crate::actor::{
    Actor, ActorContext, ActorKind, ActorState, Behavior, BehaviorError, ContextError, ErrorAction,
    RuntimeServices,
};
use crate::dispatcher::{DispatchRule, Dispatcher, MailboxLookup};
use crate::mailbox::{Mailbox, MailboxConfig};
use crate::message::{Envelope, Message, MessagePriority};
use crate::scheduler::{ScheduledActor, Scheduler, SchedulerConfig, SchedulerHost};
use crate::supervisor::{SupervisionDecision, SupervisorTree};
use crate::util::{ActorAddress, ActorId, SupervisorId};

/// Delivered to a watcher when the actor it watched has stopped.
#[derive(Debug, Clone, Copy)]
pub struct Terminated {
    pub actor: ActorId,
}
impl Message for Terminated {
    const MESSAGE_TYPE: &'static str = "terminated";
}

/// What the I/O bridge needs to re-register a connection once the
/// background monitor finds it drained back below `watermark_low`.
#[derive(Clone)]
struct ConnRegistration {
    actor: ActorId,
    kinds: Vec<IoEventKind>,
}

/// Indirection that lets [`ActorSystem`] hand `Arc<dyn MailboxLookup>` and
/// `Arc<dyn SchedulerHost>` to its own collaborators before the `Arc<Self>`
/// constructed by `Arc::new_cyclic` exists. Both calls resolve by upgrading
/// the weak reference once the system is fully built.
struct SystemHandle(Weak<ActorSystem>);

impl MailboxLookup for SystemHandle {
    fn mailbox(&self, actor: ActorId) -> Option<Arc<Mailbox>> {
        self.0.upgrade()?.mailbox_for(actor)
    }
}

impl SchedulerHost for SystemHandle {
    fn lookup(&self, id: ActorId) -> Option<Arc<ScheduledActor>> {
        self.0.upgrade()?.registry.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    fn on_failure(&self, actor: ActorId, action: ErrorAction, error: BehaviorError, envelope: Envelope) {
        if let Some(system) = self.0.upgrade() {
            system.handle_failure(actor, action, error, envelope);
        }
    }
}

/// Owns the supervision tree, dispatcher, scheduler, mailbox registry, and
/// I/O bridge for one runtime instance. Constructed via `Arc::new_cyclic`
/// since it is both the producer and the sole consumer of the `dyn`
/// collaborator traits `actor`/`dispatcher`/`scheduler` expose (§4.9).
pub struct ActorSystem {
    weak_self: Weak<ActorSystem>,
    config: SystemConfig,
    registry: DashMap<ActorId, Arc<ScheduledActor>>,
    mailboxes: DashMap<ActorId, Arc<Mailbox>>,
    names: DashMap<String, ActorId>,
    children: DashMap<ActorId, Vec<ActorId>>,
    watchers: DashMap<ActorId, Vec<ActorId>>,
    groups: DashMap<String, Vec<ActorId>>,
    supervisors: SupervisorTree,
    dispatcher: Dispatcher,
    scheduler: Scheduler,
    statistics: StatisticsCounters,
    tracing: TracingRing,
    rate_limiters: DashMap<ConnId, RateLimiter>,
    registrations: DashMap<ConnId, ConnRegistration>,
    paused_conns: DashMap<ConnId, ()>,
    poller: Arc<dyn Poller>,
    fs_watcher: Arc<dyn FsWatcher>,
    shutting_down: AtomicBool,
}

impl ActorSystem {
    /// Build a system with no I/O bridge wired in; `watchConnWithActor`/
    /// `watchPathWithActor` are no-ops until [`Self::with_io`] is used instead.
    pub fn new(config: SystemConfig) -> Arc<Self> {
        Self::with_io(config, Arc::new(NoopPoller), Arc::new(NoopFsWatcher))
    }

    pub fn with_io(config: SystemConfig, poller: Arc<dyn Poller>, fs_watcher: Arc<dyn FsWatcher>) -> Arc<Self> {
        let worker_count = config.worker_count.unwrap_or_else(|| num_cpus::get().max(1));
        let shutdown_deadline = config.shutdown_deadline;
        let tracing_ring_size = config.tracing_ring_size;
        let root_supervisor_strategy = config.root_supervisor_strategy;
        let root_supervisor_type = config.root_supervisor_type;
        let root_max_retries = config.root_max_retries;
        let root_retry_period = config.root_retry_period;

        Arc::new_cyclic(|me| {
            let handle = Arc::new(SystemHandle(me.clone()));
            let mailbox_lookup: Arc<dyn MailboxLookup> = handle.clone();
            let scheduler_host: Arc<dyn SchedulerHost> = handle;

            let dispatcher = Dispatcher::new(mailbox_lookup);
            let scheduler_config = SchedulerConfig {
                worker_count,
                shutdown_deadline,
                ..SchedulerConfig::default()
            };
            let scheduler = Scheduler::new(scheduler_host, scheduler_config);

            Self {
                weak_self: me.clone(),
                config,
                registry: DashMap::new(),
                mailboxes: DashMap::new(),
                names: DashMap::new(),
                children: DashMap::new(),
                watchers: DashMap::new(),
                groups: DashMap::new(),
                supervisors: SupervisorTree::new(
                    root_supervisor_strategy,
                    root_supervisor_type,
                    root_max_retries,
                    root_retry_period,
                ),
                dispatcher,
                scheduler,
                statistics: StatisticsCounters::default(),
                tracing: TracingRing::new(tracing_ring_size),
                rate_limiters: DashMap::new(),
                registrations: DashMap::new(),
                paused_conns: DashMap::new(),
                poller,
                fs_watcher,
                shutting_down: AtomicBool::new(false),
            }
        })
    }

    pub fn root_supervisor(&self) -> SupervisorId {
        self.supervisors.root()
    }

    pub fn start(self: &Arc<Self>) {
        self.scheduler.start();
        let system = Arc::clone(self);
        tokio::spawn(async move {
            system.run_io_monitor().await;
        });
    }

    /// Stop accepting new work and drain the scheduler within the
    /// configured shutdown deadline.
    pub async fn stop(&self) {
        self.shutting_down.store(true, Ordering::SeqCst);
        self.scheduler.stop().await;
    }

    /// Background monitor (§4.9 `MonitorInterval`): periodically re-checks
    /// every connection paused by [`Self::apply_watermark`] and
    /// re-registers it with the poller once its actor's mailbox has
    /// drained back to `watermark_low`.
    async fn run_io_monitor(self: Arc<Self>) {
        let mut ticker = tokio::time::interval(self.config.io_monitor_interval);
        loop {
            ticker.tick().await;
            if self.shutting_down.load(Ordering::SeqCst) {
                return;
            }

            let paused: Vec<ConnId> = self.paused_conns.iter().map(|entry| *entry.key()).collect();
            for conn in paused {
                let Some(registration) = self.registrations.get(&conn).map(|entry| entry.value().clone()) else {
                    self.paused_conns.remove(&conn);
                    continue;
                };
                let mailbox_len = self.mailbox_for(registration.actor).map(|mailbox| mailbox.len()).unwrap_or(0);
                if mailbox_len > self.config.watermark_low {
                    continue;
                }

                let Some(entry) = self.registry.get(&registration.actor) else {
                    self.paused_conns.remove(&conn);
                    self.registrations.remove(&conn);
                    continue;
                };
                let scheduled = Arc::clone(entry.value());
                drop(entry);
                let mut guard = scheduled.actor.lock().await;
                if guard.state() == ActorState::Suspended {
                    guard.resume();
                }
                drop(guard);

                self.register_with_poller(conn, registration.actor, registration.kinds.clone());
                self.paused_conns.remove(&conn);
                self.statistics.record_io_resume();
                self.scheduler.notify_ready(registration.actor);
            }
        }
    }

    /// `createActor` (§4.9): spawn a top-level or child actor.
    #[allow(clippy::too_many_arguments)]
    pub async fn spawn(
        self: &Arc<Self>,
        parent: Option<ActorId>,
        name: Option<String>,
        kind: ActorKind,
        behavior: Box<dyn Behavior>,
        mailbox_config: Option<MailboxConfig>,
        supervisor_id: Option<SupervisorId>,
    ) -> Result<ActorId, SystemError> {
        if self.shutting_down.load(Ordering::SeqCst) {
            return Err(SystemError::ShuttingDown);
        }
        let mailbox_config = mailbox_config.unwrap_or_else(|| MailboxConfig {
            kind: self.config.default_mailbox_kind,
            capacity: self.config.default_mailbox_capacity,
            overflow_policy: self.config.default_overflow_policy,
            ..MailboxConfig::default()
        });
        self.create_actor(parent, name, kind, behavior, mailbox_config, supervisor_id).await
    }

    async fn create_actor(
        self: &Arc<Self>,
        parent: Option<ActorId>,
        name: Option<String>,
        kind: ActorKind,
        behavior: Box<dyn Behavior>,
        mailbox_config: MailboxConfig,
        supervisor_id: Option<SupervisorId>,
    ) -> Result<ActorId, SystemError> {
        let address = match &name {
            Some(n) => ActorAddress::named(n.clone()),
            None => ActorAddress::anonymous(),
        };
        let id = address.id();
        let services: Arc<dyn RuntimeServices> = Arc::clone(self);
        let context = ActorContext::new(address, parent, services);
        let mailbox = Arc::new(Mailbox::new(mailbox_config));
        let supervisor = supervisor_id.unwrap_or_else(|| self.supervisors.root());

        let mut actor = Actor::new(id, name.clone(), kind, Arc::clone(&mailbox), behavior, context, parent, Some(supervisor));
        actor
            .start()
            .await
            .map_err(|error| SystemError::SpawnFailed(error.to_string()))?;

        self.mailboxes.insert(id, mailbox);
        self.registry.insert(id, Arc::new(ScheduledActor::new(actor)));
        if let Some(n) = &name {
            self.names.insert(n.clone(), id);
        }
        self.supervisors.register_child(supervisor, id)?;
        if let Some(parent_id) = parent {
            self.children.entry(parent_id).or_default().push(id);
        }
        self.statistics.record_actor_created();
        info!(actor = %id, "actor spawned");
        Ok(id)
    }

    pub fn actor_by_name(&self, name: &str) -> Option<ActorId> {
        self.names.get(name).map(|entry| *entry.value())
    }

    fn mailbox_for(&self, actor: ActorId) -> Option<Arc<Mailbox>> {
        self.mailboxes.get(&actor).map(|entry| Arc::clone(entry.value()))
    }

    /// `sendMessage` (§4.9).
    pub async fn send_message<M: Message>(&self, sender: ActorId, target: ActorId, message: M) -> Result<ActorId, SystemError> {
        self.route_envelope(Envelope::new(sender, target, message)).await
    }

    async fn route_envelope(&self, envelope: Envelope) -> Result<ActorId, SystemError> {
        let message_type = envelope.message_type;
        let sender = envelope.sender;
        let receiver = self.dispatcher.dispatch(envelope).await?;
        self.tracing.record(TraceEvent {
            timestamp: Utc::now(),
            sender,
            receiver,
            message_type,
        });
        self.statistics.record_message();
        self.scheduler.notify_ready(receiver);
        Ok(receiver)
    }

    /// Register (or overwrite) the dispatcher's route for `message_type`
    /// (§4.6): the next message of that type is redirected to `rule.target`
    /// with `rule.priority` as a floor, regardless of its original receiver.
    pub fn add_route(&self, message_type: &'static str, rule: DispatchRule) {
        self.dispatcher.add_route(message_type, rule);
    }

    pub fn remove_route(&self, message_type: &str) {
        self.dispatcher.remove_route(message_type);
    }

    /// `createGroup` (§4.9).
    pub fn create_group(&self, name: impl Into<String>) {
        self.groups.entry(name.into()).or_default();
    }

    /// `addToGroup` (§4.9).
    pub fn add_to_group(&self, group: &str, actor: ActorId) -> Result<(), SystemError> {
        let mut members = self
            .groups
            .get_mut(group)
            .ok_or_else(|| SystemError::UnknownGroup(group.to_string()))?;
        if !members.contains(&actor) {
            members.push(actor);
        }
        Ok(())
    }

    /// `broadcast` (§4.9): send a clone of `message` to every group member.
    pub async fn broadcast<M: Message + Clone>(&self, group: &str, sender: ActorId, message: M) -> Result<(), SystemError> {
        let members = self
            .groups
            .get(group)
            .ok_or_else(|| SystemError::UnknownGroup(group.to_string()))?
            .clone();
        for target in members {
            self.route_envelope(Envelope::new(sender, target, message.clone())).await?;
        }
        Ok(())
    }

    /// `watchConnWithActor` (§6): bind a readiness-poller connection to
    /// `actor`, delivering `IOReadable`/`IOWritable`/`IOError` subject to the
    /// per-connection rate limit and mailbox watermark back-pressure.
    pub fn watch_conn_with_actor(self: &Arc<Self>, conn: ConnId, actor: ActorId, kinds: Vec<IoEventKind>) {
        self.rate_limiters
            .insert(conn, RateLimiter::new(self.config.io_rate_limit_per_sec, self.config.io_rate_limit_burst));
        self.registrations.insert(conn, ConnRegistration { actor, kinds: kinds.clone() });
        self.register_with_poller(conn, actor, kinds);
    }

    fn register_with_poller(self: &Arc<Self>, conn: ConnId, actor: ActorId, kinds: Vec<IoEventKind>) {
        let system = Arc::clone(self);
        self.poller.register(
            conn,
            kinds,
            Arc::new(move |event: IoEvent| {
                let system = Arc::clone(&system);
                tokio::spawn(async move {
                    system.handle_io_event(actor, event).await;
                });
            }),
        );
    }

    pub fn unwatch_conn(&self, conn: ConnId) {
        self.poller.deregister(conn);
        self.rate_limiters.remove(&conn);
        self.registrations.remove(&conn);
        self.paused_conns.remove(&conn);
    }

    async fn handle_io_event(&self, actor: ActorId, event: IoEvent) {
        let allowed = self
            .rate_limiters
            .get(&event.conn)
            .map(|limiter| limiter.try_acquire())
            .unwrap_or(true);

        let mut envelope = match event.kind {
            IoEventKind::Readable => Envelope::new(ActorId::nil(), actor, IoReadable),
            IoEventKind::Writable => Envelope::new(ActorId::nil(), actor, IoWritable),
            IoEventKind::Error => Envelope::new(
                ActorId::nil(),
                actor,
                IoError {
                    reason: "connection reported an error".to_string(),
                },
            ),
        };

        if !allowed {
            if self.config.drop_on_rate_limit {
                self.statistics.record_io_rate_limited_drop();
                return;
            }
            envelope.priority = MessagePriority::Low;
        }

        let delivered = self.route_envelope(envelope).await;

        if delivered.is_ok() {
            if let Some(mailbox) = self.mailbox_for(actor) {
                self.apply_watermark(actor, event.conn, mailbox.len()).await;
            }
        }
    }

    /// Deregister `conn` once the mailbox it feeds crosses the high
    /// watermark (§4.9); the actor keeps draining its backlog, and the
    /// background monitor re-registers `conn` once that backlog falls
    /// back to the low watermark.
    async fn apply_watermark(&self, actor: ActorId, conn: ConnId, mailbox_len: usize) {
        if mailbox_len < self.config.watermark_high || self.paused_conns.contains_key(&conn) {
            return;
        }
        let Some(entry) = self.registry.get(&actor) else {
            return;
        };
        let scheduled = Arc::clone(entry.value());
        drop(entry);
        let mut guard = scheduled.actor.lock().await;
        if guard.state() != ActorState::Running {
            return;
        }
        guard.suspend();
        drop(guard);

        self.poller.deregister(conn);
        self.paused_conns.insert(conn, ());
        self.statistics.record_io_pause();
    }

    /// `watchPathWithActor` (§6): forward filesystem events under `path` to
    /// `actor` as they arrive.
    pub async fn watch_path_with_actor(self: &Arc<Self>, path: &Path, recursive: bool, actor: ActorId) -> Result<(), SystemError> {
        let mut events = self
            .fs_watcher
            .watch(recursive, path)
            .await
            .map_err(SystemError::Io)?;
        let system = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                let _ = system.send_message(ActorId::nil(), actor, event).await;
            }
        });
        Ok(())
    }

    /// `enableTracing` (§6).
    pub fn enable_tracing(&self, ring_size: usize) {
        self.tracing.enable(ring_size);
    }

    /// `getRecentMessages` (§6).
    pub fn recent_messages(&self) -> Vec<TraceEvent> {
        self.tracing.recent()
    }

    /// `getActorSnapshot` (§6).
    pub async fn actor_snapshot(&self, actor: ActorId) -> Option<ActorSnapshot> {
        let scheduled = {
            let entry = self.registry.get(&actor)?;
            Arc::clone(entry.value())
        };
        let mailbox_len = self.mailbox_for(actor).map(|mailbox| mailbox.len()).unwrap_or(0);
        let guard = scheduled.actor.lock().await;
        Some(ActorSnapshot {
            id: actor,
            name: guard.name.clone(),
            state: guard.state(),
            mailbox_len,
            child_count: guard.child_ids.len(),
            supervisor_id: guard.supervisor_id,
        })
    }

    /// `getSystemSnapshot` (§6).
    pub async fn system_snapshot(&self) -> SystemSnapshot {
        let ids: Vec<ActorId> = self.registry.iter().map(|entry| *entry.key()).collect();
        let mut actors = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(snapshot) = self.actor_snapshot(id).await {
                actors.push(snapshot);
            }
        }
        SystemSnapshot {
            actors,
            statistics: self.statistics.snapshot(),
            recent_events: self.tracing.recent(),
        }
    }

    fn handle_failure(self: &Arc<Self>, actor: ActorId, action: ErrorAction, error: BehaviorError, envelope: Envelope) {
        let system = Arc::clone(self);
        tokio::spawn(async move {
            system.apply_error_action(actor, action, error, envelope).await;
        });
    }

    async fn apply_error_action(&self, actor: ActorId, action: ErrorAction, error: BehaviorError, envelope: Envelope) {
        if action == ErrorAction::Resume {
            if let Some(entry) = self.registry.get(&actor) {
                let scheduled = Arc::clone(entry.value());
                drop(entry);
                scheduled.actor.lock().await.resume();
            }
            return;
        }

        let decision = self
            .supervisors
            .handle_failure(actor)
            .unwrap_or(SupervisionDecision::Stop(vec![actor]));
        self.carry_out_decision(decision, &error, actor, &envelope).await;
    }

    /// `failed_actor`/`envelope` identify the actor that actually raised
    /// `cause` and the message it was handling; siblings restarted
    /// alongside it under `OneForAll`/`RestForOne` get `None` instead, per
    /// `Behavior::pre_restart`'s contract.
    async fn carry_out_decision(
        &self,
        decision: SupervisionDecision,
        cause: &BehaviorError,
        failed_actor: ActorId,
        envelope: &Envelope,
    ) {
        match decision {
            SupervisionDecision::Resume => {}
            SupervisionDecision::Restart(actors) => {
                for id in actors {
                    let offending = if id == failed_actor { Some(envelope) } else { None };
                    self.restart_actor(id, cause, offending).await;
                }
            }
            SupervisionDecision::Stop(actors) => {
                for id in actors {
                    self.stop_actor(id).await;
                }
            }
            // `SupervisorTree::handle_failure` already folds an unresolved
            // escalation at the root into `Stop`; this arm is unreachable.
            SupervisionDecision::Escalate => {}
        }
    }

    async fn restart_actor(&self, actor: ActorId, cause: &BehaviorError, envelope: Option<&Envelope>) {
        let Some(entry) = self.registry.get(&actor) else {
            return;
        };
        let scheduled = Arc::clone(entry.value());
        drop(entry);
        let mut guard = scheduled.actor.lock().await;
        if guard.restart(cause, envelope).await.is_ok() {
            drop(guard);
            self.statistics.record_restart();
            self.scheduler.notify_ready(actor);
        }
    }

    async fn stop_actor(&self, actor: ActorId) {
        if let Some((_, scheduled)) = self.registry.remove(&actor) {
            let mut guard = scheduled.actor.lock().await;
            let _ = guard.stop().await;
        }
        self.mailboxes.remove(&actor);

        let watcher_list = self.watchers.remove(&actor).map(|(_, list)| list).unwrap_or_default();
        for watcher in watcher_list {
            let _ = self.route_envelope(Envelope::new(ActorId::nil(), watcher, Terminated { actor })).await;
        }
    }
}

#[async_trait]
impl RuntimeServices for ActorSystem {
    async fn spawn(
        &self,
        parent: ActorId,
        name: Option<String>,
        kind: ActorKind,
        behavior: Box<dyn Behavior>,
        mailbox_config: MailboxConfig,
        supervisor_id: Option<SupervisorId>,
    ) -> Result<ActorId, ContextError> {
        let system = self.weak_self.upgrade().ok_or(ContextError::ShuttingDown)?;
        let parent = if parent.is_nil() { None } else { Some(parent) };
        system
            .create_actor(parent, name, kind, behavior, mailbox_config, supervisor_id)
            .await
            .map_err(|error| match error {
                SystemError::ShuttingDown => ContextError::ShuttingDown,
                other => ContextError::SpawnFailed(other.to_string()),
            })
    }

    async fn tell(&self, _sender: ActorId, target: ActorId, envelope: Envelope) -> Result<(), ContextError> {
        let system = self.weak_self.upgrade().ok_or(ContextError::ShuttingDown)?;
        system
            .route_envelope(envelope)
            .await
            .map(|_| ())
            .map_err(|_| ContextError::UnknownTarget(target))
    }

    fn watch(&self, watcher: ActorId, target: ActorId) {
        self.watchers.entry(target).or_default().push(watcher);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::actor::ActorContext;
    use parking_lot::Mutex;
    use std::time::Duration;

    #[derive(Debug)]
    struct Ping;
    impl Message for Ping {
        const MESSAGE_TYPE: &'static str = "ping";
    }

    #[derive(Debug)]
    struct BoomError;
    impl std::fmt::Display for BoomError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "boom")
        }
    }
    impl std::error::Error for BoomError {}

    struct CountingBehavior {
        received: Arc<Mutex<u32>>,
        fail_times: Arc<Mutex<u32>>,
    }

    #[async_trait]
    impl Behavior for CountingBehavior {
        async fn receive(&mut self, _ctx: &mut ActorContext, _envelope: &Envelope) -> Result<(), BehaviorError> {
            let mut remaining = self.fail_times.lock();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(Box::new(BoomError));
            }
            drop(remaining);
            *self.received.lock() += 1;
            Ok(())
        }

        fn on_error(&mut self, _error: &BehaviorError) -> ErrorAction {
            ErrorAction::Restart
        }
    }

    async fn wait_until(mut predicate: impl FnMut() -> bool) {
        for _ in 0..100 {
            if predicate() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test]
    async fn spawning_an_actor_records_statistics_and_starts_it() {
        let system = ActorSystem::new(SystemConfig::default());
        system.start();

        let actor_id = system
            .spawn(
                None,
                None,
                ActorKind::User,
                Box::new(CountingBehavior {
                    received: Arc::new(Mutex::new(0)),
                    fail_times: Arc::new(Mutex::new(0)),
                }),
                None,
                None,
            )
            .await
            .expect("spawn succeeds");

        let snapshot = system.actor_snapshot(actor_id).await.expect("actor exists");
        assert_eq!(snapshot.state, ActorState::Running);
        assert_eq!(system.system_snapshot().await.statistics.actors_created, 1);
        system.stop().await;
    }

    #[tokio::test]
    async fn send_message_is_delivered_and_scheduled() {
        let system = ActorSystem::new(SystemConfig::default());
        system.start();
        let received = Arc::new(Mutex::new(0));

        let actor_id = system
            .spawn(
                None,
                None,
                ActorKind::User,
                Box::new(CountingBehavior {
                    received: received.clone(),
                    fail_times: Arc::new(Mutex::new(0)),
                }),
                None,
                None,
            )
            .await
            .expect("spawn succeeds");

        system
            .send_message(ActorId::nil(), actor_id, Ping)
            .await
            .expect("known receiver");

        wait_until(|| *received.lock() == 1).await;
        assert_eq!(*received.lock(), 1);
        system.stop().await;
    }

    #[tokio::test]
    async fn named_actor_is_resolvable_by_name() {
        let system = ActorSystem::new(SystemConfig::default());
        let actor_id = system
            .spawn(
                None,
                Some("worker".to_string()),
                ActorKind::User,
                Box::new(CountingBehavior {
                    received: Arc::new(Mutex::new(0)),
                    fail_times: Arc::new(Mutex::new(0)),
                }),
                None,
                None,
            )
            .await
            .expect("spawn succeeds");

        assert_eq!(system.actor_by_name("worker"), Some(actor_id));
    }

    #[tokio::test]
    async fn broadcast_delivers_to_every_group_member() {
        let system = ActorSystem::new(SystemConfig::default());
        system.start();
        system.create_group("workers");

        let mut counters = Vec::new();
        for _ in 0..3 {
            let received = Arc::new(Mutex::new(0));
            let actor_id = system
                .spawn(
                    None,
                    None,
                    ActorKind::User,
                    Box::new(CountingBehavior {
                        received: received.clone(),
                        fail_times: Arc::new(Mutex::new(0)),
                    }),
                    None,
                    None,
                )
                .await
                .expect("spawn succeeds");
            system.add_to_group("workers", actor_id).expect("group exists");
            counters.push(received);
        }

        system
            .broadcast("workers", ActorId::nil(), Ping)
            .await
            .expect("group exists");

        for counter in &counters {
            wait_until(|| *counter.lock() == 1).await;
            assert_eq!(*counter.lock(), 1);
        }
        system.stop().await;
    }

    #[tokio::test]
    async fn unknown_receiver_surfaces_as_a_system_error() {
        let system = ActorSystem::new(SystemConfig::default());
        let result = system.send_message(ActorId::nil(), ActorId::new(), Ping).await;
        assert!(matches!(result, Err(SystemError::Dispatch(_))));
    }

    #[tokio::test]
    async fn a_failing_actor_is_restarted_within_the_retry_budget() {
        let system = ActorSystem::new(SystemConfig::default());
        system.start();
        let received = Arc::new(Mutex::new(0));

        let actor_id = system
            .spawn(
                None,
                None,
                ActorKind::User,
                Box::new(CountingBehavior {
                    received: received.clone(),
                    fail_times: Arc::new(Mutex::new(1)),
                }),
                None,
                None,
            )
            .await
            .expect("spawn succeeds");

        // The first delivery fails and triggers a restart; give the
        // restart time to land before sending the message that should
        // actually be counted.
        system
            .send_message(ActorId::nil(), actor_id, Ping)
            .await
            .expect("known receiver");
        tokio::time::sleep(Duration::from_millis(50)).await;

        system
            .send_message(ActorId::nil(), actor_id, Ping)
            .await
            .expect("known receiver");
        wait_until(|| *received.lock() == 1).await;
        assert_eq!(*received.lock(), 1);
        system.stop().await;
    }
}

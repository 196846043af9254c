//! # emberlang-rt - Lightweight Erlang-Actor Model Runtime
//!
//! An actor runtime for the Emberlang language runtime: typed mailboxes, a
//! dispatch pipeline with pluggable interceptors/transformers/routes, an
//! async worker-pool scheduler, a BEAM-inspired supervision tree, and an
//! I/O bridge that turns readiness events and filesystem changes into
//! actor messages.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use emberlang_rt::prelude::*;
//! use async_trait::async_trait;
//!
//! #[derive(Debug)]
//! struct Increment;
//! impl Message for Increment {
//!     const MESSAGE_TYPE: &'static str = "increment";
//! }
//!
//! struct Counter { count: u64 }
//!
//! #[async_trait]
//! impl Behavior for Counter {
//!     async fn receive(&mut self, _ctx: &mut ActorContext, envelope: &Envelope) -> Result<(), BehaviorError> {
//!         if envelope.downcast::<Increment>().is_some() {
//!             self.count += 1;
//!         }
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let system = ActorSystem::new(SystemConfig::default());
//!     system.start();
//!
//!     let actor = system
//!         .spawn(None, None, ActorKind::User, Box::new(Counter { count: 0 }), None, None)
//!         .await?;
//!     system.send_message(ActorId::nil(), actor, Increment).await?;
//!
//!     system.stop().await;
//!     Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! ## Core Actor System
//! - [`actor`] - Actor lifecycle, the `Behavior` trait, and `ActorContext`
//! - [`message`] - `Message` trait, type-erased `Envelope`, priority
//! - [`mailbox`] - Standard (FIFO) and priority mailboxes, overflow policies
//! - [`dispatcher`] - Interceptors, transformers, and route resolution
//! - [`scheduler`] - Worker pool draining the shared ready-queue
//!
//! ## Fault Tolerance
//! - [`supervisor`] - Supervision trees: OneForOne/OneForAll/RestForOne
//! - [`monitoring`] - Generic event tracking for observability
//!
//! ## Infrastructure
//! - [`system`] - `ActorSystem` facade, configuration, I/O bridge, snapshots
//! - [`util`] - `ActorAddress`, `ActorId`, `MessageId`, `SupervisorId`
//!
//! # Architecture Principles
//!
//! - **Monomorphic by default, `dyn` only at named seams**: `Behavior`,
//!   `Poller`, `FsWatcher`, `Interceptor`, `Transformer` are trait objects;
//!   everything else (mailboxes, the dispatcher, the scheduler) is
//!   monomorphic over concrete types.
//! - **3-layer imports**: std, then third-party, then internal modules.
//! - **`chrono::DateTime<Utc>`** for every timestamp.

pub mod actor;
pub mod dispatcher;
pub mod mailbox;
pub mod message;
pub mod monitoring;
pub mod prelude;
pub mod scheduler;
pub mod supervisor;
pub mod system;
pub mod util;

pub use actor::{
    Actor, ActorContext, ActorKind, ActorLifecycle, ActorState, Behavior, BehaviorError,
    ContextError, ErrorAction, RuntimeServices,
};
pub use dispatcher::{DispatchError, Dispatcher, DispatchRule, Interceptor, MailboxLookup, Transformer};
pub use mailbox::{AtomicMetrics, Mailbox, MailboxConfig, MailboxError, MailboxKind, MetricsRecorder, OverflowPolicy};
pub use message::{Envelope, Message, MessagePriority};
pub use monitoring::{
    ActorEvent, ActorEventKind, DispatcherEvent, DispatcherEventKind, EventSeverity,
    InMemoryMonitor, MailboxEvent, MailboxEventKind, Monitor, MonitoringConfig, MonitoringError,
    MonitoringEvent, MonitoringSnapshot, NoopMonitor, SupervisionEvent, SupervisionEventKind,
    SystemEvent, SystemEventKind,
};
pub use scheduler::{ScheduledActor, Scheduler, SchedulerConfig, SchedulerHost};
pub use supervisor::{
    RetryHistory, SupervisionDecision, SupervisorError, SupervisorNode, SupervisorStrategy,
    SupervisorTree, SupervisorType,
};
pub use system::{
    ActorSnapshot, ActorSystem, ConnId, FsEvent, FsOp, FsWatcher, IoError, IoEvent, IoEventKind,
    IoReadable, IoWritable, NoopFsWatcher, NoopPoller, Poller, RateLimiter, StatisticsCounters,
    SystemConfig, SystemConfigBuilder, SystemError, SystemSnapshot, SystemStatistics, Terminated,
    TraceEvent, TracingRing,
};
pub use util::{ActorAddress, ActorId, MessageId, SupervisorId};

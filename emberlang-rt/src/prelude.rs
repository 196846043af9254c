//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and traits for
//! building actors on top of this runtime:
//!
//! ```rust
//! use emberlang_rt::prelude::*;
//! ```
//!
//! # What's Included
//!
//! ## Core Actor System
//! - [`Behavior`] - What an actor does with the messages it receives
//! - [`ActorContext`] - Spawn/tell/watch/timers, the actor's handle onto the runtime
//! - [`ActorLifecycle`]/[`ActorState`] - Lifecycle tracking and its state machine
//! - [`ErrorAction`] - Per-message supervision decision (Stop, Resume, Restart, Escalate)
//!
//! ## Messaging
//! - [`Message`] - Core trait for typed payloads
//! - [`Envelope`] - Type-erased message carried through dispatch
//! - [`MessagePriority`] - Priority levels (Critical, High, Normal, Low)
//!
//! ## Mailbox
//! - [`Mailbox`] - Standard (FIFO) or priority-queue mailbox
//! - [`MailboxConfig`]/[`MailboxKind`]/[`OverflowPolicy`] - Mailbox configuration
//!
//! ## Dispatch
//! - [`Dispatcher`] - Intercept, transform, route, enqueue
//! - [`Interceptor`]/[`Transformer`] - Pipeline extension points
//!
//! ## Supervision
//! - [`SupervisorTree`]/[`SupervisorNode`] - The supervision tree and its nodes
//! - [`SupervisorStrategy`] - Restart, Stop, Resume, Escalate
//! - [`SupervisorType`] - OneForOne, OneForAll, RestForOne
//! - [`SupervisionDecision`] - What the tree decided and which actors it affects
//!
//! ## Monitoring
//! - [`Monitor`] - Core monitoring trait
//! - [`InMemoryMonitor`] - Atomic-counter monitor with bounded history
//! - [`NoopMonitor`] - Zero-overhead no-op monitor
//! - [`MonitoringEvent`] - Trait for events
//! - [`EventSeverity`] - Event severity levels
//! - [`ActorEvent`]/[`SupervisionEvent`]/[`MailboxEvent`]/[`DispatcherEvent`] - Event types
//!
//! ## System
//! - [`ActorSystem`] - The runtime facade: spawn, send, group, watch I/O
//! - [`SystemConfig`] - Actor system configuration
//!
//! ## Utilities
//! - [`ActorAddress`] - Actor address type
//! - [`ActorId`] - Actor identifier
//! - [`MessageId`] - Message identifier
//!
//! # Example
//!
//! ```rust,ignore
//! use emberlang_rt::prelude::*;
//! use async_trait::async_trait;
//!
//! #[derive(Debug, Clone)]
//! struct MyMessage { data: String }
//!
//! impl Message for MyMessage {
//!     const MESSAGE_TYPE: &'static str = "my_message";
//! }
//!
//! struct MyActor { count: u64 }
//!
//! #[async_trait]
//! impl Behavior for MyActor {
//!     async fn receive(&mut self, _ctx: &mut ActorContext, envelope: &Envelope) -> Result<(), BehaviorError> {
//!         if let Some(msg) = envelope.downcast::<MyMessage>() {
//!             self.count += 1;
//!             println!("Received: {}", msg.data);
//!         }
//!         Ok(())
//!     }
//! }
//! ```

// Core actor system
pub use crate::actor::{
    Actor, ActorContext, ActorKind, ActorLifecycle, ActorState, Behavior, BehaviorError,
    ContextError, ErrorAction, RuntimeServices,
};

// Messaging
pub use crate::message::{Envelope, Message, MessagePriority};

// Mailbox
pub use crate::mailbox::{Mailbox, MailboxConfig, MailboxError, MailboxKind, OverflowPolicy};

// Dispatch
pub use crate::dispatcher::{DispatchError, Dispatcher, DispatchRule, Interceptor, Transformer};

// Supervision
pub use crate::supervisor::{
    SupervisionDecision, SupervisorError, SupervisorNode, SupervisorStrategy, SupervisorTree,
    SupervisorType,
};

// Monitoring
pub use crate::monitoring::{
    ActorEvent, DispatcherEvent, EventSeverity, InMemoryMonitor, MailboxEvent, Monitor,
    MonitoringEvent, NoopMonitor, SupervisionEvent,
};

// System
pub use crate::system::{ActorSystem, SystemConfig};

// Utilities
pub use crate::util::{ActorAddress, ActorId, MessageId};

//! Actor core: identity, the lifecycle state machine, the `Behavior` trait
//! object boundary, and the context an actor uses to talk back to the
//! runtime.
//!
//! # Components
//!
//! - [`Actor`] - The spawned actor: mailbox, behavior, supervision links
//! - [`Behavior`] - What an actor does with messages (`Box<dyn Behavior>`)
//! - [`ActorContext`] - Spawn/tell/watch/timers, delegated to [`RuntimeServices`]
//! - [`ActorLifecycle`]/[`ActorState`] - State machine and restart tracking
//! - [`ErrorAction`] - Supervision decision (Stop, Resume, Restart, Escalate)
//!
//! # Actor Model Basics
//!
//! Actors are independent units of computation that:
//! - Maintain isolated state (no shared memory)
//! - Communicate via asynchronous message passing
//! - Process messages sequentially (one at a time)
//! - Follow a defined lifecycle (`pre_start` → `receive` → `post_stop`)
//!
//! # See Also
//!
//! - [`message`](crate::message) - The `Message`/`Envelope` types actors exchange
//! - [`supervisor`](crate::supervisor) - Supervisor trees for fault tolerance
//! - [`dispatcher`](crate::dispatcher) - Routing pipeline messages pass through first

pub mod actor;
pub mod context;
pub mod lifecycle;
pub mod traits;

pub use actor::Actor;
pub use context::{ActorContext, ContextError, RuntimeServices};
pub use lifecycle::{ActorKind, ActorLifecycle, ActorState};
pub use traits::{Behavior, BehaviorError, ErrorAction};

//! Supervision (C9): a tree of [`SupervisorNode`]s deciding restart, stop,
//! resume, or escalate on actor failure.
//!
//! # Components
//!
//! - [`SupervisorNode`] - strategy + type + retry budget for one set of siblings
//! - [`SupervisorTree`] - registry of nodes, walks the parent chain on escalation
//! - [`SupervisionDecision`] - what the tree decided and which actors it affects
//!
//! # Strategies
//!
//! - **Restart**: `PreRestart` → `Stopping` → `Starting` → `PostRestart`
//! - **Stop**: `PostStop` runs, actor is removed from the registry
//! - **Resume**: the error is ignored, the actor keeps running
//! - **Escalate**: the parent supervisor decides instead
//!
//! # Types
//!
//! - **OneForOne**: acts on the failed child only
//! - **OneForAll**: acts on every sibling, in registration order
//! - **RestForOne**: acts on the failed child and every child registered after it
//!
//! A decision only carries out the strategy while the retry budget holds:
//! once more than `maxRetries` failures land within `retryPeriod`, the node
//! forces `Stop` regardless of `strategy`.

pub mod backoff;
pub mod error;
pub mod node;
pub mod tree;
pub mod types;

pub use backoff::RetryHistory;
pub use error::SupervisorError;
pub use node::SupervisorNode;
pub use tree::SupervisorTree;
pub use types::{SupervisionDecision, SupervisorStrategy, SupervisorType};

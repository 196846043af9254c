//! Error types for supervisor operations.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use crate::util::{ActorId, SupervisorId};

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("supervisor {0} is not registered in the tree")]
    UnknownSupervisor(SupervisorId),

    #[error("actor {0} is not supervised by any node")]
    UnsupervisedActor(ActorId),

    #[error("invalid supervisor configuration: {reason}")]
    InvalidConfiguration { reason: String },
}

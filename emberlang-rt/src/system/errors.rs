//! Errors surfaced by [`super::ActorSystem`]'s public operations.

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use crate::actor::ContextError;
use crate::dispatcher::DispatchError;
use crate::supervisor::SupervisorError;
use crate::util::ActorId;

#[derive(Error, Debug)]
pub enum SystemError {
    #[error("Actor not found: {0}")]
    ActorNotFound(ActorId),

    #[error("Failed to spawn actor: {0}")]
    SpawnFailed(String),

    #[error("System shutdown in progress")]
    ShuttingDown,

    #[error("Actor mailbox full: {0}")]
    MailboxFull(ActorId),

    #[error("Unknown group: {0}")]
    UnknownGroup(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Actor limit exceeded: current {current}, max {max}")]
    ActorLimitExceeded { current: usize, max: usize },

    #[error("Shutdown timeout exceeded after {0:?}")]
    ShutdownTimeout(Duration),

    #[error("I/O bridge error: {0}")]
    Io(String),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Supervisor(#[from] SupervisorError),

    #[error(transparent)]
    Context(#[from] ContextError),
}

impl SystemError {
    /// Check if error is transient (can retry).
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SystemError::MailboxFull(_) | SystemError::Dispatch(DispatchError::Mailbox(_))
        )
    }

    /// Check if error is fatal (system must stop).
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SystemError::ShuttingDown | SystemError::ShutdownTimeout(_)
        )
    }

    /// Check if error is recoverable.
    pub fn is_recoverable(&self) -> bool {
        !self.is_fatal()
    }
}

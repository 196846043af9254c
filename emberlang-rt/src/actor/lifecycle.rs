//! Actor lifecycle management with state transitions.
//!
//! Provides actor state machine and lifecycle tracking for supervision.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
// (none)

/// Whether an actor is a user-spawned actor or a system-internal one
/// (timer workers, dispatcher helpers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActorKind {
    User,
    System,
}

/// Actor state in the lifecycle state machine.
///
/// # State Transitions
///
/// ```text
/// Created -> Starting -> Running <-> Suspended
///                           |
///                           v
///                       Restarting -> Running
///
/// any state -> Stopping -> Stopped (terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActorState {
    /// Registered with the system but `pre_start` has not run yet.
    Created,
    /// `pre_start` is in progress.
    Starting,
    /// Running and processing messages.
    Running,
    /// Paused by the I/O bridge's watermark back-pressure; resumes to `Running`.
    Suspended,
    /// Restart in progress (`pre_restart` → `post_restart`).
    Restarting,
    /// Shutting down (`post_stop` in progress).
    Stopping,
    /// Terminated. Terminal state.
    Stopped,
}

impl Default for ActorState {
    fn default() -> Self {
        Self::Created
    }
}

impl ActorState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Stopped)
    }
}

/// Actor lifecycle tracker with state management.
///
/// Tracks actor state transitions, restart count, and timing information
/// for supervision and monitoring.
#[derive(Debug, Clone)]
pub struct ActorLifecycle {
    state: ActorState,
    last_state_change: DateTime<Utc>,
    restart_count: u32,
}

impl ActorLifecycle {
    /// Create a new lifecycle tracker in `Created` state.
    pub fn new() -> Self {
        Self {
            state: ActorState::Created,
            last_state_change: Utc::now(),
            restart_count: 0,
        }
    }

    /// Transition to a new state, recording the transition timestamp.
    /// Entering `Restarting` increments [`Self::restart_count`].
    pub fn transition_to(&mut self, new_state: ActorState) {
        if new_state == ActorState::Restarting {
            self.restart_count += 1;
        }
        self.state = new_state;
        self.last_state_change = Utc::now();
    }

    pub fn state(&self) -> ActorState {
        self.state
    }

    pub fn last_state_change(&self) -> DateTime<Utc> {
        self.last_state_change
    }

    pub fn restart_count(&self) -> u32 {
        self.restart_count
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn is_running(&self) -> bool {
        self.state == ActorState::Running
    }
}

impl Default for ActorLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

//! The scheduler's view of an actor: its single-transition ready flag and
//! exclusive access to its state.

// Layer 1: Standard library imports
use std::sync::atomic::{AtomicBool, Ordering};

// Layer 2: Third-party crate imports
use tokio::sync::Mutex as AsyncMutex;

// Layer 3: Internal module imports
use crate::actor::Actor;

/// Wraps an [`Actor`] with the `scheduled` CAS flag that keeps it in the
/// ready-queue at most once at a time.
pub struct ScheduledActor {
    pub actor: AsyncMutex<Actor>,
    scheduled: AtomicBool,
}

impl ScheduledActor {
    pub fn new(actor: Actor) -> Self {
        Self {
            actor: AsyncMutex::new(actor),
            scheduled: AtomicBool::new(false),
        }
    }

    /// Attempt the `false -> true` transition. Returns `true` if this call
    /// won the race and should enqueue the actor id.
    pub fn try_mark_scheduled(&self) -> bool {
        self.scheduled
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn clear_scheduled(&self) {
        self.scheduled.store(false, Ordering::Release);
    }
}

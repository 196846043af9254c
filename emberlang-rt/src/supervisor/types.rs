//! Core supervision vocabulary: what a supervisor does on failure
//! (`strategy`) and which siblings that decision touches (`type`).

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
use crate::util::ActorId;

/// What a supervisor does when a child's failure survives the retry check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupervisorStrategy {
    Restart,
    Stop,
    Escalate,
    Resume,
}

/// Which siblings a strategy's decision applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupervisorType {
    /// Acts on the failed child only.
    OneForOne,
    /// Acts on every sibling under the same supervisor, in registration order.
    OneForAll,
    /// Acts on the failed child and every child registered after it.
    RestForOne,
}

/// The outcome of a supervisor deciding what to do about a child's failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupervisionDecision {
    /// Restart every listed actor, in order.
    Restart(Vec<ActorId>),
    /// Stop every listed actor, in order.
    Stop(Vec<ActorId>),
    /// Ignore the error; the actor keeps running.
    Resume,
    /// Forward the failure to the parent supervisor.
    Escalate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restart_decision_carries_affected_actors() {
        let a = ActorId::new();
        let b = ActorId::new();
        let decision = SupervisionDecision::Restart(vec![a, b]);
        assert_eq!(decision, SupervisionDecision::Restart(vec![a, b]));
    }
}

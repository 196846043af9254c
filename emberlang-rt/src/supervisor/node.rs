//! A single node in the supervision tree: a strategy, a type, a retry
//! budget, and the ordered list of children it watches.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use chrono::Utc;

// Layer 3: Internal module imports
use super::backoff::RetryHistory;
use super::types::{SupervisionDecision, SupervisorStrategy, SupervisorType};
use crate::util::ActorId;

/// `{strategy, type, maxRetries, retryPeriod, retryHistory, children}`.
/// `children` is ordered by registration, which is what [`SupervisorType::RestForOne`]
/// treats as its suffix boundary.
pub struct SupervisorNode {
    pub strategy: SupervisorStrategy,
    pub supervisor_type: SupervisorType,
    max_retries: u32,
    retry_history: RetryHistory,
    children: Vec<ActorId>,
}

impl SupervisorNode {
    pub fn new(
        strategy: SupervisorStrategy,
        supervisor_type: SupervisorType,
        max_retries: u32,
        retry_period: std::time::Duration,
    ) -> Self {
        Self {
            strategy,
            supervisor_type,
            max_retries,
            retry_history: RetryHistory::new(max_retries, retry_period),
            children: Vec::new(),
        }
    }

    pub fn children(&self) -> &[ActorId] {
        &self.children
    }

    /// Register a new child at the end of the ordered list.
    pub fn add_child(&mut self, actor: ActorId) {
        self.children.push(actor);
    }

    pub fn remove_child(&mut self, actor: ActorId) {
        self.children.retain(|&id| id != actor);
    }

    /// Decide what to do about `failed`'s error. Records the failure into
    /// the retry ring first; a budget overrun forces `Stop` on the affected
    /// set regardless of `strategy` (§4.8).
    pub fn decide(&mut self, failed: ActorId) -> SupervisionDecision {
        let exceeded = self.retry_history.record(Utc::now());
        let affected = self.affected_children(failed);

        if exceeded {
            return SupervisionDecision::Stop(affected);
        }

        match self.strategy {
            SupervisorStrategy::Restart => SupervisionDecision::Restart(affected),
            SupervisorStrategy::Stop => SupervisionDecision::Stop(affected),
            SupervisorStrategy::Resume => SupervisionDecision::Resume,
            SupervisorStrategy::Escalate => SupervisionDecision::Escalate,
        }
    }

    /// The siblings `supervisor_type` says a decision about `failed` applies to.
    fn affected_children(&self, failed: ActorId) -> Vec<ActorId> {
        match self.supervisor_type {
            SupervisorType::OneForOne => vec![failed],
            SupervisorType::OneForAll => self.children.clone(),
            SupervisorType::RestForOne => match self.children.iter().position(|&id| id == failed) {
                Some(index) => self.children[index..].to_vec(),
                None => vec![failed],
            },
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }
}

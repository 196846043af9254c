//! The supervision tree: a registry of [`SupervisorNode`]s plus the
//! actor→supervisor and supervisor→parent mappings that let a failure
//! escalate upward.

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
use dashmap::DashMap;

// Layer 3: Internal module imports
use super::error::SupervisorError;
use super::node::SupervisorNode;
use super::types::{SupervisionDecision, SupervisorStrategy, SupervisorType};
use crate::util::{ActorId, SupervisorId};

/// Owns every [`SupervisorNode`] in the system and resolves failures by
/// walking the parent chain on `Escalate`.
pub struct SupervisorTree {
    nodes: DashMap<SupervisorId, SupervisorNode>,
    parents: DashMap<SupervisorId, Option<SupervisorId>>,
    membership: DashMap<ActorId, SupervisorId>,
    root: SupervisorId,
}

impl SupervisorTree {
    /// Create the tree with a root supervisor and no children.
    pub fn new(
        strategy: SupervisorStrategy,
        supervisor_type: SupervisorType,
        max_retries: u32,
        retry_period: Duration,
    ) -> Self {
        let root = SupervisorId::new();
        let nodes = DashMap::new();
        nodes.insert(
            root,
            SupervisorNode::new(strategy, supervisor_type, max_retries, retry_period),
        );
        let parents = DashMap::new();
        parents.insert(root, None);
        Self {
            nodes,
            parents,
            membership: DashMap::new(),
            root,
        }
    }

    pub fn root(&self) -> SupervisorId {
        self.root
    }

    /// Register a new supervisor node as a child of `parent`.
    pub fn register_supervisor(
        &self,
        parent: SupervisorId,
        strategy: SupervisorStrategy,
        supervisor_type: SupervisorType,
        max_retries: u32,
        retry_period: Duration,
    ) -> Result<SupervisorId, SupervisorError> {
        if !self.nodes.contains_key(&parent) {
            return Err(SupervisorError::UnknownSupervisor(parent));
        }
        let id = SupervisorId::new();
        self.nodes.insert(
            id,
            SupervisorNode::new(strategy, supervisor_type, max_retries, retry_period),
        );
        self.parents.insert(id, Some(parent));
        Ok(id)
    }

    /// Register `actor` as a child of `supervisor`.
    pub fn register_child(
        &self,
        supervisor: SupervisorId,
        actor: ActorId,
    ) -> Result<(), SupervisorError> {
        let mut node = self
            .nodes
            .get_mut(&supervisor)
            .ok_or(SupervisorError::UnknownSupervisor(supervisor))?;
        node.add_child(actor);
        self.membership.insert(actor, supervisor);
        Ok(())
    }

    pub fn supervisor_of(&self, actor: ActorId) -> Option<SupervisorId> {
        self.membership.get(&actor).map(|entry| *entry.value())
    }

    /// Decide what to do about `actor`'s failure, escalating up the parent
    /// chain while the decision keeps coming back `Escalate`. A node with no
    /// parent that still escalates falls back to `Stop` of the actor alone.
    pub fn handle_failure(&self, actor: ActorId) -> Result<SupervisionDecision, SupervisorError> {
        let mut current = self
            .supervisor_of(actor)
            .ok_or(SupervisorError::UnsupervisedActor(actor))?;

        loop {
            let decision = {
                let mut node = self
                    .nodes
                    .get_mut(&current)
                    .ok_or(SupervisorError::UnknownSupervisor(current))?;
                node.decide(actor)
            };

            if decision != SupervisionDecision::Escalate {
                return Ok(decision);
            }

            match self.parents.get(&current).and_then(|parent| *parent) {
                Some(parent) => current = parent,
                None => return Ok(SupervisionDecision::Stop(vec![actor])),
            }
        }
    }
}

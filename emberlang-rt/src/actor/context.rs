//! The actor-facing handle onto the runtime: spawning children, sending
//! messages, watching peers, and scheduling single-shot timers.

// Layer 1: Standard library imports
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::task::JoinHandle;

// Layer 3: Internal module imports
use super::lifecycle::ActorKind;
use super::traits::Behavior;
use crate::mailbox::MailboxConfig;
use crate::message::Envelope;
use crate::util::{ActorAddress, ActorId, SupervisorId};

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("target actor {0} does not exist")]
    UnknownTarget(ActorId),
    #[error("system is shutting down")]
    ShuttingDown,
    #[error("failed to spawn child actor: {0}")]
    SpawnFailed(String),
}

/// The runtime services an [`ActorContext`] delegates to. Implemented by
/// `ActorSystem`; kept as a `dyn` boundary so `actor` has no upward
/// dependency on `system`.
#[async_trait]
pub trait RuntimeServices: Send + Sync {
    #[allow(clippy::too_many_arguments)]
    async fn spawn(
        &self,
        parent: ActorId,
        name: Option<String>,
        kind: ActorKind,
        behavior: Box<dyn Behavior>,
        mailbox_config: MailboxConfig,
        supervisor_id: Option<SupervisorId>,
    ) -> Result<ActorId, ContextError>;

    async fn tell(
        &self,
        sender: ActorId,
        target: ActorId,
        envelope: Envelope,
    ) -> Result<(), ContextError>;

    /// Record that `watcher` wants a `SystemTerminated` notification when
    /// `target` stops.
    fn watch(&self, watcher: ActorId, target: ActorId);
}

/// Per-actor handle used by a [`Behavior`] to talk back to the runtime.
/// Owned exclusively by the actor's own task, so its timer bookkeeping
/// needs no internal synchronization.
pub struct ActorContext {
    address: ActorAddress,
    id: ActorId,
    parent_id: Option<ActorId>,
    created_at: DateTime<Utc>,
    services: Arc<dyn RuntimeServices>,
    timers: HashMap<String, JoinHandle<()>>,
}

impl ActorContext {
    pub fn new(
        address: ActorAddress,
        parent_id: Option<ActorId>,
        services: Arc<dyn RuntimeServices>,
    ) -> Self {
        Self {
            id: address.id(),
            address,
            parent_id,
            created_at: Utc::now(),
            services,
            timers: HashMap::new(),
        }
    }

    pub fn address(&self) -> &ActorAddress {
        &self.address
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn parent_id(&self) -> Option<ActorId> {
        self.parent_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub async fn spawn(
        &self,
        name: Option<String>,
        kind: ActorKind,
        behavior: Box<dyn Behavior>,
        mailbox_config: MailboxConfig,
        supervisor_id: Option<SupervisorId>,
    ) -> Result<ActorId, ContextError> {
        self.services
            .spawn(self.id, name, kind, behavior, mailbox_config, supervisor_id)
            .await
    }

    pub async fn tell(&self, target: ActorId, envelope: Envelope) -> Result<(), ContextError> {
        self.services.tell(self.id, target, envelope).await
    }

    pub fn watch(&self, target: ActorId) {
        self.services.watch(self.id, target);
    }

    /// Deliver `envelope` to `target` after `duration`. Single-shot;
    /// scheduling again with the same `key` cancels the prior timer. The
    /// callback only ever reaches the actor through [`Self::tell`] — it
    /// never touches actor state directly.
    pub fn start_timer(
        &mut self,
        key: impl Into<String>,
        duration: Duration,
        target: ActorId,
        envelope: Envelope,
    ) {
        let key = key.into();
        self.stop_timer(&key);
        let services = Arc::clone(&self.services);
        let sender = self.id;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let _ = services.tell(sender, target, envelope).await;
        });
        self.timers.insert(key, handle);
    }

    pub fn stop_timer(&mut self, key: &str) {
        if let Some(handle) = self.timers.remove(key) {
            handle.abort();
        }
    }
}

impl Drop for ActorContext {
    fn drop(&mut self) {
        for (_, handle) in self.timers.drain() {
            handle.abort();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::message::Message;
    use parking_lot::Mutex;

    #[derive(Debug)]
    struct Ping;
    impl Message for Ping {
        const MESSAGE_TYPE: &'static str = "ping";
    }

    struct RecordingServices {
        told: Mutex<Vec<ActorId>>,
    }

    #[async_trait]
    impl RuntimeServices for RecordingServices {
        async fn spawn(
            &self,
            _parent: ActorId,
            _name: Option<String>,
            _kind: ActorKind,
            _behavior: Box<dyn Behavior>,
            _mailbox_config: MailboxConfig,
            _supervisor_id: Option<SupervisorId>,
        ) -> Result<ActorId, ContextError> {
            Ok(ActorId::new())
        }

        async fn tell(
            &self,
            _sender: ActorId,
            target: ActorId,
            _envelope: Envelope,
        ) -> Result<(), ContextError> {
            self.told.lock().push(target);
            Ok(())
        }

        fn watch(&self, _watcher: ActorId, _target: ActorId) {}
    }

    #[tokio::test]
    async fn timer_delivers_envelope_after_duration() {
        let services = Arc::new(RecordingServices {
            told: Mutex::new(Vec::new()),
        });
        let address = ActorAddress::anonymous();
        let mut ctx = ActorContext::new(address, None, services.clone());
        let target = ActorId::new();

        ctx.start_timer(
            "tick",
            Duration::from_millis(10),
            target,
            Envelope::new(ActorId::nil(), target, Ping),
        );

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(services.told.lock().as_slice(), [target]);
    }

    #[tokio::test]
    async fn reusing_a_timer_key_cancels_the_prior_timer() {
        let services = Arc::new(RecordingServices {
            told: Mutex::new(Vec::new()),
        });
        let address = ActorAddress::anonymous();
        let mut ctx = ActorContext::new(address, None, services.clone());
        let first_target = ActorId::new();
        let second_target = ActorId::new();

        ctx.start_timer(
            "tick",
            Duration::from_millis(200),
            first_target,
            Envelope::new(ActorId::nil(), first_target, Ping),
        );
        ctx.start_timer(
            "tick",
            Duration::from_millis(10),
            second_target,
            Envelope::new(ActorId::nil(), second_target, Ping),
        );

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(services.told.lock().as_slice(), [second_target]);
    }
}

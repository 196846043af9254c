//! The actor itself: identity, mailbox, the behavior it runs, and its
//! place in the supervision tree.

// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use super::context::ActorContext;
use super::lifecycle::{ActorKind, ActorLifecycle, ActorState};
use super::traits::{Behavior, BehaviorError, ErrorAction};
use crate::mailbox::Mailbox;
use crate::message::Envelope;
use crate::util::{ActorId, SupervisorId};

/// A spawned actor: the runtime-owned state the scheduler drives by calling
/// [`Actor::process_message`] once per scheduling turn.
pub struct Actor {
    pub id: ActorId,
    pub name: Option<String>,
    pub kind: ActorKind,
    lifecycle: ActorLifecycle,
    pub mailbox: Arc<Mailbox>,
    behavior: Box<dyn Behavior>,
    pub context: ActorContext,
    pub parent_id: Option<ActorId>,
    pub child_ids: Vec<ActorId>,
    pub supervisor_id: Option<SupervisorId>,
}

impl Actor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: ActorId,
        name: Option<String>,
        kind: ActorKind,
        mailbox: Arc<Mailbox>,
        behavior: Box<dyn Behavior>,
        context: ActorContext,
        parent_id: Option<ActorId>,
        supervisor_id: Option<SupervisorId>,
    ) -> Self {
        Self {
            id,
            name,
            kind,
            lifecycle: ActorLifecycle::new(),
            mailbox,
            behavior,
            context,
            parent_id,
            child_ids: Vec::new(),
            supervisor_id,
        }
    }

    pub fn state(&self) -> ActorState {
        self.lifecycle.state()
    }

    pub fn restart_count(&self) -> u32 {
        self.lifecycle.restart_count()
    }

    /// `Created`/`Restarting` → `Starting` → `Running`, running `PreStart`.
    pub async fn start(&mut self) -> Result<(), BehaviorError> {
        self.lifecycle.transition_to(ActorState::Starting);
        self.behavior.pre_start(&mut self.context).await?;
        self.lifecycle.transition_to(ActorState::Running);
        Ok(())
    }

    /// Process one message. A non-`Running` state (e.g. freshly resumed
    /// from `Suspended`) is folded back to `Running` first, mirroring the
    /// teacher's idempotent state guard. On error, the behavior's
    /// [`ErrorAction`] is returned for the supervisor to carry out, along
    /// with the offending envelope so a subsequent restart can hand it to
    /// `PreRestart`.
    pub async fn process_message(
        &mut self,
        envelope: Envelope,
    ) -> Result<(), (ErrorAction, BehaviorError, Envelope)> {
        if self.lifecycle.state() != ActorState::Running {
            self.lifecycle.transition_to(ActorState::Running);
        }
        match self.behavior.receive(&mut self.context, &envelope).await {
            Ok(()) => Ok(()),
            Err(error) => {
                let action = self.behavior.on_error(&error);
                Err((action, error, envelope))
            }
        }
    }

    pub fn suspend(&mut self) {
        self.lifecycle.transition_to(ActorState::Suspended);
    }

    pub fn resume(&mut self) {
        self.lifecycle.transition_to(ActorState::Running);
    }

    /// `Running` → `Restarting` → `Running`, running `PreRestart` then
    /// `PostRestart`. `envelope` is the message that caused the failure,
    /// when this actor is the one that raised it.
    pub async fn restart(&mut self, cause: &BehaviorError, envelope: Option<&Envelope>) -> Result<(), BehaviorError> {
        self.lifecycle.transition_to(ActorState::Restarting);
        self.behavior.pre_restart(&mut self.context, cause, envelope).await?;
        self.behavior.post_restart(&mut self.context).await?;
        self.lifecycle.transition_to(ActorState::Running);
        Ok(())
    }

    /// Any state → `Stopping` → `Stopped` (terminal), running `PostStop`.
    pub async fn stop(&mut self) -> Result<(), BehaviorError> {
        self.lifecycle.transition_to(ActorState::Stopping);
        let result = self.behavior.post_stop(&mut self.context).await;
        self.lifecycle.transition_to(ActorState::Stopped);
        self.mailbox.close();
        result
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::actor::context::RuntimeServices;
    use crate::mailbox::MailboxConfig;
    use crate::message::Message;
    use crate::util::ActorAddress;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::fmt;

    #[derive(Debug, PartialEq)]
    struct Ping;
    impl Message for Ping {
        const MESSAGE_TYPE: &'static str = "ping";
    }

    #[derive(Debug)]
    struct BoomError;
    impl fmt::Display for BoomError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "boom")
        }
    }
    impl std::error::Error for BoomError {}

    struct NoopServices;

    #[async_trait]
    impl RuntimeServices for NoopServices {
        async fn spawn(
            &self,
            _parent: ActorId,
            _name: Option<String>,
            _kind: ActorKind,
            _behavior: Box<dyn Behavior>,
            _mailbox_config: MailboxConfig,
            _supervisor_id: Option<SupervisorId>,
        ) -> Result<ActorId, crate::actor::context::ContextError> {
            Ok(ActorId::new())
        }

        async fn tell(
            &self,
            _sender: ActorId,
            _target: ActorId,
            _envelope: Envelope,
        ) -> Result<(), crate::actor::context::ContextError> {
            Ok(())
        }

        fn watch(&self, _watcher: ActorId, _target: ActorId) {}
    }

    struct CountingBehavior {
        received: Arc<Mutex<u32>>,
        fail_next: bool,
    }

    #[async_trait]
    impl Behavior for CountingBehavior {
        async fn receive(
            &mut self,
            _ctx: &mut ActorContext,
            _envelope: &Envelope,
        ) -> Result<(), BehaviorError> {
            if self.fail_next {
                return Err(Box::new(BoomError));
            }
            *self.received.lock() += 1;
            Ok(())
        }

        fn on_error(&mut self, _error: &BehaviorError) -> ErrorAction {
            ErrorAction::Restart
        }
    }

    fn new_actor(behavior: impl Behavior) -> Actor {
        let address = ActorAddress::anonymous();
        let id = address.id();
        let context = ActorContext::new(address, None, Arc::new(NoopServices));
        let mailbox = Arc::new(Mailbox::new(MailboxConfig::default()));
        Actor::new(id, None, ActorKind::User, mailbox, Box::new(behavior), context, None, None)
    }

    #[tokio::test]
    async fn start_transitions_created_to_running() {
        let mut actor = new_actor(CountingBehavior {
            received: Arc::new(Mutex::new(0)),
            fail_next: false,
        });
        assert_eq!(actor.state(), ActorState::Created);
        actor.start().await.expect("pre_start succeeds");
        assert_eq!(actor.state(), ActorState::Running);
    }

    #[tokio::test]
    async fn process_message_invokes_behavior() {
        let received = Arc::new(Mutex::new(0));
        let mut actor = new_actor(CountingBehavior {
            received: received.clone(),
            fail_next: false,
        });
        actor.start().await.expect("pre_start succeeds");
        let receiver = actor.id;
        actor
            .process_message(Envelope::new(ActorId::nil(), receiver, Ping))
            .await
            .expect("handler succeeds");
        assert_eq!(*received.lock(), 1);
    }

    #[tokio::test]
    async fn failing_behavior_yields_its_error_action() {
        let mut actor = new_actor(CountingBehavior {
            received: Arc::new(Mutex::new(0)),
            fail_next: true,
        });
        actor.start().await.expect("pre_start succeeds");
        let receiver = actor.id;
        let (action, _error, envelope) = actor
            .process_message(Envelope::new(ActorId::nil(), receiver, Ping))
            .await
            .expect_err("behavior fails");
        assert_eq!(action, ErrorAction::Restart);
        assert_eq!(envelope.downcast::<Ping>(), Some(&Ping));
    }

    #[tokio::test]
    async fn restart_cycles_through_restarting_back_to_running() {
        let mut actor = new_actor(CountingBehavior {
            received: Arc::new(Mutex::new(0)),
            fail_next: false,
        });
        actor.start().await.expect("pre_start succeeds");
        let cause: BehaviorError = Box::new(BoomError);
        actor.restart(&cause, None).await.expect("restart succeeds");
        assert_eq!(actor.state(), ActorState::Running);
        assert_eq!(actor.restart_count(), 1);
    }

    #[tokio::test]
    async fn stop_transitions_to_stopped_and_closes_the_mailbox() {
        let mut actor = new_actor(CountingBehavior {
            received: Arc::new(Mutex::new(0)),
            fail_next: false,
        });
        actor.start().await.expect("pre_start succeeds");
        actor.stop().await.expect("post_stop succeeds");
        assert_eq!(actor.state(), ActorState::Stopped);
        assert!(actor.mailbox.is_closed());
    }
}

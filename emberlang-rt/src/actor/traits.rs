//! The `Behavior` trait: the dynamic-dispatch boundary for actor message
//! handling.
//!
//! Actors are spawned with a behavior chosen at runtime — from config, from
//! a supervisor's restart factory, from a group — so `Behavior` is used as
//! `Box<dyn Behavior>` rather than a generic parameter, unlike most of this
//! crate's otherwise-monomorphic surface.

// Layer 1: Standard library imports
use std::error::Error as StdError;

// Layer 2: Third-party crate imports
use async_trait::async_trait;

// Layer 3: Internal module imports
use super::context::ActorContext;
use crate::message::Envelope;

/// Boxed error type a [`Behavior`] returns; kept opaque so behaviors can
/// surface whatever error type fits their domain.
pub type BehaviorError = Box<dyn StdError + Send + Sync>;

/// What an actor does with the messages it receives, plus the lifecycle
/// hooks the system invokes around that — never called by user code
/// directly.
#[async_trait]
pub trait Behavior: Send + 'static {
    /// Handle one message. Returning an error raises a supervised failure:
    /// the actor's [`Behavior::on_error`] decides the [`ErrorAction`], and
    /// the supervisor carries it out. Borrowed rather than owned so a
    /// failed envelope survives the call and can still reach
    /// [`Behavior::pre_restart`].
    async fn receive(
        &mut self,
        ctx: &mut ActorContext,
        envelope: &Envelope,
    ) -> Result<(), BehaviorError>;

    /// Runs once before the actor's first message and again after every
    /// restart recovers into `Running`.
    async fn pre_start(&mut self, _ctx: &mut ActorContext) -> Result<(), BehaviorError> {
        Ok(())
    }

    /// Runs when the actor is stopping, successfully or not.
    async fn post_stop(&mut self, _ctx: &mut ActorContext) -> Result<(), BehaviorError> {
        Ok(())
    }

    /// Runs before a supervised restart, with the error that triggered it
    /// and the offending envelope, if this actor is the one that raised
    /// the error (siblings restarted alongside it under `OneForAll`/
    /// `RestForOne` get `None`). The message is handed over exactly once,
    /// here, and discarded afterward.
    async fn pre_restart(
        &mut self,
        _ctx: &mut ActorContext,
        _cause: &BehaviorError,
        _envelope: Option<&Envelope>,
    ) -> Result<(), BehaviorError> {
        Ok(())
    }

    /// Runs after a supervised restart, before the actor resumes `Running`.
    async fn post_restart(&mut self, _ctx: &mut ActorContext) -> Result<(), BehaviorError> {
        Ok(())
    }

    /// Decide what the supervisor should do about an error `receive` raised.
    /// Defaults to the conservative [`ErrorAction::Stop`].
    fn on_error(&mut self, _error: &BehaviorError) -> ErrorAction {
        ErrorAction::default()
    }
}

/// Supervision decision for an error raised from [`Behavior::receive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorAction {
    /// Stop the actor permanently; `post_stop` runs, then it terminates.
    Stop,
    /// Ignore the error and keep processing messages.
    Resume,
    /// Restart the actor: `pre_restart`, then `post_restart`, then resume.
    Restart,
    /// Hand the decision to the parent supervisor.
    Escalate,
}

impl Default for ErrorAction {
    fn default() -> Self {
        Self::Stop
    }
}

//! S5/S6: supervisor retry budgets and the RestForOne suffix rule,
//! exercised through a running `ActorSystem`.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use emberlang_rt::{
    ActorContext, ActorId, ActorKind, Behavior, BehaviorError, Envelope, ErrorAction, Message,
    SupervisorStrategy, SupervisorType, SystemConfig,
};
use parking_lot::Mutex;

#[derive(Debug)]
struct Ping;
impl Message for Ping {
    const MESSAGE_TYPE: &'static str = "ping";
}

#[derive(Debug)]
struct BoomError;
impl std::fmt::Display for BoomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "boom")
    }
}
impl std::error::Error for BoomError {}

struct AlwaysFails;

#[async_trait]
impl Behavior for AlwaysFails {
    async fn receive(&mut self, _ctx: &mut ActorContext, _envelope: &Envelope) -> Result<(), BehaviorError> {
        Err(Box::new(BoomError))
    }

    fn on_error(&mut self, _error: &BehaviorError) -> ErrorAction {
        ErrorAction::Restart
    }
}

#[derive(Clone, Default)]
struct Hooks {
    pre_restart: Arc<Mutex<u32>>,
    post_restart: Arc<Mutex<u32>>,
    pre_restart_saw_envelope: Arc<Mutex<Option<bool>>>,
}

struct Tracked {
    fails: bool,
    hooks: Hooks,
}

#[async_trait]
impl Behavior for Tracked {
    async fn receive(&mut self, _ctx: &mut ActorContext, _envelope: &Envelope) -> Result<(), BehaviorError> {
        if self.fails {
            return Err(Box::new(BoomError));
        }
        Ok(())
    }

    async fn pre_restart(
        &mut self,
        _ctx: &mut ActorContext,
        _cause: &BehaviorError,
        envelope: Option<&Envelope>,
    ) -> Result<(), BehaviorError> {
        *self.hooks.pre_restart.lock() += 1;
        *self.hooks.pre_restart_saw_envelope.lock() = Some(envelope.is_some());
        Ok(())
    }

    async fn post_restart(&mut self, _ctx: &mut ActorContext) -> Result<(), BehaviorError> {
        *self.hooks.post_restart.lock() += 1;
        Ok(())
    }

    fn on_error(&mut self, _error: &BehaviorError) -> ErrorAction {
        ErrorAction::Restart
    }
}

async fn wait_until(mut predicate: impl FnMut() -> bool) {
    for _ in 0..200 {
        if predicate() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn s5_supervisor_stops_the_actor_once_retries_are_exhausted() {
    let config = SystemConfig::builder()
        .root_supervisor(
            SupervisorStrategy::Restart,
            SupervisorType::OneForOne,
            2,
            Duration::from_millis(200),
        )
        .build()
        .expect("valid configuration");
    let system = emberlang_rt::ActorSystem::new(config);
    system.start();

    let actor_id = system
        .spawn(None, None, ActorKind::User, Box::new(AlwaysFails), None, None)
        .await
        .expect("spawn succeeds");

    for _ in 0..3 {
        system
            .send_message(ActorId::nil(), actor_id, Ping)
            .await
            .expect("known receiver");
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    let mut removed = false;
    for _ in 0..20 {
        if system.actor_snapshot(actor_id).await.is_none() {
            removed = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert!(removed, "actor should have been removed from the registry once stopped");
    assert_eq!(system.system_snapshot().await.statistics.restarts, 2);

    system.stop().await;
}

#[tokio::test]
async fn s6_rest_for_one_restarts_the_failed_child_and_its_suffix_only() {
    let config = SystemConfig::builder()
        .root_supervisor(
            SupervisorStrategy::Restart,
            SupervisorType::RestForOne,
            10,
            Duration::from_secs(60),
        )
        .build()
        .expect("valid configuration");
    let system = emberlang_rt::ActorSystem::new(config);
    system.start();

    let a_hooks = Hooks::default();
    let b_hooks = Hooks::default();
    let c_hooks = Hooks::default();

    let _a = system
        .spawn(
            None,
            None,
            ActorKind::User,
            Box::new(Tracked { fails: false, hooks: a_hooks.clone() }),
            None,
            None,
        )
        .await
        .expect("spawn a");
    let b = system
        .spawn(
            None,
            None,
            ActorKind::User,
            Box::new(Tracked { fails: true, hooks: b_hooks.clone() }),
            None,
            None,
        )
        .await
        .expect("spawn b");
    let _c = system
        .spawn(
            None,
            None,
            ActorKind::User,
            Box::new(Tracked { fails: false, hooks: c_hooks.clone() }),
            None,
            None,
        )
        .await
        .expect("spawn c");

    system
        .send_message(ActorId::nil(), b, Ping)
        .await
        .expect("known receiver");

    wait_until(|| *c_hooks.post_restart.lock() >= 1).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(*a_hooks.pre_restart.lock(), 0, "a is not in b's RestForOne suffix");
    assert!(*b_hooks.pre_restart.lock() >= 1 && *b_hooks.post_restart.lock() >= 1);
    assert!(*c_hooks.pre_restart.lock() >= 1 && *c_hooks.post_restart.lock() >= 1);
    assert_eq!(
        *b_hooks.pre_restart_saw_envelope.lock(),
        Some(true),
        "b raised the failure, so its PreRestart should receive the offending message"
    );
    assert_eq!(
        *c_hooks.pre_restart_saw_envelope.lock(),
        Some(false),
        "c is only restarted as a RestForOne side effect, so it never receives b's message"
    );

    system.stop().await;
}

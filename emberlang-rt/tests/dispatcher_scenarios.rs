//! S7/S8: group broadcast and dispatcher route overrides, exercised
//! through a running `ActorSystem`.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use emberlang_rt::{
    ActorContext, ActorId, ActorKind, ActorSystem, Behavior, BehaviorError, DispatchRule, Envelope,
    Message, MessagePriority, SystemConfig,
};
use parking_lot::Mutex;

#[derive(Debug, Clone)]
struct Broadcast(u8);
impl Message for Broadcast {
    const MESSAGE_TYPE: &'static str = "s7_broadcast";
}

#[derive(Debug)]
struct Routed;
impl Message for Routed {
    const MESSAGE_TYPE: &'static str = "s8_routed";
}

#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<u32>>);

impl Recorder {
    fn count(&self) -> u32 {
        *self.0.lock()
    }
}

struct Recording(Recorder);

#[async_trait]
impl Behavior for Recording {
    async fn receive(&mut self, _ctx: &mut ActorContext, _envelope: &Envelope) -> Result<(), BehaviorError> {
        *self.0 .0.lock() += 1;
        Ok(())
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
async fn s7_broadcast_reaches_every_group_member() {
    let system = ActorSystem::new(SystemConfig::default());
    system.start();

    let g1_hits = Recorder::default();
    let g2_hits = Recorder::default();

    let g1 = system
        .spawn(None, None, ActorKind::User, Box::new(Recording(g1_hits.clone())), None, None)
        .await
        .expect("spawn g1");
    let g2 = system
        .spawn(None, None, ActorKind::User, Box::new(Recording(g2_hits.clone())), None, None)
        .await
        .expect("spawn g2");

    system.create_group("s7");
    system.add_to_group("s7", g1).expect("known group");
    system.add_to_group("s7", g2).expect("known group");

    system.broadcast("s7", ActorId::nil(), Broadcast(1)).await.expect("known group");

    wait_until(|| g1_hits.count() >= 1 && g2_hits.count() >= 1).await;

    assert_eq!(g1_hits.count(), 1);
    assert_eq!(g2_hits.count(), 1);

    system.stop().await;
}

#[tokio::test]
async fn s8_route_override_redirects_regardless_of_envelope_receiver() {
    let system = ActorSystem::new(SystemConfig::default());
    system.start();

    let a1_hits = Recorder::default();
    let a2_hits = Recorder::default();

    let a1 = system
        .spawn(None, None, ActorKind::User, Box::new(Recording(a1_hits.clone())), None, None)
        .await
        .expect("spawn a1");
    let a2 = system
        .spawn(None, None, ActorKind::User, Box::new(Recording(a2_hits.clone())), None, None)
        .await
        .expect("spawn a2");

    system.add_route(Routed::MESSAGE_TYPE, DispatchRule::new(a2, MessagePriority::Normal));

    // Addressed to a1, but the route table should redirect it to a2.
    system.send_message(a1, a1, Routed).await.expect("known receiver");

    wait_until(|| a2_hits.count() >= 1).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(a2_hits.count(), 1, "route override should redirect to a2");
    assert_eq!(a1_hits.count(), 0, "a1 should never receive the rerouted message");

    system.remove_route(Routed::MESSAGE_TYPE);
    system.stop().await;
}

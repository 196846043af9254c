//! S3/S4: mailbox ordering and back-pressure, exercised directly against
//! the public `Mailbox` API rather than through a running system.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use emberlang_rt::{
    ActorId, Envelope, Mailbox, MailboxConfig, MailboxError, MailboxKind, Message, MessagePriority,
    OverflowPolicy,
};

#[derive(Debug, Clone, Copy)]
struct Tagged(u8);

impl Message for Tagged {
    const MESSAGE_TYPE: &'static str = "tagged";

    fn priority(&self) -> MessagePriority {
        match self.0 {
            0 => MessagePriority::Low,
            1 => MessagePriority::Normal,
            2 => MessagePriority::High,
            _ => MessagePriority::Critical,
        }
    }
}

#[tokio::test]
async fn s3_priority_mailbox_dequeues_non_increasing() {
    let mailbox = Mailbox::new(MailboxConfig {
        kind: MailboxKind::Priority,
        capacity: 16,
        ..MailboxConfig::default()
    });
    let receiver = ActorId::new();

    for tag in [1u8, 2, 0, 2, 1] {
        mailbox
            .enqueue(Envelope::new(ActorId::nil(), receiver, Tagged(tag)))
            .await
            .expect("capacity available");
    }

    let mut order = Vec::new();
    for _ in 0..5 {
        let envelope = mailbox.dequeue().await.expect("five were enqueued");
        order.push(envelope.downcast::<Tagged>().expect("tagged payload").0);
    }

    assert_eq!(order, vec![2, 2, 1, 1, 0]);
}

#[tokio::test]
async fn s4_back_pressure_times_out_once_capacity_is_exhausted() {
    let mailbox = Mailbox::new(MailboxConfig {
        kind: MailboxKind::Standard,
        capacity: 2,
        overflow_policy: OverflowPolicy::BackPressure,
        backpressure_wait: Duration::from_millis(50),
    });
    let receiver = ActorId::new();

    mailbox
        .enqueue(Envelope::new(ActorId::nil(), receiver, Tagged(1)))
        .await
        .expect("first fits");
    mailbox
        .enqueue(Envelope::new(ActorId::nil(), receiver, Tagged(1)))
        .await
        .expect("second fits");

    let started = std::time::Instant::now();
    let result = mailbox
        .enqueue(Envelope::new(ActorId::nil(), receiver, Tagged(1)))
        .await;
    let elapsed = started.elapsed();

    assert!(matches!(result, Err(MailboxError::Timeout(_))));
    assert!(elapsed >= Duration::from_millis(50));
}

//! Mailbox system for actor message queuing.
//!
//! Every actor owns one [`Mailbox`], a FIFO [`StandardMailbox`] over the
//! shared lock-free MPMC ring (C11) or a [`PriorityMailbox`] heap, chosen
//! per actor via [`MailboxConfig::kind`]. Both backends share an
//! [`OverflowPolicy`] (reject, drop, drop-oldest, or back-pressure with a
//! bounded wait) and report through the same [`MetricsRecorder`].
pub mod metrics;
pub mod priority;
pub mod standard;
pub mod traits;

use std::sync::Arc;

use crate::message::Envelope;

pub use metrics::{AtomicMetrics, MetricsRecorder};
pub use priority::PriorityMailbox;
pub use standard::StandardMailbox;
pub use traits::{MailboxConfig, MailboxError, MailboxKind, OverflowPolicy};

/// A mailbox, backed by whichever queuing discipline [`MailboxConfig::kind`] selects.
pub enum Mailbox {
    Standard(StandardMailbox),
    Priority(PriorityMailbox),
}

impl Mailbox {
    pub fn new(config: MailboxConfig) -> Self {
        match config.kind {
            MailboxKind::Standard => Self::Standard(StandardMailbox::new(config)),
            MailboxKind::Priority => Self::Priority(PriorityMailbox::new(config)),
        }
    }

    pub async fn enqueue(&self, envelope: Envelope) -> Result<(), MailboxError> {
        match self {
            Self::Standard(mailbox) => mailbox.enqueue(envelope).await,
            Self::Priority(mailbox) => mailbox.enqueue(envelope).await,
        }
    }

    pub async fn dequeue(&self) -> Option<Envelope> {
        match self {
            Self::Standard(mailbox) => mailbox.dequeue().await,
            Self::Priority(mailbox) => mailbox.dequeue().await,
        }
    }

    pub fn try_dequeue(&self) -> Option<Envelope> {
        match self {
            Self::Standard(mailbox) => mailbox.try_dequeue(),
            Self::Priority(mailbox) => mailbox.try_dequeue(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Standard(mailbox) => mailbox.len(),
            Self::Priority(mailbox) => mailbox.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        match self {
            Self::Standard(mailbox) => mailbox.capacity(),
            Self::Priority(mailbox) => mailbox.capacity(),
        }
    }

    pub fn close(&self) {
        match self {
            Self::Standard(mailbox) => mailbox.close(),
            Self::Priority(mailbox) => mailbox.close(),
        }
    }

    pub fn is_closed(&self) -> bool {
        match self {
            Self::Standard(mailbox) => mailbox.is_closed(),
            Self::Priority(mailbox) => mailbox.is_closed(),
        }
    }

    pub fn metrics(&self) -> &Arc<AtomicMetrics> {
        match self {
            Self::Standard(mailbox) => mailbox.metrics(),
            Self::Priority(mailbox) => mailbox.metrics(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::message::Message;
    use crate::util::ActorId;

    #[derive(Debug)]
    struct Ping;
    impl Message for Ping {
        const MESSAGE_TYPE: &'static str = "ping";
    }

    #[tokio::test]
    async fn standard_kind_round_trips_a_message() {
        let mailbox = Mailbox::new(MailboxConfig {
            kind: MailboxKind::Standard,
            ..MailboxConfig::default()
        });
        mailbox
            .enqueue(Envelope::new(ActorId::nil(), ActorId::new(), Ping))
            .await
            .expect("capacity available");
        assert!(mailbox.dequeue().await.is_some());
    }

    #[tokio::test]
    async fn priority_kind_round_trips_a_message() {
        let mailbox = Mailbox::new(MailboxConfig {
            kind: MailboxKind::Priority,
            ..MailboxConfig::default()
        });
        mailbox
            .enqueue(Envelope::new(ActorId::nil(), ActorId::new(), Ping))
            .await
            .expect("capacity available");
        assert!(mailbox.dequeue().await.is_some());
    }
}

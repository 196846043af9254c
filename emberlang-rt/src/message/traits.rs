// Layer 1: Standard library imports
use std::any::Any;
use std::fmt::Debug;

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
// (none)

/// Core message trait.
///
/// `MESSAGE_TYPE` identifies the payload's wire type for dispatcher routing
/// rules and monitoring events; `Any` lets [`super::Envelope`] carry the
/// payload type-erased through the mailbox/dispatcher/scheduler pipeline and
/// recover it at the receiver via [`super::Envelope::downcast`].
pub trait Message: Any + Send + Debug + 'static {
    /// Unique message type identifier.
    const MESSAGE_TYPE: &'static str;

    /// Routing priority for this message (default: Normal).
    fn priority(&self) -> MessagePriority {
        MessagePriority::Normal
    }
}

/// Message priority levels for mailbox ordering.
///
/// `Critical > High > Normal > Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MessagePriority {
    Low = 0,
    Normal = 1,
    High = 2,
    Critical = 3,
}

impl Default for MessagePriority {
    fn default() -> Self {
        Self::Normal
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct TestMessage {
        #[allow(dead_code)]
        content: String,
    }

    impl Message for TestMessage {
        const MESSAGE_TYPE: &'static str = "test_message";
    }

    #[test]
    fn priority_ordering_is_total() {
        assert!(MessagePriority::Critical > MessagePriority::High);
        assert!(MessagePriority::High > MessagePriority::Normal);
        assert!(MessagePriority::Normal > MessagePriority::Low);
    }

    #[test]
    fn default_priority_is_normal() {
        let msg = TestMessage {
            content: "x".into(),
        };
        assert_eq!(msg.priority(), MessagePriority::Normal);
        assert_eq!(MessagePriority::default(), MessagePriority::Normal);
    }
}

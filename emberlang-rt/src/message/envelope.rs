// Layer 1: Standard library imports
use std::any::Any;
use std::collections::HashMap;

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc}; // §3.2
use serde_json::Value;

// Layer 3: Internal module imports
use super::traits::{Message, MessagePriority};
use crate::util::{ActorId, MessageId};

/// A message in flight, with its payload type-erased behind `dyn Any` so
/// the dispatcher, mailbox, and scheduler can move it without being
/// generic over every message type an actor might define. Typed code
/// recovers the payload via [`Envelope::downcast`]/[`Envelope::into_payload`].
pub struct Envelope {
    pub id: MessageId,
    pub sender: ActorId,
    pub receiver: ActorId,
    pub message_type: &'static str,
    pub priority: MessagePriority,
    pub payload: Box<dyn Any + Send>,
    /// Transformer-extensible metadata; structured rather than `HashMap<String, String>`
    /// so a `Transformer` can attach arbitrary JSON.
    pub headers: HashMap<String, Value>,
    pub created_at: DateTime<Utc>,
}

impl Envelope {
    pub fn new<M: Message>(sender: ActorId, receiver: ActorId, payload: M) -> Self {
        let priority = payload.priority();
        Self {
            id: MessageId::new(),
            sender,
            receiver,
            message_type: M::MESSAGE_TYPE,
            priority,
            payload: Box::new(payload),
            headers: HashMap::new(),
            created_at: Utc::now(),
        }
    }

    /// Borrow the payload as a concrete `M`, if it still holds one.
    pub fn downcast<M: Message>(&self) -> Option<&M> {
        self.payload.downcast_ref::<M>()
    }

    /// Consume the envelope and recover the concrete payload, if it matches.
    pub fn into_payload<M: Message>(self) -> Result<Box<M>, Box<dyn Any + Send>> {
        self.payload.downcast::<M>()
    }

    pub fn with_header(mut self, key: impl Into<String>, value: Value) -> Self {
        self.headers.insert(key.into(), value);
        self
    }
}

impl std::fmt::Debug for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Envelope")
            .field("id", &self.id)
            .field("sender", &self.sender)
            .field("receiver", &self.receiver)
            .field("message_type", &self.message_type)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Ping(u32);

    impl Message for Ping {
        const MESSAGE_TYPE: &'static str = "ping";
    }

    #[test]
    fn downcast_recovers_original_payload() {
        let env = Envelope::new(ActorId::nil(), ActorId::new(), Ping(7));
        assert_eq!(env.downcast::<Ping>(), Some(&Ping(7)));
        assert_eq!(env.message_type, "ping");
    }

    #[test]
    fn downcast_to_wrong_type_is_none() {
        #[derive(Debug)]
        struct Other;
        impl Message for Other {
            const MESSAGE_TYPE: &'static str = "other";
        }
        let env = Envelope::new(ActorId::nil(), ActorId::new(), Ping(1));
        assert!(env.downcast::<Other>().is_none());
    }

    #[test]
    fn into_payload_consumes_envelope() {
        let env = Envelope::new(ActorId::nil(), ActorId::new(), Ping(42));
        let payload = env.into_payload::<Ping>().expect("matching type");
        assert_eq!(*payload, Ping(42));
    }

    #[test]
    fn headers_roundtrip_through_builder() {
        let env = Envelope::new(ActorId::nil(), ActorId::new(), Ping(0))
            .with_header("trace_id", Value::String("abc".into()));
        assert_eq!(env.headers.get("trace_id"), Some(&Value::String("abc".into())));
    }
}

//! The dispatch pipeline: intercept, transform, resolve a route, enqueue.

// Layer 1: Standard library imports
use std::collections::HashMap;
use std::sync::Arc;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use parking_lot::RwLock;
use thiserror::Error;

// Layer 3: Internal module imports
use super::rules::DispatchRule;
use super::traits::{Interceptor, Transformer};
use crate::mailbox::{Mailbox, MailboxError};
use crate::message::Envelope;
use crate::util::ActorId;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("interceptor rejected the message: {0}")]
    Intercepted(String),
    #[error("no mailbox registered for actor {0}")]
    UnknownReceiver(ActorId),
    #[error(transparent)]
    Mailbox(#[from] MailboxError),
}

/// Looks up a live actor's mailbox by id. Implemented by `ActorSystem`;
/// kept as a `dyn` boundary so `dispatcher` has no upward dependency on
/// `system`.
#[async_trait]
pub trait MailboxLookup: Send + Sync {
    fn mailbox(&self, actor: ActorId) -> Option<Arc<Mailbox>>;
}

/// Runs every outbound message through interceptors, then transformers,
/// then route resolution, before enqueuing on the resolved receiver's
/// mailbox (C7).
pub struct Dispatcher {
    interceptors: Vec<Box<dyn Interceptor>>,
    transformers: Vec<Box<dyn Transformer>>,
    routes: RwLock<HashMap<&'static str, DispatchRule>>,
    mailboxes: Arc<dyn MailboxLookup>,
}

impl Dispatcher {
    pub fn new(mailboxes: Arc<dyn MailboxLookup>) -> Self {
        Self {
            interceptors: Vec::new(),
            transformers: Vec::new(),
            routes: RwLock::new(HashMap::new()),
            mailboxes,
        }
    }

    pub fn add_interceptor(&mut self, interceptor: Box<dyn Interceptor>) {
        self.interceptors.push(interceptor);
    }

    pub fn add_transformer(&mut self, transformer: Box<dyn Transformer>) {
        self.transformers.push(transformer);
    }

    /// Register (or overwrite) the route for `message_type`.
    pub fn add_route(&self, message_type: &'static str, rule: DispatchRule) {
        self.routes.write().insert(message_type, rule);
    }

    pub fn remove_route(&self, message_type: &str) {
        self.routes.write().remove(message_type);
    }

    /// Runs the pipeline and returns the actor id the message was actually
    /// enqueued on, after route resolution may have overridden the receiver.
    pub async fn dispatch(&self, mut envelope: Envelope) -> Result<ActorId, DispatchError> {
        for interceptor in &self.interceptors {
            interceptor
                .intercept(&mut envelope)
                .await
                .map_err(DispatchError::Intercepted)?;
        }

        for transformer in &self.transformers {
            transformer.transform(&mut envelope).await;
        }

        if let Some(rule) = self.routes.read().get(envelope.message_type).copied() {
            envelope.receiver = rule.target;
            if envelope.priority < rule.priority {
                envelope.priority = rule.priority;
            }
        }

        let receiver = envelope.receiver;
        let mailbox = self
            .mailboxes
            .mailbox(receiver)
            .ok_or(DispatchError::UnknownReceiver(receiver))?;
        mailbox.enqueue(envelope).await?;
        Ok(receiver)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mailbox::MailboxConfig;
    use crate::message::{Message, MessagePriority};
    use parking_lot::Mutex as PlMutex;
    use std::collections::HashMap as StdHashMap;

    #[derive(Debug)]
    struct Ping;
    impl Message for Ping {
        const MESSAGE_TYPE: &'static str = "ping";
    }

    struct Registry {
        mailboxes: PlMutex<StdHashMap<ActorId, Arc<Mailbox>>>,
    }

    impl Registry {
        fn new() -> Self {
            Self {
                mailboxes: PlMutex::new(StdHashMap::new()),
            }
        }

        fn register(&self, id: ActorId) -> Arc<Mailbox> {
            let mailbox = Arc::new(Mailbox::new(MailboxConfig::default()));
            self.mailboxes.lock().insert(id, mailbox.clone());
            mailbox
        }
    }

    impl MailboxLookup for Registry {
        fn mailbox(&self, actor: ActorId) -> Option<Arc<Mailbox>> {
            self.mailboxes.lock().get(&actor).cloned()
        }
    }

    struct RejectAll;

    #[async_trait]
    impl Interceptor for RejectAll {
        async fn intercept(&self, _envelope: &mut Envelope) -> Result<(), String> {
            Err("rejected".to_string())
        }
    }

    struct TagHeader;

    #[async_trait]
    impl Transformer for TagHeader {
        async fn transform(&self, envelope: &mut Envelope) {
            envelope
                .headers
                .insert("tagged".to_string(), serde_json::Value::Bool(true));
        }
    }

    #[tokio::test]
    async fn dispatch_enqueues_on_the_resolved_mailbox() {
        let registry = Arc::new(Registry::new());
        let receiver = ActorId::new();
        registry.register(receiver);
        let dispatcher = Dispatcher::new(registry.clone());

        dispatcher
            .dispatch(Envelope::new(ActorId::nil(), receiver, Ping))
            .await
            .expect("mailbox is registered");

        let mailbox = registry.mailbox(receiver).expect("registered");
        assert!(mailbox.try_dequeue().is_some());
    }

    #[tokio::test]
    async fn unknown_receiver_is_an_error() {
        let registry = Arc::new(Registry::new());
        let dispatcher = Dispatcher::new(registry);
        let result = dispatcher
            .dispatch(Envelope::new(ActorId::nil(), ActorId::new(), Ping))
            .await;
        assert!(matches!(result, Err(DispatchError::UnknownReceiver(_))));
    }

    #[tokio::test]
    async fn rejecting_interceptor_drops_the_message() {
        let registry = Arc::new(Registry::new());
        let receiver = ActorId::new();
        registry.register(receiver);
        let mut dispatcher = Dispatcher::new(registry);
        dispatcher.add_interceptor(Box::new(RejectAll));

        let result = dispatcher
            .dispatch(Envelope::new(ActorId::nil(), receiver, Ping))
            .await;
        assert!(matches!(result, Err(DispatchError::Intercepted(_))));
    }

    #[tokio::test]
    async fn transformer_mutates_headers_before_enqueue() {
        let registry = Arc::new(Registry::new());
        let receiver = ActorId::new();
        registry.register(receiver);
        let mut dispatcher = Dispatcher::new(registry.clone());
        dispatcher.add_transformer(Box::new(TagHeader));

        dispatcher
            .dispatch(Envelope::new(ActorId::nil(), receiver, Ping))
            .await
            .expect("mailbox is registered");

        let mailbox = registry.mailbox(receiver).expect("registered");
        let envelope = mailbox.try_dequeue().expect("enqueued");
        assert_eq!(
            envelope.headers.get("tagged"),
            Some(&serde_json::Value::Bool(true))
        );
    }

    #[tokio::test]
    async fn route_overrides_receiver_and_raises_priority_floor() {
        let registry = Arc::new(Registry::new());
        let original = ActorId::new();
        let routed = ActorId::new();
        registry.register(original);
        registry.register(routed);
        let dispatcher = Dispatcher::new(registry.clone());
        dispatcher.add_route("ping", DispatchRule::new(routed, MessagePriority::Critical));

        let resolved = dispatcher
            .dispatch(Envelope::new(ActorId::nil(), original, Ping))
            .await
            .expect("routed mailbox exists");

        assert_eq!(resolved, routed);
        assert!(registry.mailbox(original).expect("registered").is_empty());
        let envelope = registry
            .mailbox(routed)
            .expect("registered")
            .try_dequeue()
            .expect("routed message arrives");
        assert_eq!(envelope.priority, MessagePriority::Critical);
    }
}

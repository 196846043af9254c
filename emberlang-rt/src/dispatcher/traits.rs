//! Interceptor and Transformer: the dynamic-dispatch boundaries of the
//! dispatch pipeline (C7). Both run in registration order on every
//! outbound message, so they're kept as trait objects rather than a
//! generic parameter on [`super::Dispatcher`].

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use async_trait::async_trait;

// Layer 3: Internal module imports
use crate::message::Envelope;

/// Runs first in the pipeline, in registration order. Returning `Err`
/// aborts dispatch: the message is dropped and the error is surfaced to
/// the sender instead of being enqueued.
#[async_trait]
pub trait Interceptor: Send + Sync {
    async fn intercept(&self, envelope: &mut Envelope) -> Result<(), String>;
}

/// Runs after interceptors, in registration order. May mutate headers and
/// payload-adjacent metadata; cannot fail dispatch.
#[async_trait]
pub trait Transformer: Send + Sync {
    async fn transform(&self, envelope: &mut Envelope);
}

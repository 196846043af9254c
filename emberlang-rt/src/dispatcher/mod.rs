//! Message dispatch pipeline (C7): intercept, transform, resolve a route,
//! enqueue on the resolved receiver's mailbox.

pub mod dispatcher;
pub mod rules;
pub mod traits;

pub use dispatcher::{DispatchError, Dispatcher, MailboxLookup};
pub use rules::DispatchRule;
pub use traits::{Interceptor, Transformer};

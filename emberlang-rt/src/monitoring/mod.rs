//! # Monitoring Module
//!
//! Universal monitoring infrastructure for observing and tracking events across all runtime components.
//!
//! ## Features
//! - **Generic Monitor<E> Trait**: Universal monitoring for any entity type
//! - **Zero-Cost Abstraction**: NoopMonitor compiles away when disabled
//! - **Lock-Free Recording**: Atomic counters for concurrent event tracking
//! - **Type Safety**: MonitoringEvent trait ensures compile-time correctness
//!
//! ## Event Types
//! - `SupervisionEvent`: Supervisor tree operations and failures
//! - `ActorEvent`: Actor lifecycle and message processing
//! - `SystemEvent`: Actor system-level events
//! - `DispatcherEvent`: Dispatch pipeline routing and interception
//! - `MailboxEvent`: Mailbox operations and backpressure
//!
//! ## Examples
//! ```rust,ignore
//! use emberlang_rt::monitoring::{InMemoryMonitor, Monitor, MonitoringConfig, ActorEvent};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MonitoringConfig::default();
//! let monitor = InMemoryMonitor::<ActorEvent>::new(config);
//!
//! // monitor.record(event).await?;
//! // let snapshot = monitor.snapshot().await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod in_memory;
pub mod noop;
pub mod traits;
pub mod types;

pub use error::MonitoringError;
pub use in_memory::InMemoryMonitor;
pub use noop::NoopMonitor;
pub use traits::{EventSeverity, Monitor, MonitoringEvent};
pub use types::{
    ActorEvent, ActorEventKind, DispatcherEvent, DispatcherEventKind, MailboxEvent, MailboxEventKind,
    MonitoringConfig, MonitoringSnapshot, SupervisionEvent, SupervisionEventKind, SystemEvent,
    SystemEventKind,
};

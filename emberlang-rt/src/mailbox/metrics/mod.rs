//! Mailbox metrics recording and tracking subsystem.
//!
//! Provides trait-based metrics recording for mailbox operations with
//! pluggable implementations.
//!
//! # Design
//!
//! - `MetricsRecorder` trait: Interface for recording metrics
//! - `AtomicMetrics`: Default lock-free implementation using atomics
//! - Future: `AsyncMetrics`, `NoOpMetrics`, `PrometheusMetrics`
//!
//! # Architecture
//!
//! The metrics system uses generic constraints (`R: MetricsRecorder`) instead of
//! trait objects (`dyn MetricsRecorder`) for zero-cost abstractions (ยง6.2).
//!
//! Both [`super::StandardMailbox`] and [`super::PriorityMailbox`] share the
//! same [`AtomicMetrics`] recorder, reached through [`super::Mailbox::metrics`].
//!
//! # Example
//!
//! ```rust
//! use emberlang_rt::mailbox::{Mailbox, MailboxConfig};
//!
//! let mailbox = Mailbox::new(MailboxConfig::default());
//! let metrics = mailbox.metrics();
//! assert_eq!(metrics.sent_count(), 0);
//! ```
//!
//! # Future Implementations
//!
//! ## AsyncMetrics (Fire-and-Forget)
//!
//! ```ignore
//! pub struct AsyncMetrics {
//!     tx: mpsc::UnboundedSender<MetricEvent>,
//! }
//!
//! impl MetricsRecorder for AsyncMetrics {
//!     fn record_sent(&self) {
//!         let _ = self.tx.send(MetricEvent::Sent);
//!     }
//!     // Background task aggregates events
//! }
//! ```
//!
//! ## NoOpMetrics (Zero Overhead)
//!
//! ```ignore
//! pub struct NoOpMetrics;
//!
//! impl MetricsRecorder for NoOpMetrics {
//!     fn record_sent(&self) {}  // No-op
//!     fn sent_count(&self) -> u64 { 0 }
//!     // All operations are no-ops
//! }
//! ```
//!
//! ## PrometheusMetrics (Remote Export)
//!
//! ```ignore
//! pub struct PrometheusMetrics {
//!     counter_sent: prometheus::Counter,
//!     counter_received: prometheus::Counter,
//!     gauge_in_flight: prometheus::Gauge,
//! }
//!
//! impl MetricsRecorder for PrometheusMetrics {
//!     fn record_sent(&self) {
//!         self.counter_sent.inc();
//!         self.gauge_in_flight.inc();
//!     }
//!     // Export to Prometheus registry
//! }
//! ```

mod atomic;
mod recorder;

pub use atomic::AtomicMetrics;
pub use recorder::MetricsRecorder;

//! Monitoring event types and configuration structures.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::traits::{EventSeverity, MonitoringEvent};
use crate::util::ActorId;

/// Configuration for monitoring behavior.
///
/// Controls how events are recorded, filtered, and stored in the monitor.
#[derive(Debug, Clone, Serialize)]
pub struct MonitoringConfig {
    /// Whether monitoring is enabled
    pub enabled: bool,

    /// Maximum number of events to keep in history
    pub max_history_size: usize,

    /// Minimum severity level to record (events below this are filtered)
    pub severity_filter: EventSeverity,

    /// Interval for snapshot generation (if using background snapshots)
    #[serde(with = "crate::util::duration_serde")]
    pub snapshot_interval: Duration,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_history_size: 1000,
            severity_filter: EventSeverity::Info,
            snapshot_interval: Duration::from_secs(60),
        }
    }
}

/// Snapshot of monitoring state at a point in time.
///
/// Provides queryable access to monitoring counters and recent event history.
#[derive(Debug, Clone, Serialize)]
pub struct MonitoringSnapshot<E: MonitoringEvent> {
    /// Timestamp when snapshot was taken
    pub timestamp: DateTime<Utc>,

    /// Total number of events recorded
    pub total_events: u64,

    /// Number of trace-level events
    pub trace_count: u64,

    /// Number of debug-level events
    pub debug_count: u64,

    /// Number of info-level events
    pub info_count: u64,

    /// Number of warning-level events
    pub warning_count: u64,

    /// Number of error-level events
    pub error_count: u64,

    /// Number of critical-level events
    pub critical_count: u64,

    /// Recent events (up to max_history_size)
    pub recent_events: Vec<E>,
}

// ============================================================================
// Supervision Events
// ============================================================================

/// Events related to supervisor operations and child management.
#[derive(Debug, Clone, Serialize)]
pub struct SupervisionEvent {
    /// Timestamp when event occurred (§3.2 chrono DateTime<Utc>)
    pub timestamp: DateTime<Utc>,

    /// ID of the supervisor
    pub supervisor_id: String,

    /// ID of the child actor (if applicable)
    pub child_id: Option<String>,

    /// Specific supervision event type
    pub event_kind: SupervisionEventKind,

    /// Additional event metadata
    pub metadata: HashMap<String, String>,
}

impl MonitoringEvent for SupervisionEvent {
    const EVENT_TYPE: &'static str = "supervision";

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn severity(&self) -> EventSeverity {
        match &self.event_kind {
            SupervisionEventKind::ChildStarted => EventSeverity::Info,
            SupervisionEventKind::ChildStopped => EventSeverity::Info,
            SupervisionEventKind::ChildFailed { .. } => EventSeverity::Error,
            SupervisionEventKind::ChildRestarted { .. } => EventSeverity::Warning,
            SupervisionEventKind::RestartLimitExceeded { .. } => EventSeverity::Critical,
            SupervisionEventKind::StrategyApplied { .. } => EventSeverity::Info,
        }
    }
}

/// Specific types of supervision events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum SupervisionEventKind {
    /// Child actor successfully started
    ChildStarted,

    /// Child actor gracefully stopped
    ChildStopped,

    /// Child actor failed with error
    ChildFailed {
        /// Error message
        error: String,
        /// Current restart count
        restart_count: u32,
    },

    /// Child actor was restarted after failure
    ChildRestarted {
        /// Restart count after this restart
        restart_count: u32,
    },

    /// Restart rate limit exceeded
    RestartLimitExceeded {
        /// Number of restarts attempted
        restart_count: u32,
        /// Time window for restart limit
        #[serde(with = "crate::util::duration_serde")]
        window: Duration,
    },

    /// Supervision strategy was applied
    StrategyApplied {
        /// Name of the strategy (OneForOne, OneForAll, RestForOne)
        strategy: String,
        /// Number of children affected
        affected_count: usize,
    },
}

// ============================================================================
// Actor Events
// ============================================================================

/// Events related to actor lifecycle and message processing.
#[derive(Debug, Clone, Serialize)]
pub struct ActorEvent {
    /// Timestamp when event occurred (§3.2 chrono DateTime<Utc>)
    pub timestamp: DateTime<Utc>,

    /// ID of the actor
    pub actor_id: ActorId,

    /// Specific actor event type
    pub event_kind: ActorEventKind,

    /// Additional event metadata
    pub metadata: HashMap<String, String>,
}

impl MonitoringEvent for ActorEvent {
    const EVENT_TYPE: &'static str = "actor";

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn severity(&self) -> EventSeverity {
        match &self.event_kind {
            ActorEventKind::Spawned => EventSeverity::Debug,
            ActorEventKind::Started => EventSeverity::Info,
            ActorEventKind::MessageReceived { .. } => EventSeverity::Trace,
            ActorEventKind::MessageProcessed { .. } => EventSeverity::Trace,
            ActorEventKind::ErrorOccurred { .. } => EventSeverity::Error,
            ActorEventKind::Stopped => EventSeverity::Info,
        }
    }
}

/// Specific types of actor events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ActorEventKind {
    /// Actor was spawned
    Spawned,

    /// Actor started execution
    Started,

    /// Actor received a message
    MessageReceived {
        /// Message type name
        message_type: String,
    },

    /// Actor finished processing a message
    MessageProcessed {
        /// Message type name
        message_type: String,
        /// Processing duration in microseconds
        duration_micros: u64,
    },

    /// Error occurred during actor execution
    ErrorOccurred {
        /// Error message
        error: String,
    },

    /// Actor stopped execution
    Stopped,
}

// ============================================================================
// System Events
// ============================================================================

/// Events related to actor system operations.
#[derive(Debug, Clone, Serialize)]
pub struct SystemEvent {
    /// Timestamp when event occurred (§3.2 chrono DateTime<Utc>)
    pub timestamp: DateTime<Utc>,

    /// Specific system event type
    pub event_kind: SystemEventKind,

    /// Additional event metadata
    pub metadata: HashMap<String, String>,
}

impl MonitoringEvent for SystemEvent {
    const EVENT_TYPE: &'static str = "system";

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn severity(&self) -> EventSeverity {
        match &self.event_kind {
            SystemEventKind::Started => EventSeverity::Info,
            SystemEventKind::Shutdown => EventSeverity::Info,
            SystemEventKind::ActorRegistered { .. } => EventSeverity::Debug,
            SystemEventKind::ActorDeregistered { .. } => EventSeverity::Debug,
            SystemEventKind::ConfigurationChanged => EventSeverity::Info,
        }
    }
}

/// Specific types of system events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum SystemEventKind {
    /// Actor system started
    Started,

    /// Actor system shutting down
    Shutdown,

    /// Actor registered with the system
    ActorRegistered {
        /// ID of the registered actor
        actor_id: ActorId,
    },

    /// Actor deregistered from the system
    ActorDeregistered {
        /// ID of the deregistered actor
        actor_id: ActorId,
    },

    /// System configuration was changed
    ConfigurationChanged,
}

// ============================================================================
// Dispatcher Events
// ============================================================================

/// Events related to the dispatch pipeline (C7): interception, routing,
/// and route table changes.
#[derive(Debug, Clone, Serialize)]
pub struct DispatcherEvent {
    /// Timestamp when event occurred (§3.2 chrono DateTime<Utc>)
    pub timestamp: DateTime<Utc>,

    /// Specific dispatcher event type
    pub event_kind: DispatcherEventKind,

    /// Additional event metadata
    pub metadata: HashMap<String, String>,
}

impl MonitoringEvent for DispatcherEvent {
    const EVENT_TYPE: &'static str = "dispatcher";

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn severity(&self) -> EventSeverity {
        match &self.event_kind {
            DispatcherEventKind::MessageDispatched { .. } => EventSeverity::Trace,
            DispatcherEventKind::MessageRouted { .. } => EventSeverity::Trace,
            DispatcherEventKind::RouteAdded { .. } => EventSeverity::Debug,
            DispatcherEventKind::RouteRemoved { .. } => EventSeverity::Debug,
            DispatcherEventKind::RoutingFailed { .. } => EventSeverity::Error,
            DispatcherEventKind::MessageIntercepted { .. } => EventSeverity::Warning,
        }
    }
}

/// Specific types of dispatcher events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum DispatcherEventKind {
    /// Message entered the dispatch pipeline
    MessageDispatched {
        /// Message type name
        message_type: String,
    },

    /// Message successfully routed to an actor's mailbox
    MessageRouted {
        /// Destination actor ID
        actor_id: ActorId,
        /// Message type name
        message_type: String,
    },

    /// A route rule was registered for a message type
    RouteAdded {
        /// Message type the route applies to
        message_type: String,
    },

    /// A route rule was removed
    RouteRemoved {
        /// Message type the route applied to
        message_type: String,
    },

    /// Failed to route message to its receiver
    RoutingFailed {
        /// Target actor ID
        actor_id: ActorId,
        /// Failure reason
        reason: String,
    },

    /// An interceptor rejected the message before it reached a mailbox
    MessageIntercepted {
        /// Message type name
        message_type: String,
        /// Reason the interceptor gave
        reason: String,
    },
}

// ============================================================================
// Mailbox Events
// ============================================================================

/// Events related to mailbox operations and backpressure.
#[derive(Debug, Clone, Serialize)]
pub struct MailboxEvent {
    /// Timestamp when event occurred (§3.2 chrono DateTime<Utc>)
    pub timestamp: DateTime<Utc>,

    /// ID of the actor owning the mailbox
    pub actor_id: ActorId,

    /// Specific mailbox event type
    pub event_kind: MailboxEventKind,

    /// Additional event metadata
    pub metadata: HashMap<String, String>,
}

impl MonitoringEvent for MailboxEvent {
    const EVENT_TYPE: &'static str = "mailbox";

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn severity(&self) -> EventSeverity {
        match &self.event_kind {
            MailboxEventKind::MessageEnqueued { .. } => EventSeverity::Trace,
            MailboxEventKind::MessageDequeued { .. } => EventSeverity::Trace,
            MailboxEventKind::BackpressureApplied { .. } => EventSeverity::Warning,
            MailboxEventKind::CapacityReached => EventSeverity::Warning,
            MailboxEventKind::MessageDropped { .. } => EventSeverity::Error,
        }
    }
}

/// Specific types of mailbox events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum MailboxEventKind {
    /// Message enqueued in mailbox
    MessageEnqueued {
        /// Current queue size
        queue_size: usize,
    },

    /// Message dequeued from mailbox
    MessageDequeued {
        /// Remaining queue size
        queue_size: usize,
    },

    /// Backpressure strategy applied
    BackpressureApplied {
        /// Strategy applied (Block, Drop, Error)
        strategy: String,
    },

    /// Mailbox capacity reached
    CapacityReached,

    /// Message dropped due to backpressure
    MessageDropped {
        /// Reason for dropping
        reason: String,
    },
}

//! The actor system (C10): the facade that owns every subsystem
//! (dispatcher, scheduler, supervision tree, I/O bridge) and is the single
//! concrete implementor of the `dyn` boundary traits the other modules
//! expose.

pub mod actor_system;
pub mod config;
pub mod errors;
pub mod io;
pub mod snapshot;

pub use actor_system::{ActorSystem, Terminated};
pub use config::{SystemConfig, SystemConfigBuilder, DEFAULT_MAILBOX_CAPACITY, DEFAULT_SHUTDOWN_DEADLINE, DEFAULT_TRACING_RING_SIZE};
pub use errors::SystemError;
pub use io::{
    ConnId, FsEvent, FsOp, FsWatcher, IoError, IoEvent, IoEventKind, IoReadable, IoWritable,
    NoopFsWatcher, NoopPoller, Poller, RateLimiter,
};
pub use snapshot::{ActorSnapshot, StatisticsCounters, SystemSnapshot, SystemStatistics, TraceEvent, TracingRing};

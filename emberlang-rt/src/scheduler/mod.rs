//! The scheduler (C8): a shared MPMC ready-queue of actor ids drained by a
//! fixed pool of async workers, each bounded by a per-visit throughput
//! budget so no single actor can starve the others.

pub mod scheduled_actor;
pub mod scheduler;

pub use scheduled_actor::ScheduledActor;
pub use scheduler::{Scheduler, SchedulerConfig, SchedulerHost, DEFAULT_SHUTDOWN_DEADLINE};

//! The I/O bridge (§4.9, §6): turns [`Poller`] readiness edges into
//! `IOReadable`/`IOWritable`/`IOError` messages for the bound actor, with
//! watermark-driven back-pressure and a per-connection token-bucket rate
//! limit.

// Layer 1: Standard library imports
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
use crate::message::Message;

/// Opaque handle identifying a registered I/O connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoEventKind {
    Readable,
    Writable,
    Error,
}

#[derive(Debug, Clone, Copy)]
pub struct IoEvent {
    pub conn: ConnId,
    pub kind: IoEventKind,
}

/// Delivered to the bound actor when its connection becomes readable.
#[derive(Debug)]
pub struct IoReadable;
impl Message for IoReadable {
    const MESSAGE_TYPE: &'static str = "io_readable";
}

/// Delivered to the bound actor when its connection becomes writable.
#[derive(Debug)]
pub struct IoWritable;
impl Message for IoWritable {
    const MESSAGE_TYPE: &'static str = "io_writable";
}

/// Delivered to the bound actor when its connection reports an error.
#[derive(Debug)]
pub struct IoError {
    pub reason: String,
}
impl Message for IoError {
    const MESSAGE_TYPE: &'static str = "io_error";
}

/// Readiness poller consumed by the I/O bridge (§6). `register`'s handler
/// runs once per readiness edge and must not block.
#[async_trait]
pub trait Poller: Send + Sync {
    async fn start(&self) -> Result<(), String>;
    async fn stop(&self);
    fn register(&self, conn: ConnId, kinds: Vec<IoEventKind>, handler: Arc<dyn Fn(IoEvent) + Send + Sync>);
    fn deregister(&self, conn: ConnId);
}

/// Test double / default for embedders that do not yet wire a real poller.
pub struct NoopPoller;

#[async_trait]
impl Poller for NoopPoller {
    async fn start(&self) -> Result<(), String> {
        Ok(())
    }

    async fn stop(&self) {}

    fn register(&self, _conn: ConnId, _kinds: Vec<IoEventKind>, _handler: Arc<dyn Fn(IoEvent) + Send + Sync>) {}

    fn deregister(&self, _conn: ConnId) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsOp {
    Create,
    Write,
    Remove,
    Rename,
    Chmod,
}

#[derive(Debug, Clone)]
pub struct FsEvent {
    pub op: FsOp,
    pub path: PathBuf,
    pub timestamp: DateTime<Utc>,
}
impl Message for FsEvent {
    const MESSAGE_TYPE: &'static str = "fs_event";
}

/// Filesystem watcher consumed by `watchPathWithActor` (§6).
#[async_trait]
pub trait FsWatcher: Send + Sync {
    async fn watch(
        &self,
        recursive: bool,
        path: &Path,
    ) -> Result<tokio::sync::mpsc::UnboundedReceiver<FsEvent>, String>;
}

/// Test double / default for embedders that do not yet wire a real watcher.
pub struct NoopFsWatcher;

#[async_trait]
impl FsWatcher for NoopFsWatcher {
    async fn watch(
        &self,
        _recursive: bool,
        _path: &Path,
    ) -> Result<tokio::sync::mpsc::UnboundedReceiver<FsEvent>, String> {
        let (_tx, rx) = tokio::sync::mpsc::unbounded_channel();
        Ok(rx)
    }
}

/// Per-connection token bucket: `refill_per_sec` tokens/sec up to `burst`
/// capacity. Events beyond budget are either dropped or queued at
/// `MessagePriority::Low`, per `SystemConfig::drop_on_rate_limit` at the
/// call site (§4.9).
pub struct RateLimiter {
    capacity: f64,
    refill_per_sec: f64,
    state: Mutex<(f64, Instant)>,
}

impl RateLimiter {
    pub fn new(refill_per_sec: u32, burst: u32) -> Self {
        Self {
            capacity: f64::from(burst),
            refill_per_sec: f64::from(refill_per_sec),
            state: Mutex::new((f64::from(burst), Instant::now())),
        }
    }

    /// Try to take one token. `false` means the caller is over budget.
    pub fn try_acquire(&self) -> bool {
        let mut guard = self.state.lock();
        let (tokens, last) = &mut *guard;
        let now = Instant::now();
        let elapsed = now.duration_since(*last).as_secs_f64();
        *tokens = (*tokens + elapsed * self.refill_per_sec).min(self.capacity);
        *last = now;
        if *tokens >= 1.0 {
            *tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

//! System-wide configuration with sensible defaults, assembled through a
//! fluent builder or a `serde`-deserialized TOML/JSON document.

// Layer 1: Standard library
use std::time::Duration;

// Layer 2: Third-party
use serde::{Deserialize, Serialize};

// Layer 3: Internal
use crate::mailbox::{MailboxKind, OverflowPolicy};
use crate::supervisor::{SupervisorStrategy, SupervisorType};

pub const DEFAULT_MAILBOX_CAPACITY: usize = 1024;
pub const DEFAULT_SHUTDOWN_DEADLINE: Duration = Duration::from_secs(5);
pub const DEFAULT_TRACING_RING_SIZE: usize = 256;
pub const DEFAULT_ROOT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_ROOT_RETRY_PERIOD: Duration = Duration::from_secs(60);
pub const DEFAULT_IO_MONITOR_INTERVAL: Duration = Duration::from_millis(50);

/// `{workerCount, defaultMailboxCapacity/overflowPolicy, watermarks,
/// rateLimit, shutdownDeadline, tracingRingSize}` (§4.9).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Scheduler worker count; `None` defaults to `num_cpus::get()`.
    pub worker_count: Option<usize>,

    pub default_mailbox_kind: MailboxKind,
    pub default_mailbox_capacity: usize,
    pub default_overflow_policy: OverflowPolicy,

    /// Mailbox length at which the I/O bridge pauses the source actor.
    pub watermark_high: usize,
    /// Mailbox length at which a paused actor's I/O source resumes.
    pub watermark_low: usize,

    /// Token-bucket rate limit applied to the I/O bridge, messages/sec.
    pub io_rate_limit_per_sec: u32,
    pub io_rate_limit_burst: u32,

    /// When a connection is over its rate-limit budget: `true` drops the
    /// event (`IORateLimitedDrops++`); `false` still delivers it, enqueued
    /// at `MessagePriority::Low` (§4.9).
    pub drop_on_rate_limit: bool,

    /// How often the background I/O monitor re-checks paused connections
    /// against `watermark_low` (§4.9's `MonitorInterval`).
    pub io_monitor_interval: Duration,

    pub shutdown_deadline: Duration,

    /// Ring size for the tracing buffer; `0` disables tracing until
    /// `ActorSystem::enable_tracing` is called explicitly.
    pub tracing_ring_size: usize,

    /// Strategy/type/retry-budget for the root supervisor (§4.8); every
    /// actor spawned without an explicit `supervisor_id` lands under it.
    pub root_supervisor_strategy: SupervisorStrategy,
    pub root_supervisor_type: SupervisorType,
    pub root_max_retries: u32,
    pub root_retry_period: Duration,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            worker_count: None,
            default_mailbox_kind: MailboxKind::Standard,
            default_mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
            default_overflow_policy: OverflowPolicy::Reject,
            watermark_high: 800,
            watermark_low: 200,
            io_rate_limit_per_sec: 10_000,
            io_rate_limit_burst: 1_000,
            drop_on_rate_limit: true,
            io_monitor_interval: DEFAULT_IO_MONITOR_INTERVAL,
            shutdown_deadline: DEFAULT_SHUTDOWN_DEADLINE,
            tracing_ring_size: 0,
            root_supervisor_strategy: SupervisorStrategy::Restart,
            root_supervisor_type: SupervisorType::OneForOne,
            root_max_retries: DEFAULT_ROOT_MAX_RETRIES,
            root_retry_period: DEFAULT_ROOT_RETRY_PERIOD,
        }
    }
}

impl SystemConfig {
    pub fn builder() -> SystemConfigBuilder {
        SystemConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.default_mailbox_capacity == 0 {
            return Err("default_mailbox_capacity must be > 0".to_string());
        }
        if self.watermark_low >= self.watermark_high {
            return Err("watermark_low must be < watermark_high".to_string());
        }
        Ok(())
    }
}

/// Fluent builder for [`SystemConfig`].
#[derive(Debug, Default)]
pub struct SystemConfigBuilder {
    config: SystemConfig,
}

impl SystemConfigBuilder {
    pub fn worker_count(mut self, count: usize) -> Self {
        self.config.worker_count = Some(count);
        self
    }

    pub fn default_mailbox_capacity(mut self, capacity: usize) -> Self {
        self.config.default_mailbox_capacity = capacity;
        self
    }

    pub fn default_overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.config.default_overflow_policy = policy;
        self
    }

    pub fn watermarks(mut self, low: usize, high: usize) -> Self {
        self.config.watermark_low = low;
        self.config.watermark_high = high;
        self
    }

    pub fn io_rate_limit(mut self, per_sec: u32, burst: u32) -> Self {
        self.config.io_rate_limit_per_sec = per_sec;
        self.config.io_rate_limit_burst = burst;
        self
    }

    pub fn io_monitor_interval(mut self, interval: Duration) -> Self {
        self.config.io_monitor_interval = interval;
        self
    }

    pub fn drop_on_rate_limit(mut self, drop: bool) -> Self {
        self.config.drop_on_rate_limit = drop;
        self
    }

    pub fn shutdown_deadline(mut self, deadline: Duration) -> Self {
        self.config.shutdown_deadline = deadline;
        self
    }

    pub fn tracing_ring_size(mut self, size: usize) -> Self {
        self.config.tracing_ring_size = size;
        self
    }

    pub fn root_supervisor(
        mut self,
        strategy: SupervisorStrategy,
        supervisor_type: SupervisorType,
        max_retries: u32,
        retry_period: Duration,
    ) -> Self {
        self.config.root_supervisor_strategy = strategy;
        self.config.root_supervisor_type = supervisor_type;
        self.config.root_max_retries = max_retries;
        self.config.root_retry_period = retry_period;
        self
    }

    pub fn build(self) -> Result<SystemConfig, String> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(SystemConfig::default().validate().is_ok());
    }

    #[test]
    fn builder_composes_overrides() {
        let config = SystemConfig::builder()
            .worker_count(4)
            .default_mailbox_capacity(256)
            .watermarks(100, 400)
            .shutdown_deadline(Duration::from_secs(10))
            .tracing_ring_size(64)
            .build()
            .expect("valid configuration");

        assert_eq!(config.worker_count, Some(4));
        assert_eq!(config.default_mailbox_capacity, 256);
        assert_eq!(config.watermark_low, 100);
        assert_eq!(config.watermark_high, 400);
        assert_eq!(config.shutdown_deadline, Duration::from_secs(10));
        assert_eq!(config.tracing_ring_size, 64);
    }

    #[test]
    fn root_supervisor_overrides_strategy_and_retry_budget() {
        let config = SystemConfig::builder()
            .root_supervisor(
                SupervisorStrategy::Restart,
                SupervisorType::RestForOne,
                2,
                Duration::from_millis(200),
            )
            .build()
            .expect("valid configuration");

        assert_eq!(config.root_supervisor_type, SupervisorType::RestForOne);
        assert_eq!(config.root_max_retries, 2);
        assert_eq!(config.root_retry_period, Duration::from_millis(200));
    }

    #[test]
    fn inverted_watermarks_fail_validation() {
        let result = SystemConfig::builder().watermarks(500, 100).build();
        assert!(result.is_err());
    }

    #[test]
    fn round_trips_through_toml() {
        let config = SystemConfig::default();
        let toml_text = toml::to_string(&config).expect("serializes");
        let parsed: SystemConfig = toml::from_str(&toml_text).expect("parses");
        assert_eq!(parsed.default_mailbox_capacity, config.default_mailbox_capacity);
    }
}

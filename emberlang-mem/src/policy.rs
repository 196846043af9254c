//! Allocator-wide policy configuration: security options, caps, and the
//! recognised (if not all wired-to-behavior) strategy enums from the
//! external interface table.

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};

use crate::block::AllocationStrategy;

/// Security-related allocation behavior.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SecurityPolicy {
    /// Write and validate N-byte canary guards around every allocation.
    pub enable_canaries: bool,
    /// Size in bytes of each canary guard (before and after the payload).
    pub canary_size: usize,
    /// Zero the payload on deallocation before recycling the extent.
    pub enable_zero_on_free: bool,
    /// Force canary write/validate in debug builds regardless of
    /// `enable_canaries` (`debugStrictCanaryCheck`).
    pub debug_strict_canary_check: bool,
}

impl Default for SecurityPolicy {
    fn default() -> Self {
        Self {
            enable_canaries: true,
            canary_size: 8,
            enable_zero_on_free: true,
            debug_strict_canary_check: cfg!(debug_assertions),
        }
    }
}

/// Recognised compaction strategies (§6). Only `Incremental`-style bounded
/// compaction (time-budgeted, see [`crate::region::Region::compact`]) is
/// wired to behavior; the others are accepted and stored for forward
/// compatibility but currently behave identically to `Incremental`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CompactionStrategyType {
    MarkAndSweep,
    Copying,
    Generational,
    #[default]
    Incremental,
    Concurrent,
}

/// Recognised region-pool growth strategies (§6). Only `Exponential` growth
/// is wired into [`crate::allocator::RegionAllocator`]; the others are
/// accepted configuration values that currently fall back to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GrowthStrategy {
    #[default]
    Exponential,
    Linear,
    Adaptive,
}

/// Per-region allocation policy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RegionPolicy {
    pub alloc_strategy: AllocationStrategy,
    pub security: SecurityPolicy,
    /// A candidate free block larger than needed by more than this many
    /// bytes is split; smaller surpluses are allocated whole (counted as
    /// internal waste).
    pub splinter_threshold: usize,
    /// Hard cap on live allocations in this region; `None` for no cap.
    pub max_allocations: Option<u64>,
    /// Hard cap on `used_bytes`; `None` for no cap (the region's own
    /// `total_size` is always an implicit cap).
    pub max_memory_usage: Option<usize>,
    /// Wall-clock budget for a single `compact()` call.
    pub max_compaction_time: std::time::Duration,
}

impl Default for RegionPolicy {
    fn default() -> Self {
        Self {
            alloc_strategy: AllocationStrategy::default(),
            security: SecurityPolicy::default(),
            splinter_threshold: 32,
            max_allocations: None,
            max_memory_usage: None,
            max_compaction_time: std::time::Duration::from_millis(100),
        }
    }
}

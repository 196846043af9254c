//! Typed error taxonomy for the region allocator.
//!
//! Every fallible operation in this crate returns [`MemError`] rather than
//! panicking. Debug builds additionally `debug_assert!` on the invariants
//! listed in the module docs of [`crate::region`] and [`crate::block_manager`];
//! those assertions exist to catch corruption during development and are not
//! a substitute for the typed error path used in release builds.

// Layer 2: Third-party crate imports
use thiserror::Error;

/// A region identifier, used purely for error reporting.
pub type RegionId = u64;

/// Errors produced by region and allocator operations.
#[derive(Debug, Error)]
pub enum MemError {
    /// No free block (of any strategy) could satisfy the request.
    #[error("out of space: requested {requested} bytes, largest free block is {largest_free} bytes")]
    OutOfSpace {
        requested: usize,
        largest_free: usize,
    },

    /// A configured policy limit (`MaxAllocations`, `MaxMemoryUsage`, `MaxRegions`,
    /// `MaxTotalMemory`) would be exceeded by this operation.
    #[error("policy violation: {reason}")]
    PolicyViolation { reason: String },

    /// `deallocate` was called with a pointer that is not currently registered
    /// (unknown, already freed, or never allocated by this allocator).
    #[error("invalid pointer: {0:#x} is not a live allocation")]
    InvalidPointer(usize),

    /// A region header's checksum did not match its recomputed value.
    #[error("corrupted header in region {0}")]
    CorruptedHeader(RegionId),

    /// A canary guard byte did not match its expected sentinel value.
    #[error("canary mismatch for allocation at {0:#x}; region marked Corrupted")]
    CanaryMismatch(usize),

    /// `getRegion` / `freeRegion` referenced an id that does not exist.
    #[error("region {0} not found")]
    NotFound(RegionId),

    /// Compaction did not finish within `maxCompactionTime` and was aborted
    /// without mutating the region.
    #[error("compaction of region {0} exceeded its time budget and was aborted")]
    CompactionTimedOut(RegionId),

    /// The requested region id already exists in the active set.
    #[error("region {0} already exists")]
    AlreadyExists(RegionId),

    /// The `PageSource` collaborator failed to produce backing memory.
    #[error("page source failed: {0}")]
    PageSourceFailed(String),
}

impl MemError {
    /// True for errors that leave the owning region permanently unusable.
    pub fn is_fatal_to_region(&self) -> bool {
        matches!(self, MemError::CorruptedHeader(_) | MemError::CanaryMismatch(_))
    }
}

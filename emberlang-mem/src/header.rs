//! [`RegionHeader`]: the per-region metadata block, its checksum, and its
//! state machine.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};

/// Magic value stamped into every region header; used to recognize a live,
/// uncorrupted header versus stray bytes.
pub const REGION_MAGIC: u64 = 0xDEAD_BEEF_CAFE_BABE;

/// Lifecycle state of a [`crate::region::Region`].
///
/// Transitions are monotonic except `Freed -> Active`, which happens only
/// through `resetRegion` when the allocator reuses a pooled region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RegionState {
    Uninit,
    Active,
    Full,
    Freed,
    /// Terminal: a canary or checksum mismatch was detected. The region is
    /// removed from the active set and never reused.
    Corrupted,
}

/// Per-region metadata, including the running checksum used to detect
/// corruption.
///
/// Invariants (checked by [`crate::region::Region`] after every mutation):
/// - `used_bytes + free_bytes == total_size`
/// - `checksum == Self::compute_checksum(..)`
#[derive(Debug, Clone)]
pub struct RegionHeader {
    pub id: u64,
    pub total_size: usize,
    pub used_bytes: usize,
    pub free_bytes: usize,
    pub alignment: usize,
    pub state: RegionState,
    pub ref_count: u32,
    pub alloc_count: u64,
    pub free_count: u64,
    pub created_at: DateTime<Utc>,
    pub last_access: DateTime<Utc>,
    pub magic: u64,
    pub checksum: u64,
}

impl RegionHeader {
    /// Construct a header for a freshly acquired region, with a valid
    /// checksum already computed.
    pub fn new(id: u64, total_size: usize, alignment: usize) -> Self {
        let now = Utc::now();
        let mut header = Self {
            id,
            total_size,
            used_bytes: 0,
            free_bytes: total_size,
            alignment,
            state: RegionState::Active,
            ref_count: 1,
            alloc_count: 0,
            free_count: 0,
            created_at: now,
            last_access: now,
            magic: REGION_MAGIC,
            checksum: 0,
        };
        header.recompute_checksum();
        header
    }

    /// XOR-fold every scalar field (plus the magic) into a checksum. Any
    /// single-field corruption flips the result.
    pub fn compute_checksum(&self) -> u64 {
        self.id
            ^ self.total_size as u64
            ^ self.used_bytes as u64
            ^ self.free_bytes as u64
            ^ self.alignment as u64
            ^ (self.state as u64)
            ^ self.ref_count as u64
            ^ self.alloc_count
            ^ self.free_count
            ^ self.created_at.timestamp_millis() as u64
            ^ self.last_access.timestamp_millis() as u64
            ^ self.magic
    }

    /// Recompute and store the checksum; must be called after every mutation
    /// to a scalar field.
    pub fn recompute_checksum(&mut self) {
        self.checksum = self.compute_checksum();
    }

    /// True when the stored checksum matches the fields as they currently
    /// stand — a mismatch means the header (or the memory backing it) was
    /// corrupted out from under us.
    pub fn is_checksum_valid(&self) -> bool {
        self.checksum == self.compute_checksum()
    }

    /// Touch `last_access` and recompute the checksum. Called on every
    /// allocate/deallocate/compact so `lastAccess` stays meaningful.
    pub fn touch(&mut self) {
        self.last_access = Utc::now();
        self.recompute_checksum();
    }

    /// Reset a `Freed` header back to a fresh `Active` one in place, for
    /// pool reuse. Panics (debug-only contract, checked by the caller) if
    /// the header is not currently `Freed`.
    pub fn reset(&mut self) {
        debug_assert_eq!(self.state, RegionState::Freed, "reset requires a Freed header");
        let now = Utc::now();
        self.used_bytes = 0;
        self.free_bytes = self.total_size;
        self.state = RegionState::Active;
        self.ref_count = 1;
        self.alloc_count = 0;
        self.free_count = 0;
        self.created_at = now;
        self.last_access = now;
        self.recompute_checksum();
    }
}

//! Process-wide `userPtr -> BlockHeader` registry.
//!
//! Sharded the same way the frankenlibc membrane arena shards its
//! address-to-slot table: a fixed power-of-two shard count, each guarded by
//! its own `parking_lot::RwLock`, indexed by a cheap hash of the pointer so
//! concurrent allocations in unrelated regions rarely contend on the same
//! shard.
//!
//! Canary bytes themselves are read/written by [`crate::region::Region`],
//! which is the only component with access to the backing buffer; this
//! module owns the header metadata (magic, size, owner region, type info)
//! that lets [`crate::allocator::RegionAllocator`] route a bare pointer back
//! to its owning region without scanning every region in the pool.

// Layer 1: Standard library imports
use std::collections::HashMap;

// Layer 2: Third-party crate imports
use parking_lot::RwLock;

// Layer 3: Internal module imports
use crate::block::{BlockHeader, TypeInfo};
use crate::error::MemError;

const SHARD_COUNT: usize = 16;

#[derive(Default)]
struct Shard {
    table: HashMap<usize, BlockHeader>,
}

/// Sharded `userPtr -> BlockHeader` map shared by every region in a
/// [`crate::allocator::RegionAllocator`].
pub struct BlockManager {
    shards: Vec<RwLock<Shard>>,
}

impl Default for BlockManager {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockManager {
    pub fn new() -> Self {
        Self {
            shards: (0..SHARD_COUNT).map(|_| RwLock::new(Shard::default())).collect(),
        }
    }

    fn shard_for(&self, ptr: usize) -> &RwLock<Shard> {
        // A pointer's low bits are dominated by alignment padding and carry
        // little entropy; fold in a wider slice before masking to the shard
        // count so adjacent allocations still spread across shards.
        let mixed = ptr ^ (ptr >> 12);
        &self.shards[mixed % self.shards.len()]
    }

    /// Record a freshly-allocated pointer's header. Overwrites any stale
    /// entry left behind by a pointer that happened to be reused (the old
    /// entry would already have been removed by [`Self::unregister`]).
    pub fn register(&self, user_ptr: usize, size: usize, owner_region: u64, type_info: Option<TypeInfo>) {
        let header = BlockHeader::new(size, owner_region, type_info);
        self.shard_for(user_ptr).write().table.insert(user_ptr, header);
    }

    /// Look up a pointer's header without removing it.
    pub fn lookup(&self, user_ptr: usize) -> Option<BlockHeader> {
        self.shard_for(user_ptr).read().table.get(&user_ptr).copied()
    }

    /// Validate and remove a pointer's header, as part of freeing it.
    /// Returns [`MemError::InvalidPointer`] if the pointer is unknown and
    /// [`MemError::CorruptedHeader`] if its magic has been clobbered.
    pub fn unregister(&self, user_ptr: usize, owner_region: u64) -> Result<BlockHeader, MemError> {
        let mut shard = self.shard_for(user_ptr).write();
        let header = shard
            .table
            .remove(&user_ptr)
            .ok_or(MemError::InvalidPointer(user_ptr))?;
        if !header.is_magic_valid() {
            return Err(MemError::CorruptedHeader(owner_region));
        }
        Ok(header)
    }

    /// Rewrite a pointer's registry key after [`crate::region::Region::compact`]
    /// moves it, preserving the header contents.
    pub fn rekey(&self, old_ptr: usize, new_ptr: usize) {
        let header = match self.shard_for(old_ptr).write().table.remove(&old_ptr) {
            Some(h) => h,
            None => return,
        };
        self.shard_for(new_ptr).write().table.insert(new_ptr, header);
    }

    /// Whether the allocation at `user_ptr` must stay put during
    /// compaction (per [`TypeInfo::is_pinned`]). Unknown pointers are
    /// treated as pinned, since moving something we can't account for is
    /// strictly worse than leaving a hole.
    pub fn is_pinned(&self, user_ptr: usize) -> bool {
        match self.lookup(user_ptr) {
            Some(header) => header.type_info.map(|ti| ti.is_pinned()).unwrap_or(false),
            None => true,
        }
    }

    /// `debugPostAllocValidate`: asserts the mapping exists, the magic
    /// matches, and the recorded size is at least `requested`. Debug-only
    /// (fatal via `debug_assert!` rather than a returned error, matching
    /// the invariant's "debug mode" framing).
    pub fn debug_post_alloc_validate(&self, user_ptr: usize, requested: usize) {
        if cfg!(debug_assertions) {
            let header = self.lookup(user_ptr);
            debug_assert!(header.is_some(), "allocation not registered in BlockManager");
            if let Some(header) = header {
                debug_assert!(header.is_magic_valid(), "block header magic corrupted");
                debug_assert!(header.size >= requested, "recorded size smaller than requested");
            }
        }
    }

    pub fn live_count(&self) -> usize {
        self.shards.iter().map(|s| s.read().table.len()).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn register_then_lookup_roundtrips() {
        let mgr = BlockManager::new();
        mgr.register(0x1000, 64, 7, None);
        let header = mgr.lookup(0x1000).expect("registered");
        assert_eq!(header.size, 64);
        assert_eq!(header.owner_region, 7);
    }

    #[test]
    fn unregister_unknown_pointer_is_invalid() {
        let mgr = BlockManager::new();
        let err = mgr.unregister(0xdead, 1).unwrap_err();
        assert!(matches!(err, MemError::InvalidPointer(_)));
    }

    #[test]
    fn rekey_preserves_header_under_new_address() {
        let mgr = BlockManager::new();
        mgr.register(0x2000, 128, 3, None);
        mgr.rekey(0x2000, 0x3000);
        assert!(mgr.lookup(0x2000).is_none());
        assert_eq!(mgr.lookup(0x3000).unwrap().size, 128);
    }

    #[test]
    fn unknown_pointer_is_treated_as_pinned() {
        let mgr = BlockManager::new();
        assert!(mgr.is_pinned(0x9999));
    }

    #[test]
    fn live_count_tracks_register_and_unregister() {
        let mgr = BlockManager::new();
        mgr.register(0x10, 8, 1, None);
        mgr.register(0x20, 8, 1, None);
        assert_eq!(mgr.live_count(), 2);
        mgr.unregister(0x10, 1).unwrap();
        assert_eq!(mgr.live_count(), 1);
    }
}

//! Process-wide allocator statistics, exposed read-only via
//! [`crate::allocator::RegionAllocator::stats`].

// Layer 1: Standard library imports
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Snapshot of allocator-wide counters at a point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub regions_active: usize,
    pub regions_freed: u64,
    pub total_memory: usize,
    pub peak_memory: usize,
    pub alloc_count: u64,
    pub free_count: u64,
}

/// Atomic counters backing [`StatsSnapshot`]. Lives on
/// [`crate::allocator::RegionAllocator`] and is updated after the
/// allocator's internal lock is released (observers and stats both read a
/// consistent-enough view without serializing on the hot path).
#[derive(Debug, Default)]
pub struct AllocatorStats {
    regions_active: AtomicUsize,
    regions_freed: AtomicU64,
    total_memory: AtomicUsize,
    peak_memory: AtomicUsize,
    alloc_count: AtomicU64,
    free_count: AtomicU64,
}

impl AllocatorStats {
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            regions_active: self.regions_active.load(Ordering::Relaxed),
            regions_freed: self.regions_freed.load(Ordering::Relaxed),
            total_memory: self.total_memory.load(Ordering::Relaxed),
            peak_memory: self.peak_memory.load(Ordering::Relaxed),
            alloc_count: self.alloc_count.load(Ordering::Relaxed),
            free_count: self.free_count.load(Ordering::Relaxed),
        }
    }

    pub fn on_region_created(&self, size: usize) {
        self.regions_active.fetch_add(1, Ordering::Relaxed);
        let new_total = self.total_memory.fetch_add(size, Ordering::Relaxed) + size;
        self.bump_peak(new_total);
    }

    pub fn on_region_freed(&self, size: usize) {
        self.regions_active.fetch_sub(1, Ordering::Relaxed);
        self.regions_freed.fetch_add(1, Ordering::Relaxed);
        self.total_memory.fetch_sub(size, Ordering::Relaxed);
    }

    pub fn on_alloc(&self) {
        self.alloc_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn on_free(&self) {
        self.free_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total_memory(&self) -> usize {
        self.total_memory.load(Ordering::Relaxed)
    }

    pub fn regions_active(&self) -> usize {
        self.regions_active.load(Ordering::Relaxed)
    }

    /// Monotonic CAS retry loop so `peak_memory` never regresses even under
    /// concurrent updates.
    fn bump_peak(&self, candidate: usize) {
        let mut current = self.peak_memory.load(Ordering::Relaxed);
        while candidate > current {
            match self.peak_memory.compare_exchange_weak(
                current,
                candidate,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(observed) => current = observed,
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn peak_memory_is_monotonic_under_growth_and_shrink() {
        let stats = AllocatorStats::default();
        stats.on_region_created(1024);
        stats.on_region_created(2048);
        assert_eq!(stats.snapshot().peak_memory, 3072);
        stats.on_region_freed(2048);
        assert_eq!(stats.snapshot().peak_memory, 3072, "peak must not regress");
        assert_eq!(stats.snapshot().total_memory, 1024);
    }
}

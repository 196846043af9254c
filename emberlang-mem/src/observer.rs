//! Observer hooks fired by [`crate::allocator::RegionAllocator`] and
//! [`crate::region::Region`] after their internal locks are released, so
//! observers can never re-enter the mutating operation's lock (§5 ordering
//! guarantees).

use crate::error::RegionId;

/// A snapshot of a region's free-list shape before/after a compaction pass.
#[derive(Debug, Clone, Copy)]
pub struct CompactionReport {
    pub region: RegionId,
    pub used_before: usize,
    pub free_before: usize,
    pub largest_free_before: usize,
    pub used_after: usize,
    pub free_after: usize,
    pub largest_free_after: usize,
}

/// Observer interface for allocator lifecycle events. Dynamic dispatch here
/// is deliberate (Design Notes §9): observers are registered and removed at
/// runtime and the allocator has no compile-time knowledge of how many
/// distinct observer types exist.
pub trait AllocatorObserver: Send + Sync {
    /// A region finished a `compact()` pass.
    fn on_compaction(&self, _report: CompactionReport) {}

    /// A region was created (fresh or reused from the pool).
    fn on_region_created(&self, _region: RegionId) {}

    /// A region was returned to the free pool or destroyed.
    fn on_region_freed(&self, _region: RegionId) {}

    /// A region-fatal error occurred (canary mismatch, corrupted header).
    fn on_error(&self, _region: RegionId, _message: &str) {}
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
pub(crate) mod test_support {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct RecordingObserver {
        pub events: Mutex<Vec<String>>,
    }

    impl AllocatorObserver for RecordingObserver {
        fn on_compaction(&self, report: CompactionReport) {
            self.events
                .lock()
                .unwrap()
                .push(format!("compaction:{}", report.region));
        }

        fn on_region_created(&self, region: RegionId) {
            self.events.lock().unwrap().push(format!("created:{region}"));
        }

        fn on_region_freed(&self, region: RegionId) {
            self.events.lock().unwrap().push(format!("freed:{region}"));
        }

        fn on_error(&self, region: RegionId, message: &str) {
            self.events
                .lock()
                .unwrap()
                .push(format!("error:{region}:{message}"));
        }
    }
}

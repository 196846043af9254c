//! [`RegionAllocator`]: the facade that ties together region pooling,
//! cross-region pointer lookup, statistics, and observer notification.
//!
//! Lock discipline mirrors the teacher crate's dispatcher/scheduler split:
//! a region's own mutex is held only for the duration of the single
//! operation mutating it, and observers are always notified *after* that
//! lock is released (§5), so a misbehaving observer can never deadlock an
//! allocation.

// Layer 1: Standard library imports
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

// Layer 2: Third-party crate imports
use parking_lot::{Mutex, RwLock};
use tracing::{info, instrument};

// Layer 3: Internal module imports
use crate::block::TypeInfo;
use crate::block_manager::BlockManager;
use crate::error::{MemError, RegionId};
use crate::observer::AllocatorObserver;
use crate::page_source::{PageSource, SystemPageSource};
use crate::policy::RegionPolicy;
use crate::region::Region;
use crate::stats::{AllocatorStats, StatsSnapshot};

/// Smallest buffer a freshly-grown region is backed by; regions requested
/// smaller than this still get a full page, since most `PageSource`
/// implementations cannot usefully hand back less.
const MIN_REGION_SIZE: usize = 4096;

/// Config accepted by [`RegionAllocator::new`]. Fields not yet wired to
/// distinct behavior (see [`crate::policy::CompactionStrategyType`] and
/// [`crate::policy::GrowthStrategy`] docs) are still stored and honored at
/// the "falls back to the default" level.
#[derive(Clone)]
pub struct RegionAllocatorConfig {
    pub default_policy: RegionPolicy,
    /// Cap on how many released regions are kept in the reuse pool before
    /// their buffers are handed back to the `PageSource`.
    pub max_pooled_regions: usize,
}

impl Default for RegionAllocatorConfig {
    fn default() -> Self {
        Self {
            default_policy: RegionPolicy::default(),
            max_pooled_regions: 8,
        }
    }
}

/// Process-wide memory allocator: a pool of [`Region`]s, a shared
/// [`BlockManager`] for pointer lookup, and allocator-wide stats/observers.
pub struct RegionAllocator {
    page_source: Arc<dyn PageSource>,
    config: RegionAllocatorConfig,
    regions: RwLock<HashMap<RegionId, Mutex<Region>>>,
    /// Freed regions awaiting reuse (per §4.2's `resetRegion` reuse rule),
    /// keyed by nothing in particular — `create_region` does a linear scan
    /// for the first region whose `total_size` covers the request.
    pool: Mutex<Vec<Region>>,
    block_manager: BlockManager,
    stats: AllocatorStats,
    observers: RwLock<Vec<Arc<dyn AllocatorObserver>>>,
    next_id: AtomicU64,
}

impl RegionAllocator {
    pub fn new(config: RegionAllocatorConfig) -> Self {
        Self::with_page_source(config, Arc::new(SystemPageSource))
    }

    pub fn with_page_source(config: RegionAllocatorConfig, page_source: Arc<dyn PageSource>) -> Self {
        Self {
            page_source,
            config,
            regions: RwLock::new(HashMap::new()),
            pool: Mutex::new(Vec::new()),
            block_manager: BlockManager::new(),
            stats: AllocatorStats::default(),
            observers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn register_observer(&self, observer: Arc<dyn AllocatorObserver>) {
        self.observers.write().push(observer);
    }

    fn notify<F: Fn(&dyn AllocatorObserver)>(&self, f: F) {
        for observer in self.observers.read().iter() {
            f(observer.as_ref());
        }
    }

    /// Create a new region able to hold at least `min_size` bytes, reusing
    /// a pooled `Freed` region of sufficient capacity via `resetRegion`
    /// when one is available; otherwise allocates fresh backing via the
    /// `PageSource`.
    #[instrument(skip(self, policy))]
    pub fn create_region(&self, min_size: usize, policy: Option<RegionPolicy>) -> Result<RegionId, MemError> {
        let policy = policy.unwrap_or(self.config.default_policy);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        let region = match self.take_pooled(min_size) {
            Some(mut region) => {
                region.reset(policy);
                region.set_id(id);
                region
            }
            None => {
                // Exponential growth: round up to the next power of two,
                // never below the page-sized floor.
                let grown = min_size.max(MIN_REGION_SIZE).next_power_of_two();
                let buffer = self
                    .page_source
                    .acquire(grown, 16)
                    .map_err(|e| MemError::PageSourceFailed(e.to_string()))?;
                Region::new(id, buffer, policy)
            }
        };
        let total = region.header.total_size;

        self.regions.write().insert(id, Mutex::new(region));
        self.stats.on_region_created(total);
        self.notify(|o| o.on_region_created(id));
        info!(region = id, size = total, "region created");
        Ok(id)
    }

    fn take_pooled(&self, min_size: usize) -> Option<Region> {
        let mut pool = self.pool.lock();
        let slot = pool.iter().position(|r| r.header.total_size >= min_size)?;
        Some(pool.remove(slot))
    }

    /// Tear down a region: any blocks still registered under it are dropped
    /// from the `BlockManager` without being individually freed (the whole
    /// backing buffer is reclaimed at once). Per Design Notes §9's Open
    /// Question (a), a region that does not fit in the reuse pool has its
    /// buffer released via `PageSource.release` rather than discarded.
    #[instrument(skip(self))]
    pub fn destroy_region(&self, id: RegionId) -> Result<(), MemError> {
        let region_lock = self
            .regions
            .write()
            .remove(&id)
            .ok_or(MemError::NotFound(id))?;
        let mut region = region_lock.into_inner();
        let total = region.header.total_size;

        self.stats.on_region_freed(total);
        self.notify(|o| o.on_region_freed(id));

        region.mark_freed();
        let mut pool = self.pool.lock();
        if pool.len() < self.config.max_pooled_regions {
            pool.push(region);
        } else {
            drop(pool);
            self.page_source.release(region.into_buffer());
        }
        Ok(())
    }

    pub fn allocate(
        &self,
        region_id: RegionId,
        size: usize,
        alignment: usize,
        type_info: Option<TypeInfo>,
    ) -> Result<usize, MemError> {
        let regions = self.regions.read();
        let region_lock = regions.get(&region_id).ok_or(MemError::NotFound(region_id))?;
        let user_ptr = region_lock.lock().allocate(size, alignment, type_info)?;
        drop(regions);

        self.block_manager.register(user_ptr, size, region_id, type_info);
        self.block_manager.debug_post_alloc_validate(user_ptr, size);
        self.stats.on_alloc();
        Ok(user_ptr)
    }

    pub fn free(&self, user_ptr: usize) -> Result<(), MemError> {
        let header = self
            .block_manager
            .lookup(user_ptr)
            .ok_or(MemError::InvalidPointer(user_ptr))?;

        let regions = self.regions.read();
        let region_lock = regions
            .get(&header.owner_region)
            .ok_or(MemError::NotFound(header.owner_region))?;
        let result = region_lock.lock().deallocate(user_ptr, header.size);
        drop(regions);

        if let Err(err) = &result {
            self.notify(|o| o.on_error(header.owner_region, &err.to_string()));
        }
        result?;

        self.block_manager.unregister(user_ptr, header.owner_region)?;
        self.stats.on_free();
        Ok(())
    }

    /// Compact a single region, rewriting the `BlockManager` entries for
    /// every relocated allocation.
    #[instrument(skip(self))]
    pub fn compact_region(&self, region_id: RegionId) -> Result<(), MemError> {
        let regions = self.regions.read();
        let region_lock = regions.get(&region_id).ok_or(MemError::NotFound(region_id))?;
        let (moves, report) = region_lock
            .lock()
            .compact(|ptr| self.block_manager.is_pinned(ptr))?;
        drop(regions);

        for (old_ptr, new_ptr) in moves {
            self.block_manager.rekey(old_ptr, new_ptr);
        }
        self.notify(|o| o.on_compaction(report));
        Ok(())
    }

    pub fn fragmentation_ratio(&self, region_id: RegionId) -> Result<f64, MemError> {
        let regions = self.regions.read();
        let region_lock = regions.get(&region_id).ok_or(MemError::NotFound(region_id))?;
        Ok(region_lock.lock().fragmentation_ratio())
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn live_allocation_count(&self) -> usize {
        self.block_manager.live_count()
    }
}

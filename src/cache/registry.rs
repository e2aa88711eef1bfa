//! Cache Registry Module
//!
//! Shared byte budget, active-cache membership and the global byte counter
//! for one pool of caches.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use chrono::Utc;
use dashmap::DashMap;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::instance::CacheCore;
use crate::cache::{eviction, PoolSnapshot};
use crate::error::{PoolError, Result};

// == Cache Id ==
/// Registry-assigned identity of a cache.
///
/// Two caches with the same name are still distinct participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CacheId(u64);

impl CacheId {
    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Numeric value of the id.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CacheId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cache-{}", self.0)
    }
}

// == Cache Registry ==
/// Process-wide state shared by every cache of a pool.
///
/// Membership holds only weak handles: an active cache that is dropped
/// leaves the registry on its own. Per-cache contents are guarded by each
/// cache's own lock; the registry itself only uses atomics and a concurrent
/// map.
#[derive(Debug)]
pub struct CacheRegistry {
    /// Caches that currently hold (or have admitted) entries
    active: DashMap<CacheId, Weak<CacheCore>>,
    /// Shared byte budget
    capacity: AtomicU64,
    /// Sum of the byte totals of all active caches
    bytes_in_global_cache: AtomicU64,
    /// Source of cache ids
    next_id: AtomicU64,
}

impl CacheRegistry {
    // == Constructor ==
    /// Creates a registry with `capacity` bytes shared by all of its caches.
    ///
    /// # Errors
    /// Returns `InvalidCapacity` when `capacity` is zero.
    pub fn new(capacity: u64) -> Result<Arc<Self>> {
        validate_capacity(capacity)?;
        info!(capacity, "Cache registry created");

        Ok(Arc::new(Self {
            active: DashMap::new(),
            capacity: AtomicU64::new(capacity),
            bytes_in_global_cache: AtomicU64::new(0),
            next_id: AtomicU64::new(1),
        }))
    }

    /// Shared byte budget.
    pub fn capacity(&self) -> u64 {
        self.capacity.load(Ordering::Acquire)
    }

    /// Replaces the shared byte budget.
    ///
    /// Caches are trimmed lazily: each shrinks to the new fair share on its
    /// next put, or immediately through [`CacheRegistry::rebalance`].
    pub fn set_capacity(&self, capacity: u64) -> Result<()> {
        validate_capacity(capacity)?;
        let previous = self.capacity.swap(capacity, Ordering::AcqRel);
        info!(previous, capacity, "Cache registry capacity changed");
        Ok(())
    }

    /// Number of caches currently active.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Target size of every active cache: `capacity / max(1, active)`.
    pub fn fair_share(&self) -> u64 {
        let active = self.active_count().max(1) as u64;
        self.capacity() / active
    }

    /// Bytes held across all active caches.
    pub fn bytes_in_global_cache(&self) -> u64 {
        self.bytes_in_global_cache.load(Ordering::Acquire)
    }

    /// Takes a registry-wide snapshot.
    pub fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            active_caches: self.active_count(),
            bytes_in_global_cache: self.bytes_in_global_cache(),
            global_capacity: self.capacity(),
            fair_share: self.fair_share(),
            captured_at: Utc::now(),
        }
    }

    // == Rebalance ==
    /// Trims every active cache down to the current fair share.
    ///
    /// Returns the number of evicted entries.
    pub fn rebalance(&self) -> u64 {
        eviction::evict_all_fairly(self)
    }

    // == Reset All ==
    /// Empties every active cache, forgets all membership and zeroes both the
    /// global counter and the capacity.
    ///
    /// Administrative operation: until [`CacheRegistry::set_capacity`] is
    /// called again, every non-empty put is rejected.
    pub fn reset_all(&self) {
        // Zero the budget first so concurrent puts are refused while clearing.
        self.capacity.store(0, Ordering::Release);

        let caches = self.live_members();
        warn!(active = caches.len(), "Resetting cache registry");

        for core in &caches {
            core.clear();
        }
    }

    pub(crate) fn allocate_id(&self) -> CacheId {
        CacheId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Adds `cache` to the active set.
    ///
    /// Returns true only for the call that actually inserted it, so exactly
    /// one caller becomes responsible for the rebalance that follows a join.
    pub(crate) fn register(&self, id: CacheId, cache: Weak<CacheCore>) -> bool {
        let joined = self.active.insert(id, cache).is_none();
        if joined {
            debug!(cache = %id, active = self.active_count(), "Cache joined registry");
        }
        joined
    }

    pub(crate) fn unregister(&self, id: CacheId) {
        if self.active.remove(&id).is_some() {
            debug!(cache = %id, active = self.active_count(), "Cache left registry");
        }
    }

    pub(crate) fn add_global_bytes(&self, bytes: u64) {
        self.bytes_in_global_cache.fetch_add(bytes, Ordering::AcqRel);
    }

    pub(crate) fn sub_global_bytes(&self, bytes: u64) {
        self.bytes_in_global_cache.fetch_sub(bytes, Ordering::AcqRel);
    }

    /// Strong handles to the active caches, ordered by id.
    ///
    /// Handles are collected before any of them can be dropped, so a cache
    /// whose last owner goes away meanwhile never unregisters itself while
    /// the map is being iterated.
    pub(crate) fn live_members(&self) -> Vec<Arc<CacheCore>> {
        let mut caches: Vec<Arc<CacheCore>> = self
            .active
            .iter()
            .filter_map(|entry| entry.value().upgrade())
            .collect();
        caches.sort_by_key(|core| core.id());
        caches
    }
}

fn validate_capacity(capacity: u64) -> Result<()> {
    if capacity == 0 {
        return Err(PoolError::InvalidCapacity(
            "capacity must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

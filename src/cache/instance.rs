//! Shared Cache Module
//!
//! A named LRU byte cache that draws from its registry's shared budget.

use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use tracing::debug;

use crate::cache::eviction::{evict_all_fairly, evict_one};
use crate::cache::{CacheCounters, CacheId, CacheRegistry, CacheStatistics, EntryStore};

// == Cache State ==
/// Contents of a cache, guarded by the cache's own lock.
#[derive(Debug, Default)]
pub(crate) struct CacheState {
    pub(crate) store: EntryStore,
    pub(crate) counters: CacheCounters,
    /// Whether the cache is a member of the registry's active set
    pub(crate) active: bool,
}

impl CacheState {
    pub(crate) fn debug_check_invariants(&self) {
        debug_assert_eq!(
            self.store.bytes(),
            self.store.recount(),
            "byte total drifted from stored payloads"
        );
        debug_assert!(
            self.active || self.store.is_empty(),
            "inactive cache still holds entries"
        );
    }
}

// == Cache Core ==
/// Shared part of a cache; the registry holds weak handles to it.
#[derive(Debug)]
pub(crate) struct CacheCore {
    id: CacheId,
    name: String,
    registry: Arc<CacheRegistry>,
    state: Mutex<CacheState>,
}

impl CacheCore {
    pub(crate) fn id(&self) -> CacheId {
        self.id
    }

    /// Locks this cache and trims it to the current fair share.
    pub(crate) fn evict_to_fair_share(&self) -> u64 {
        let mut state = self.state.lock();
        evict_one(self.id, &mut state, &self.registry)
    }

    /// Locks this cache, drops its contents and leaves the active set.
    pub(crate) fn clear(&self) {
        let mut state = self.state.lock();
        release(self.id, &mut state, &self.registry);
    }
}

impl Drop for CacheCore {
    fn drop(&mut self) {
        let Self {
            id,
            registry,
            state,
            ..
        } = self;
        release(*id, state.get_mut(), registry);
    }
}

fn release(id: CacheId, state: &mut CacheState, registry: &CacheRegistry) {
    let released = state.store.clear();
    registry.sub_global_bytes(released);

    if state.active {
        state.active = false;
        registry.unregister(id);
    }
    state.debug_check_invariants();
}

// == Shared Cache ==
/// Handle to one cache of a pool.
///
/// Clones share the same cache. The cache is inactive until its first put,
/// which adds it to the registry and shrinks every other member's fair share.
///
/// # Example
/// ```
/// use fairshare_cache::{CacheRegistry, SharedCache};
///
/// let registry = CacheRegistry::new(1000).unwrap();
/// let cache = SharedCache::new(&registry, "templates");
///
/// cache.put("a", vec![0u8; 50]);
/// assert_eq!(cache.get("a").map(|v| v.len()), Some(50));
/// assert_eq!(cache.bytes_in_cache(), 50);
/// ```
#[derive(Debug, Clone)]
pub struct SharedCache {
    core: Arc<CacheCore>,
}

impl SharedCache {
    // == Constructor ==
    /// Creates an empty, inactive cache in `registry`.
    ///
    /// `name` is only a label for logs and statistics; identity comes from
    /// the registry-assigned [`CacheId`].
    pub fn new(registry: &Arc<CacheRegistry>, name: impl Into<String>) -> Self {
        let core = CacheCore {
            id: registry.allocate_id(),
            name: name.into(),
            registry: Arc::clone(registry),
            state: Mutex::new(CacheState::default()),
        };
        Self {
            core: Arc::new(core),
        }
    }

    /// Registry-assigned identity.
    pub fn id(&self) -> CacheId {
        self.core.id
    }

    /// Label given at construction.
    pub fn name(&self) -> &str {
        &self.core.name
    }

    /// Registry this cache draws its budget from.
    pub fn registry(&self) -> &Arc<CacheRegistry> {
        &self.core.registry
    }

    // == Get ==
    /// Retrieves a copy of the payload stored under `key`.
    ///
    /// A hit promotes the key to most recently used.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        let mut state = self.core.state.lock();
        let found = state.store.get(key).map(<[u8]>::to_vec);

        if found.is_some() {
            state.counters.record_hit();
        } else {
            state.counters.record_miss();
        }
        found
    }

    // == Put ==
    /// Stores `payload` under `key`.
    ///
    /// The first put on an inactive cache joins the registry and then
    /// rebalances every active cache to the smaller fair share. A payload
    /// larger than the fair share is dropped without any signal to the
    /// caller. After an insert the cache trims itself back under its share.
    pub fn put(&self, key: impl Into<String>, payload: impl Into<Vec<u8>>) {
        let key = key.into();
        let payload = payload.into();
        let registry = &self.core.registry;
        let id = self.core.id;

        let joined = {
            let mut state = self.core.state.lock();

            let joined = !state.active && {
                state.active = true;
                registry.register(id, Arc::downgrade(&self.core))
            };

            let per_cache_capacity = registry.fair_share();
            let len = payload.len() as u64;

            if len > per_cache_capacity {
                state.counters.record_rejection();
                debug!(
                    cache = %id,
                    key = %key,
                    bytes = len,
                    per_cache_capacity,
                    "Rejected payload larger than fair share"
                );
            } else {
                if let Some(replaced) = state.store.insert(key, payload) {
                    registry.sub_global_bytes(replaced);
                }
                registry.add_global_bytes(len);
                evict_one(id, &mut state, registry);
            }

            joined
        };

        // Runs without holding this cache's lock; the pass locks each member in turn.
        if joined {
            evict_all_fairly(registry);
        }
    }

    // == Remove ==
    /// Removes `key`, returning its payload. The cache stays active.
    pub fn remove(&self, key: &str) -> Option<Vec<u8>> {
        let mut state = self.core.state.lock();
        let removed = state.store.remove(key)?;
        self.core.registry.sub_global_bytes(removed.len() as u64);
        state.debug_check_invariants();
        Some(removed)
    }

    // == Clear ==
    /// Drops every entry and leaves the registry's active set.
    ///
    /// The next put rejoins and triggers a rebalance again. Clearing an
    /// already inactive cache has no effect.
    pub fn clear(&self) {
        self.core.clear();
    }

    // == Statistics ==
    /// Returns a consistent snapshot of this cache and its registry.
    pub fn statistics(&self) -> CacheStatistics {
        let state = self.core.state.lock();
        let registry = &self.core.registry;

        CacheStatistics {
            cache_id: self.core.id,
            name: self.core.name.clone(),
            active_caches: registry.active_count(),
            entries: state.store.len(),
            bytes_in_cache: state.store.bytes(),
            bytes_in_global_cache: registry.bytes_in_global_cache(),
            global_capacity: registry.capacity(),
            counters: state.counters,
            captured_at: Utc::now(),
        }
    }

    /// Checks for `key` without promoting it.
    pub fn contains_key(&self, key: &str) -> bool {
        self.core.state.lock().store.contains(key)
    }

    /// Keys from least to most recently used.
    pub fn keys(&self) -> Vec<String> {
        self.core.state.lock().store.keys()
    }

    /// Bytes currently held by this cache.
    pub fn bytes_in_cache(&self) -> u64 {
        self.core.state.lock().store.bytes()
    }

    /// Whether this cache is a member of the registry's active set.
    pub fn is_active(&self) -> bool {
        self.core.state.lock().active
    }

    // == Length ==
    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.core.state.lock().store.len()
    }

    // == Is Empty ==
    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.core.state.lock().store.is_empty()
    }
}

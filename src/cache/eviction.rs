//! Eviction Policy Module
//!
//! Keeps every active cache at or below its fair share of the registry
//! capacity, removing least recently used entries first.

use tracing::debug;

use crate::cache::instance::CacheState;
use crate::cache::{CacheId, CacheRegistry};

// == Evict One ==
/// Trims a single cache down to the current fair share.
///
/// The caller must hold the cache's lock (`state` is its guarded content).
/// Returns the number of evicted entries.
pub(crate) fn evict_one(id: CacheId, state: &mut CacheState, registry: &CacheRegistry) -> u64 {
    let target = registry.fair_share();
    let mut evicted = 0u64;

    while state.store.bytes() > target {
        let Some((key, payload)) = state.store.pop_lru() else {
            break;
        };
        registry.sub_global_bytes(payload.len() as u64);
        evicted += 1;
        debug!(cache = %id, key = %key, bytes = payload.len(), target, "Evicted entry");
    }

    if evicted > 0 {
        state.counters.record_evictions(evicted);
    }
    state.debug_check_invariants();
    evicted
}

// == Evict All Fairly ==
/// Runs [`evict_one`] over every active cache, in ascending id order.
///
/// Each cache's own lock is taken while it is trimmed and released before
/// moving on; no two cache locks are ever held together. Returns the total
/// number of evicted entries.
pub(crate) fn evict_all_fairly(registry: &CacheRegistry) -> u64 {
    let caches = registry.live_members();
    let mut evicted = 0u64;

    for core in &caches {
        evicted += core.evict_to_fair_share();
    }

    debug!(
        caches = caches.len(),
        evicted,
        fair_share = registry.fair_share(),
        "Rebalanced registry"
    );
    evicted
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use crate::cache::{CacheRegistry, SharedCache};

    #[test]
    fn test_evict_one_trims_lru_first() {
        let registry = CacheRegistry::new(100).unwrap();
        let cache = SharedCache::new(&registry, "trim");

        cache.put("a", vec![0; 40]);
        cache.put("b", vec![0; 40]);
        cache.get("a");
        // 40 + 40 + 40 > 100: the least recently used entry is "b"
        cache.put("c", vec![0; 40]);

        assert_eq!(cache.keys(), vec!["a", "c"]);
        assert_eq!(cache.bytes_in_cache(), 80);
        assert_eq!(registry.bytes_in_global_cache(), 80);
        assert_eq!(cache.statistics().counters.evictions, 1);
    }

    #[test]
    fn test_evict_all_fairly_on_capacity_drop() {
        let registry = CacheRegistry::new(400).unwrap();
        let first = SharedCache::new(&registry, "first");
        let second = SharedCache::new(&registry, "second");

        first.put("a", vec![0; 100]);
        first.put("b", vec![0; 100]);
        second.put("c", vec![0; 150]);
        assert_eq!(registry.bytes_in_global_cache(), 350);

        registry.set_capacity(200).unwrap();
        let evicted = registry.rebalance();

        assert_eq!(evicted, 2);
        assert_eq!(first.keys(), vec!["b"]);
        assert!(second.is_empty());
        assert!(second.is_active());
        assert_eq!(registry.bytes_in_global_cache(), 100);
    }

    #[test]
    fn test_evict_all_fairly_with_no_members() {
        let registry = CacheRegistry::new(100).unwrap();
        assert_eq!(registry.rebalance(), 0);
    }
}

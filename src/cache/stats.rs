//! Cache Statistics Module
//!
//! Per-cache counters plus the immutable snapshots read for monitoring.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::CacheId;

// == Cache Counters ==
/// Tracks per-cache activity counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheCounters {
    /// Number of successful lookups
    pub hits: u64,
    /// Number of lookups for absent keys
    pub misses: u64,
    /// Number of entries removed by the eviction policy
    pub evictions: u64,
    /// Number of puts dropped by admission control
    pub rejections: u64,
}

impl CacheCounters {
    // == Constructor ==
    /// Creates counters with all values at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Evictions ==
    /// Adds `count` evicted entries.
    pub fn record_evictions(&mut self, count: u64) {
        self.evictions += count;
    }

    // == Record Rejection ==
    /// Increments the admission rejection counter.
    pub fn record_rejection(&mut self) {
        self.rejections += 1;
    }
}

// == Cache Statistics ==
/// Point-in-time view of one cache and the registry it belongs to.
///
/// Captured under the cache's own lock, so it never straddles an eviction
/// on that cache.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatistics {
    /// Identity of the cache within its registry
    pub cache_id: CacheId,
    /// Human readable label
    pub name: String,
    /// Number of caches currently active in the registry
    pub active_caches: usize,
    /// Entries held by this cache
    pub entries: usize,
    /// Bytes held by this cache
    pub bytes_in_cache: u64,
    /// Bytes held by every active cache of the registry
    pub bytes_in_global_cache: u64,
    /// Byte budget shared by the registry
    pub global_capacity: u64,
    /// Activity counters of this cache
    pub counters: CacheCounters,
    /// When the snapshot was taken
    pub captured_at: DateTime<Utc>,
}

impl CacheStatistics {
    /// Fair share of the global capacity, or 0 when no cache is active.
    pub fn per_cache_capacity(&self) -> u64 {
        per_cache_capacity(self.global_capacity, self.active_caches)
    }

    /// This cache's bytes as a percentage of its fair share.
    pub fn utilization_percent(&self) -> f64 {
        percent(self.bytes_in_cache, self.per_cache_capacity())
    }

    /// Global bytes as a percentage of the global capacity.
    pub fn global_utilization_percent(&self) -> f64 {
        percent(self.bytes_in_global_cache, self.global_capacity)
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.counters.hits + self.counters.misses;
        if total == 0 {
            0.0
        } else {
            self.counters.hits as f64 / total as f64
        }
    }
}

// == Pool Snapshot ==
/// Point-in-time view of a whole registry.
#[derive(Debug, Clone, Serialize)]
pub struct PoolSnapshot {
    /// Number of caches currently active
    pub active_caches: usize,
    /// Bytes held by every active cache
    pub bytes_in_global_cache: u64,
    /// Shared byte budget
    pub global_capacity: u64,
    /// Current target size of each active cache
    pub fair_share: u64,
    /// When the snapshot was taken
    pub captured_at: DateTime<Utc>,
}

impl PoolSnapshot {
    /// Global bytes as a percentage of the global capacity.
    pub fn global_utilization_percent(&self) -> f64 {
        percent(self.bytes_in_global_cache, self.global_capacity)
    }
}

fn per_cache_capacity(global_capacity: u64, active_caches: usize) -> u64 {
    if active_caches == 0 {
        0
    } else {
        global_capacity / active_caches as u64
    }
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn statistics(active: usize, this: u64, global: u64, capacity: u64) -> CacheStatistics {
        CacheStatistics {
            cache_id: CacheId::from_raw(1),
            name: "test".to_string(),
            active_caches: active,
            entries: 0,
            bytes_in_cache: this,
            bytes_in_global_cache: global,
            global_capacity: capacity,
            counters: CacheCounters::new(),
            captured_at: Utc::now(),
        }
    }

    #[test]
    fn test_counters_new() {
        let counters = CacheCounters::new();
        assert_eq!(counters.hits, 0);
        assert_eq!(counters.misses, 0);
        assert_eq!(counters.evictions, 0);
        assert_eq!(counters.rejections, 0);
    }

    #[test]
    fn test_counters_record() {
        let mut counters = CacheCounters::new();
        counters.record_hit();
        counters.record_hit();
        counters.record_miss();
        counters.record_evictions(3);
        counters.record_rejection();

        assert_eq!(counters.hits, 2);
        assert_eq!(counters.misses, 1);
        assert_eq!(counters.evictions, 3);
        assert_eq!(counters.rejections, 1);
    }

    #[test]
    fn test_full_utilization() {
        let stats = statistics(3, 100, 300, 300);
        assert_eq!(stats.per_cache_capacity(), 100);
        assert_eq!(stats.utilization_percent(), 100.0);
        assert_eq!(stats.global_utilization_percent(), 100.0);
    }

    #[test]
    fn test_partial_utilization() {
        let stats = statistics(4, 60, 60, 300);
        assert_eq!(stats.per_cache_capacity(), 75);
        assert_eq!(stats.utilization_percent(), 80.0);
        assert_eq!(stats.global_utilization_percent(), 20.0);
    }

    #[test]
    fn test_degenerate_denominators_are_zero() {
        let stats = statistics(0, 0, 0, 1000);
        assert_eq!(stats.per_cache_capacity(), 0);
        assert_eq!(stats.utilization_percent(), 0.0);

        let stats = statistics(2, 0, 0, 0);
        assert_eq!(stats.per_cache_capacity(), 0);
        assert_eq!(stats.global_utilization_percent(), 0.0);
    }

    #[test]
    fn test_hit_rate() {
        let mut stats = statistics(1, 0, 0, 100);
        assert_eq!(stats.hit_rate(), 0.0);

        stats.counters.record_hit();
        stats.counters.record_miss();
        assert_eq!(stats.hit_rate(), 0.5);
    }

    #[test]
    fn test_snapshot_serializes() {
        let stats = statistics(1, 10, 10, 100);
        let json = serde_json::to_value(&stats).unwrap();

        assert_eq!(json["cache_id"], 1);
        assert_eq!(json["bytes_in_cache"], 10);
        assert_eq!(json["counters"]["hits"], 0);
    }

    #[test]
    fn test_pool_snapshot_utilization() {
        let snapshot = PoolSnapshot {
            active_caches: 2,
            bytes_in_global_cache: 50,
            global_capacity: 200,
            fair_share: 100,
            captured_at: Utc::now(),
        };
        assert_eq!(snapshot.global_utilization_percent(), 25.0);
    }
}

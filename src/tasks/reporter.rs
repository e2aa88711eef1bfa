//! Statistics Reporter Task
//!
//! Background task that periodically logs a snapshot of a cache registry.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheRegistry;

/// Spawns a background task that logs the registry snapshot every
/// `interval_secs` seconds.
///
/// The snapshot is logged at info level while any cache is active and at
/// debug level otherwise.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during shutdown.
///
/// # Example
/// ```ignore
/// let registry = CacheRegistry::new(1 << 20)?;
/// let reporter = spawn_stats_reporter(registry.clone(), 5);
/// // Later, during shutdown:
/// reporter.abort();
/// ```
pub fn spawn_stats_reporter(registry: Arc<CacheRegistry>, interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting stats reporter with interval of {} seconds",
            interval_secs
        );

        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let snapshot = registry.snapshot();
            let json = serde_json::to_string(&snapshot).unwrap_or_default();

            if snapshot.active_caches > 0 {
                info!(
                    active = snapshot.active_caches,
                    bytes = snapshot.bytes_in_global_cache,
                    capacity = snapshot.global_capacity,
                    utilization = %format!("{:.1}%", snapshot.global_utilization_percent()),
                    "Pool stats: {}",
                    json
                );
            } else {
                debug!("Pool stats: no active caches");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::SharedCache;

    #[tokio::test]
    async fn test_reporter_keeps_running() {
        let registry = CacheRegistry::new(1000).unwrap();
        let cache = SharedCache::new(&registry, "reported");
        cache.put("a", vec![1u8; 10]);

        let handle = spawn_stats_reporter(registry.clone(), 1);

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!handle.is_finished(), "Reporter should still be running");

        handle.abort();
    }

    #[tokio::test]
    async fn test_reporter_does_not_touch_caches() {
        let registry = CacheRegistry::new(1000).unwrap();
        let cache = SharedCache::new(&registry, "untouched");
        cache.put("a", vec![1u8; 10]);

        let handle = spawn_stats_reporter(registry.clone(), 1);
        tokio::time::sleep(Duration::from_millis(1500)).await;
        handle.abort();

        assert_eq!(cache.bytes_in_cache(), 10);
        assert_eq!(cache.statistics().counters.hits, 0);
        assert_eq!(registry.active_count(), 1);
    }

    #[tokio::test]
    async fn test_reporter_can_be_aborted() {
        let registry = CacheRegistry::new(1000).unwrap();

        let handle = spawn_stats_reporter(registry, 1);

        // Abort immediately
        handle.abort();

        // Wait a bit and verify task is finished
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}

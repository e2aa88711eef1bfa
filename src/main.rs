//! Fairshare Cache - demo workload
//!
//! Drives several caches of one registry concurrently and reports how the
//! shared budget is split between them.

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fairshare_cache::{
    spawn_stats_reporter, CacheRegistry, CacheStatistics, PoolConfig, SharedCache,
};

/// Main entry point for the demo workload.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache registry with the configured capacity
/// 4. Start background stats reporter
/// 5. Run one workload per cache on blocking worker threads
/// 6. Log per-cache statistics, or stop early on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fairshare_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Fairshare Cache demo");

    let config = PoolConfig::from_env().context("loading configuration")?;
    info!(
        "Configuration loaded: capacity={}B, caches={}, operations={}, max_payload={}B, stats_interval={}s",
        config.global_capacity,
        config.demo_caches,
        config.demo_operations,
        config.demo_payload_bytes,
        config.stats_interval
    );

    let registry = CacheRegistry::new(config.global_capacity)?;
    let reporter = spawn_stats_reporter(registry.clone(), config.stats_interval);

    let workers: Vec<_> = (0..config.demo_caches)
        .map(|index| {
            let cache = SharedCache::new(&registry, format!("demo-{}", index));
            let operations = config.demo_operations;
            let max_payload = config.demo_payload_bytes;
            tokio::task::spawn_blocking(move || {
                run_workload(&cache, index, operations, max_payload)
            })
        })
        .collect();

    let workload = async {
        for worker in workers {
            let stats = worker.await.context("demo worker panicked")?;
            log_statistics(&stats);
        }
        Ok::<_, anyhow::Error>(())
    };

    tokio::select! {
        result = workload => result?,
        _ = shutdown_signal() => warn!("Workload interrupted"),
    }

    reporter.abort();

    let snapshot = registry.snapshot();
    info!(
        active = snapshot.active_caches,
        bytes = snapshot.bytes_in_global_cache,
        "Demo complete"
    );
    Ok(())
}

/// Mixed put/get traffic with a deterministic key and size pattern.
fn run_workload(
    cache: &SharedCache,
    seed: usize,
    operations: usize,
    max_payload: usize,
) -> CacheStatistics {
    let mut state = (seed as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15);

    for _ in 0..operations {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        let key = format!("key-{}", (state >> 33) % 1024);

        if state % 3 == 0 {
            cache.put(key, vec![seed as u8; (state >> 17) as usize % max_payload.max(1) + 1]);
        } else {
            cache.get(&key);
        }
    }

    cache.statistics()
}

fn log_statistics(stats: &CacheStatistics) {
    info!(
        cache = %stats.cache_id,
        name = %stats.name,
        entries = stats.entries,
        bytes = stats.bytes_in_cache,
        share = stats.per_cache_capacity(),
        hit_rate = %format!("{:.2}", stats.hit_rate()),
        evictions = stats.counters.evictions,
        rejections = stats.counters.rejections,
        "Cache finished"
    );
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, stopping...");
        }
        _ = terminate => {
            info!("Received SIGTERM, stopping...");
        }
    }
}

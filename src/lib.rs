//! Fairshare Cache - LRU byte caches sharing one memory budget
//!
//! Every cache created against a [`CacheRegistry`] draws from the same byte
//! capacity. When a cache becomes active the fair share of every member
//! shrinks and the pool is rebalanced.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{CacheId, CacheRegistry, CacheStatistics, PoolSnapshot, SharedCache};
pub use config::PoolConfig;
pub use error::{PoolError, Result};
pub use tasks::spawn_stats_reporter;

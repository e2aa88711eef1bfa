//! Cache Module
//!
//! A pool of LRU byte caches sharing one registry-wide byte budget. Each
//! active cache is kept at or below an equal share of that budget.

mod eviction;
mod instance;
mod registry;
mod stats;
mod store;


// Re-export public types
pub use instance::SharedCache;
pub use registry::{CacheId, CacheRegistry};
pub use stats::{CacheCounters, CacheStatistics, PoolSnapshot};
pub use store::EntryStore;

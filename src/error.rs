//! Error types for the cache pool
//!
//! Provides unified error handling using thiserror.
//!
//! Cache operations themselves never fail: an oversized payload is dropped by
//! admission control and a missing key is an empty result. Errors only arise
//! when a pool is configured.

use thiserror::Error;

// == Pool Error Enum ==
/// Unified error type for the cache pool.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// Global capacity is zero or otherwise unusable
    #[error("Invalid capacity: {0}")]
    InvalidCapacity(String),

    /// Environment configuration could not be parsed
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache pool.
pub type Result<T> = std::result::Result<T, PoolError>;

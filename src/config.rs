//! Configuration Module
//!
//! Handles loading and managing pool configuration from environment variables.

use std::env;
use std::str::FromStr;

use crate::error::{PoolError, Result};

/// Default global capacity: 64 MiB shared by every cache in the pool.
pub const DEFAULT_GLOBAL_CAPACITY: u64 = 64 * 1024 * 1024;

/// Pool configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Total byte budget shared by all caches of the registry
    pub global_capacity: u64,
    /// Statistics reporter interval in seconds
    pub stats_interval: u64,
    /// Number of caches driven by the demo workload
    pub demo_caches: usize,
    /// Number of operations each demo cache performs
    pub demo_operations: usize,
    /// Largest payload the demo workload writes
    pub demo_payload_bytes: usize,
}

impl PoolConfig {
    /// Creates a new PoolConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `GLOBAL_CAPACITY_BYTES` - Shared byte budget (default: 64 MiB)
    /// - `STATS_INTERVAL` - Reporter frequency in seconds (default: 5)
    /// - `DEMO_CACHES` - Caches in the demo workload (default: 4)
    /// - `DEMO_OPERATIONS` - Operations per demo cache (default: 10000)
    /// - `DEMO_PAYLOAD_BYTES` - Max demo payload size (default: 4096)
    ///
    /// Unset variables fall back to their default; set but malformed values
    /// are rejected.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            global_capacity: parse_var(&lookup, "GLOBAL_CAPACITY_BYTES", defaults.global_capacity)?,
            stats_interval: parse_var(&lookup, "STATS_INTERVAL", defaults.stats_interval)?,
            demo_caches: parse_var(&lookup, "DEMO_CACHES", defaults.demo_caches)?,
            demo_operations: parse_var(&lookup, "DEMO_OPERATIONS", defaults.demo_operations)?,
            demo_payload_bytes: parse_var(
                &lookup,
                "DEMO_PAYLOAD_BYTES",
                defaults.demo_payload_bytes,
            )?,
        };

        if config.global_capacity == 0 {
            return Err(PoolError::InvalidConfig(
                "GLOBAL_CAPACITY_BYTES must be greater than zero".to_string(),
            ));
        }
        if config.stats_interval == 0 {
            return Err(PoolError::InvalidConfig(
                "STATS_INTERVAL must be at least one second".to_string(),
            ));
        }

        Ok(config)
    }
}

fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| PoolError::InvalidConfig(format!("{}={:?} is not a valid value", name, raw))),
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            global_capacity: DEFAULT_GLOBAL_CAPACITY,
            stats_interval: 5,
            demo_caches: 4,
            demo_operations: 10_000,
            demo_payload_bytes: 4096,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_config_default() {
        let config = PoolConfig::default();
        assert_eq!(config.global_capacity, DEFAULT_GLOBAL_CAPACITY);
        assert_eq!(config.stats_interval, 5);
        assert_eq!(config.demo_caches, 4);
        assert_eq!(config.demo_operations, 10_000);
        assert_eq!(config.demo_payload_bytes, 4096);
    }

    #[test]
    fn test_config_lookup_defaults() {
        let config = PoolConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, PoolConfig::default());
    }

    #[test]
    fn test_config_lookup_overrides() {
        let config = PoolConfig::from_lookup(lookup_from(&[
            ("GLOBAL_CAPACITY_BYTES", "300"),
            ("STATS_INTERVAL", " 2 "),
            ("DEMO_CACHES", "8"),
        ]))
        .unwrap();

        assert_eq!(config.global_capacity, 300);
        assert_eq!(config.stats_interval, 2);
        assert_eq!(config.demo_caches, 8);
        assert_eq!(config.demo_operations, 10_000);
    }

    #[test]
    fn test_config_rejects_negative_capacity() {
        let result = PoolConfig::from_lookup(lookup_from(&[("GLOBAL_CAPACITY_BYTES", "-5")]));
        assert!(matches!(result, Err(PoolError::InvalidConfig(_))));
    }

    #[test]
    fn test_config_rejects_zero_capacity() {
        let result = PoolConfig::from_lookup(lookup_from(&[("GLOBAL_CAPACITY_BYTES", "0")]));
        assert!(matches!(result, Err(PoolError::InvalidConfig(_))));
    }

    #[test]
    fn test_config_rejects_garbage() {
        let result = PoolConfig::from_lookup(lookup_from(&[("STATS_INTERVAL", "soon")]));
        assert!(matches!(result, Err(PoolError::InvalidConfig(_))));
    }
}

//! Background Tasks Module
//!
//! Contains background tasks that run periodically while a pool is in use.
//!
//! # Tasks
//! - Stats Reporter: Logs a registry snapshot at configured intervals

mod reporter;

pub use reporter::spawn_stats_reporter;

//! In-memory query cache.
//!
//! Entries are keyed by [`crate::QueryKey`]. Concurrent readers of one key
//! share a single fetch; results are kept fresh for the stale time and
//! evicted once left untouched for the cache lifetime.

pub mod config;
pub mod entry;
pub mod stats;
pub mod store;

pub use config::CacheConfig;
pub use entry::{CacheEntry, CacheSnapshot, FetchOutcome, InFlight};
pub use stats::CacheStats;
pub use store::CacheStore;

//! Cache statistics

use serde::Serialize;

/// Point-in-time counters of a cache store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Entries currently held.
    pub entries: usize,
    /// Entries with a fetch in flight.
    pub fetching: usize,
    /// Entries whose data is past the stale time or invalidated.
    pub stale: usize,
    /// Entries whose last fetch failed.
    pub failed: usize,
    /// Fetches started since the store was created.
    pub fetches_started: u64,
}

impl CacheStats {
    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }
}

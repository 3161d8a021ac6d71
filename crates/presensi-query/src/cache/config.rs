//! Cache policy

use std::time::Duration;

use crate::config::{QueryConfig, RetryConfig};

/// Timing and size limits applied by [`super::CacheStore`].
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How long fetched data is served without refetching.
    pub stale_time: Duration,
    /// How long an untouched entry is kept.
    pub cache_lifetime: Duration,
    /// Cap on settled entries; least recently accessed go first.
    pub max_entries: Option<usize>,
    pub retry: RetryConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::from(&QueryConfig::default())
    }
}

impl From<&QueryConfig> for CacheConfig {
    fn from(config: &QueryConfig) -> Self {
        Self {
            stale_time: config.stale_time(),
            cache_lifetime: config.cache_lifetime(),
            max_entries: config.max_entries,
            retry: config.retry.clone(),
        }
    }
}

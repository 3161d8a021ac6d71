//! Query layer configuration.
//!
//! Defaults follow the browser client this layer serves: pages of 15 rows,
//! results fresh for 5 minutes, kept for 30 minutes, search debounced by
//! 500 ms and up to 3 retries for server failures.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{QueryError, QueryResult};

/// Backend used when no environment override is present.
pub const DEFAULT_API_BASE_URL: &str = "https://presensi.sigmath.net/api";

/// Host-only override; `/api` is appended.
pub const ENV_BACKEND_URL: &str = "PRESENSI_BACKEND_URL";

/// Full API base override, used as is.
pub const ENV_API_BASE_URL: &str = "PRESENSI_API_BASE_URL";

/// Configuration for the query client and cache store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Base URL of the API, without trailing slash (e.g. `https://host/api`).
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Rows per page (default: 15).
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Seconds a fetched page is served without refetching (default: 300).
    #[serde(default = "default_stale_time_secs")]
    pub stale_time_secs: u64,

    /// Seconds an untouched entry is kept before eviction (default: 1800).
    #[serde(default = "default_cache_lifetime_secs")]
    pub cache_lifetime_secs: u64,

    /// Optional cap on the number of cached keys.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_entries: Option<usize>,

    /// Search input debounce in milliseconds (default: 500).
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// HTTP request timeout in seconds (default: 30).
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Retry policy for retriable failures.
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_page_size() -> u32 {
    15
}

fn default_stale_time_secs() -> u64 {
    5 * 60
}

fn default_cache_lifetime_secs() -> u64 {
    30 * 60
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            page_size: default_page_size(),
            stale_time_secs: default_stale_time_secs(),
            cache_lifetime_secs: default_cache_lifetime_secs(),
            max_entries: None,
            debounce_ms: default_debounce_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            retry: RetryConfig::default(),
        }
    }
}

impl QueryConfig {
    /// Create a config pointing at the given API base URL.
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: normalize_base_url(&api_base_url.into()),
            ..Default::default()
        }
    }

    /// Build the config from the environment.
    ///
    /// `PRESENSI_BACKEND_URL` names the backend host and gets `/api`
    /// appended; `PRESENSI_API_BASE_URL` is taken verbatim. Without either,
    /// the public backend is used.
    pub fn from_env() -> Self {
        let base = if let Ok(backend) = std::env::var(ENV_BACKEND_URL) {
            format!("{}/api", normalize_base_url(&backend))
        } else if let Ok(api_base) = std::env::var(ENV_API_BASE_URL) {
            api_base
        } else {
            default_api_base_url()
        };
        Self::new(base)
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub fn with_stale_time(mut self, secs: u64) -> Self {
        self.stale_time_secs = secs;
        self
    }

    #[must_use]
    pub fn with_cache_lifetime(mut self, secs: u64) -> Self {
        self.cache_lifetime_secs = secs;
        self
    }

    #[must_use]
    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = Some(max);
        self
    }

    #[must_use]
    pub fn with_debounce_ms(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn stale_time(&self) -> Duration {
        Duration::from_secs(self.stale_time_secs)
    }

    pub fn cache_lifetime(&self) -> Duration {
        Duration::from_secs(self.cache_lifetime_secs)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Check the invariants the cache store relies on.
    pub fn validate(&self) -> QueryResult<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(QueryError::Config("API base URL must not be empty".to_string()));
        }
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://")
        {
            return Err(QueryError::Config(format!(
                "API base URL must be http(s): {}",
                self.api_base_url
            )));
        }
        if self.page_size == 0 {
            return Err(QueryError::Config("Page size must be at least 1".to_string()));
        }
        if self.cache_lifetime_secs < self.stale_time_secs {
            return Err(QueryError::Config(format!(
                "Cache lifetime ({}s) must not be shorter than stale time ({}s)",
                self.cache_lifetime_secs, self.stale_time_secs
            )));
        }
        if self.max_entries == Some(0) {
            return Err(QueryError::Config("max_entries must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Retry behaviour with exponential backoff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retries after the first attempt (default: 3).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial backoff delay in milliseconds (default: 1000).
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff delay in milliseconds (default: 30000).
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Backoff multiplier (default: 2.0).
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Whether to add jitter to backoff (default: true).
    #[serde(default = "default_use_jitter")]
    pub use_jitter: bool,
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    1000
}

fn default_max_backoff_ms() -> u64 {
    30_000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_use_jitter() -> bool {
    true
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            use_jitter: default_use_jitter(),
        }
    }
}

impl RetryConfig {
    #[must_use]
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    /// Disable retries.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(0)
    }

    #[must_use]
    pub fn with_initial_backoff(mut self, ms: u64) -> Self {
        self.initial_backoff_ms = ms;
        self
    }

    #[must_use]
    pub fn with_max_backoff(mut self, ms: u64) -> Self {
        self.max_backoff_ms = ms;
        self
    }

    #[must_use]
    pub fn without_jitter(mut self) -> Self {
        self.use_jitter = false;
        self
    }

    /// Backoff before retry number `attempt` (1-based).
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let base =
            self.initial_backoff_ms as f64 * self.backoff_multiplier.powi(attempt as i32 - 1);
        let capped = base.min(self.max_backoff_ms as f64);

        let delay_ms = if self.use_jitter {
            // up to 25% either way
            let jitter_range = capped * 0.25;
            let jitter = (rand::random::<f64>() * jitter_range * 2.0) - jitter_range;
            (capped + jitter).max(0.0)
        } else {
            capped
        };

        Duration::from_millis(delay_ms as u64)
    }
}

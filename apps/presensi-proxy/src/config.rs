//! Proxy configuration loading.

use serde::Deserialize;

use crate::error::{ProxyError, ProxyResult};

/// Backend used when `API_BASE_URL` is not set.
pub const DEFAULT_BACKEND_URL: &str = "https://presensi.sigmath.net/api";

/// Edge proxy configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ProxyConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Base URL requests under `/api` are forwarded to.
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    /// Fallback log filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8788
}

fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_log_filter() -> String {
    "info,presensi_proxy=debug".to_string()
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            backend_url: default_backend_url(),
            request_timeout_secs: default_timeout(),
            log_filter: default_log_filter(),
        }
    }
}

impl ProxyConfig {
    /// Config forwarding to `backend_url` with every other value defaulted.
    pub fn new(backend_url: impl Into<String>) -> Self {
        Self {
            backend_url: backend_url.into().trim_end_matches('/').to_string(),
            ..Default::default()
        }
    }

    /// Load from `API_BASE_URL`, `PROXY_HOST`, `PROXY_PORT`,
    /// `PROXY_TIMEOUT_SECS` and `PROXY_LOG`.
    pub fn from_env() -> ProxyResult<Self> {
        let mut config = match std::env::var("API_BASE_URL") {
            Ok(url) => Self::new(url),
            Err(_) => Self::default(),
        };

        if let Ok(host) = std::env::var("PROXY_HOST") {
            config.host = host;
        }
        if let Ok(port) = std::env::var("PROXY_PORT") {
            config.port = port
                .parse()
                .map_err(|e| ProxyError::Config(format!("Invalid PROXY_PORT '{port}': {e}")))?;
        }
        if let Ok(timeout) = std::env::var("PROXY_TIMEOUT_SECS") {
            config.request_timeout_secs = timeout.parse().map_err(|e| {
                ProxyError::Config(format!("Invalid PROXY_TIMEOUT_SECS '{timeout}': {e}"))
            })?;
        }
        if let Ok(filter) = std::env::var("PROXY_LOG") {
            config.log_filter = filter;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ProxyResult<()> {
        if !self.backend_url.starts_with("http://") && !self.backend_url.starts_with("https://") {
            return Err(ProxyError::Config(format!(
                "Backend URL must be http(s): '{}'",
                self.backend_url
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ProxyError::Config(
                "Request timeout must be at least 1 second".to_string(),
            ));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ProxyConfig::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:8788");
        assert_eq!(config.backend_url, DEFAULT_BACKEND_URL);
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let config = ProxyConfig::new("http://localhost:3000/api/");
        assert_eq!(config.backend_url, "http://localhost:3000/api");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(ProxyConfig::new("localhost:3000").validate().is_err());

        let mut config = ProxyConfig::default();
        config.request_timeout_secs = 0;
        assert!(matches!(config.validate(), Err(ProxyError::Config(_))));
    }
}

//! presensi edge proxy
//!
//! Forwards `/api/<path>` requests to the attendance backend, adding
//! permissive CORS headers to every response, and answers preflight
//! requests itself.

pub mod config;
pub mod error;
pub mod logging;
pub mod proxy;
pub mod routes;

use axum::http::{header, HeaderValue};
use axum::Router;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

pub use config::ProxyConfig;
pub use error::{ProxyError, ProxyResult};
pub use proxy::ProxyClient;

/// Shared state of the proxy routes.
pub struct AppState {
    pub client: ProxyClient,
    pub start_time: Instant,
}

impl AppState {
    pub fn from_config(config: &ProxyConfig) -> ProxyResult<Self> {
        let client = ProxyClient::new(
            config.backend_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )?;
        Ok(Self {
            client,
            start_time: Instant::now(),
        })
    }
}

/// Build the proxy router.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::health_routes(Arc::clone(&state)))
        .merge(routes::forward_routes(state))
        .fallback(routes::forward::fallback_handler)
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type, Authorization"),
        ))
        .layer(TraceLayer::new_for_http())
}

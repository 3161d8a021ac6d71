//! HTTP client forwarding requests to the backend.

use anyhow::Context;
use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderName, Method, Response};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::error::{ProxyError, ProxyResult};

/// Request headers never forwarded to the backend.
const SKIPPED_REQUEST_HEADERS: [HeaderName; 4] = [
    header::HOST,
    header::CONNECTION,
    header::CONTENT_LENGTH,
    header::TRANSFER_ENCODING,
];

/// Response headers recomputed by the proxy itself.
const SKIPPED_RESPONSE_HEADERS: [HeaderName; 3] = [
    header::CONNECTION,
    header::CONTENT_LENGTH,
    header::TRANSFER_ENCODING,
];

/// Client for one backend base URL. Redirects are followed.
#[derive(Debug, Clone)]
pub struct ProxyClient {
    client: Client,
    backend_url: String,
    timeout: Duration,
}

impl ProxyClient {
    pub fn new(backend_url: impl Into<String>, timeout: Duration) -> ProxyResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            backend_url: backend_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn backend_url(&self) -> &str {
        &self.backend_url
    }

    /// Backend URL for a path below `/api` and its raw query string.
    pub fn target_url(&self, path: &str, query: Option<&str>) -> String {
        let mut url = format!("{}/{}", self.backend_url, path.trim_start_matches('/'));
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            url.push('?');
            url.push_str(query);
        }
        url
    }

    /// Send the request to the backend and relay its answer unchanged.
    pub async fn forward(
        &self,
        method: Method,
        path: &str,
        query: Option<&str>,
        headers: &HeaderMap,
        body: Bytes,
    ) -> ProxyResult<Response<Body>> {
        let url = self.target_url(path, query);
        debug!(%method, url = %url, "Forwarding request");

        let upstream = self
            .client
            .request(method, &url)
            .headers(forwarded_headers(headers, &SKIPPED_REQUEST_HEADERS))
            .body(body)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        let status = upstream.status();
        let upstream_headers = forwarded_headers(upstream.headers(), &SKIPPED_RESPONSE_HEADERS);
        let bytes = upstream
            .bytes()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        debug!(url = %url, status = status.as_u16(), bytes = bytes.len(), "Backend answered");

        let mut response = Response::builder()
            .status(status)
            .body(Body::from(bytes))
            .context("Failed to build proxied response")?;
        response.headers_mut().extend(upstream_headers);
        Ok(response)
    }

    fn map_reqwest_error(&self, error: reqwest::Error) -> ProxyError {
        if error.is_timeout() {
            ProxyError::Timeout(self.timeout.as_secs())
        } else {
            ProxyError::Forwarding(error.to_string())
        }
    }
}

fn forwarded_headers(headers: &HeaderMap, skipped: &[HeaderName]) -> HeaderMap {
    let mut forwarded = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if !skipped.contains(name) {
            forwarded.append(name.clone(), value.clone());
        }
    }
    forwarded
}

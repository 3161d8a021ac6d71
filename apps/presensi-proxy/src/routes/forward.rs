//! `/api/*` forwarding and preflight handling.

use axum::{
    body::{Body, Bytes},
    extract::{Path, RawQuery, State},
    http::{HeaderMap, Method, Response, StatusCode},
    response::IntoResponse,
    routing::any,
    Router,
};
use std::sync::Arc;

use crate::error::ProxyResult;
use crate::AppState;

pub fn forward_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/*path", any(forward_handler))
        .with_state(state)
}

/// Relay any method below `/api` to the backend. Preflight requests are
/// answered here without contacting the backend.
async fn forward_handler(
    State(state): State<Arc<AppState>>,
    method: Method,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> ProxyResult<Response<Body>> {
    if method == Method::OPTIONS {
        return Ok(preflight());
    }

    state
        .client
        .forward(method, &path, query.as_deref(), &headers, body)
        .await
}

/// Fallback for paths outside `/api`: preflight succeeds, anything else is 404.
pub async fn fallback_handler(method: Method) -> Response<Body> {
    if method == Method::OPTIONS {
        return preflight();
    }
    StatusCode::NOT_FOUND.into_response()
}

/// Empty 200 answer to a CORS preflight; the headers come from the router layers.
pub fn preflight() -> Response<Body> {
    StatusCode::OK.into_response()
}

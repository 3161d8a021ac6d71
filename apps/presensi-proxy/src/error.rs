//! Proxy error types and HTTP response handling.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Failed to reach backend: {0}")]
    Forwarding(String),

    #[error("Backend did not answer within {0} seconds")]
    Timeout(u64),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal proxy error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Body of every proxy failure response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ProxyError {
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: "Proxy Error".to_string(),
            message: self.to_string(),
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Proxy request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, Json(self.to_response())).into_response()
    }
}

/// Result type alias for proxy operations.
pub type ProxyResult<T> = Result<T, ProxyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body() {
        let body = ProxyError::Forwarding("connection refused".into()).to_response();
        assert_eq!(body.error, "Proxy Error");
        assert_eq!(body.message, "Failed to reach backend: connection refused");
    }

    #[test]
    fn test_every_error_is_500() {
        for err in [
            ProxyError::Timeout(30),
            ProxyError::Config("x".into()),
            ProxyError::Internal(anyhow::anyhow!("y")),
        ] {
            assert_eq!(
                err.into_response().status(),
                StatusCode::INTERNAL_SERVER_ERROR
            );
        }
    }
}

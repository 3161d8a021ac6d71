//! Query error types and retry classification

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Result alias used throughout the query layer.
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors produced while fetching attendance data.
///
/// The type is `Clone` because a single in-flight fetch is shared by every
/// caller waiting on the same key, and each of them receives the outcome.
#[derive(Debug, Clone, Error)]
pub enum QueryError {
    /// The backend rejected the query (4xx). Never retried.
    #[error("Query rejected (status {status}): {message}")]
    ClientQuery {
        status: u16,
        message: String,
        payload: Option<Value>,
    },

    /// The backend failed to answer (5xx). Retried up to the configured bound.
    #[error("Server error (status {status}): {message}")]
    Server {
        status: u16,
        message: String,
        payload: Option<Value>,
    },

    /// The request never produced a response (connect failure, timeout, reset).
    #[error("Network error: {0}")]
    Transport(String),

    /// The response body did not match the expected envelope.
    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// The fetch task ended without producing a result.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl QueryError {
    /// Build an error from a non-success HTTP response.
    ///
    /// The message is taken from the JSON `message` field when the server
    /// provides one, otherwise from the raw body, otherwise from the status
    /// reason phrase.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let payload = serde_json::from_str::<Value>(body).ok();
        let message = payload
            .as_ref()
            .and_then(|v| v.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| {
                let trimmed = body.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("unknown status")
                    .to_string()
            });

        if status.is_server_error() {
            QueryError::Server {
                status: status.as_u16(),
                message,
                payload,
            }
        } else {
            QueryError::ClientQuery {
                status: status.as_u16(),
                message,
                payload,
            }
        }
    }

    /// Whether another attempt could succeed.
    pub fn is_retriable(&self) -> bool {
        matches!(self, QueryError::Server { .. } | QueryError::Transport(_))
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            QueryError::ClientQuery { status, .. } | QueryError::Server { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// Server-supplied payload, if the error body was JSON.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            QueryError::ClientQuery { payload, .. } | QueryError::Server { payload, .. } => {
                payload.as_ref()
            }
            _ => None,
        }
    }
}

impl From<reqwest::Error> for QueryError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            QueryError::Decode(e.to_string())
        } else if e.is_timeout() {
            QueryError::Transport("Request timed out".to_string())
        } else if let Some(status) = e.status() {
            QueryError::from_response(status, "")
        } else {
            QueryError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for QueryError {
    fn from(e: serde_json::Error) -> Self {
        QueryError::Decode(e.to_string())
    }
}

/// Failure of a manual refresh.
#[derive(Debug, Clone, Error)]
pub enum RefreshError {
    /// The backend cache-clear call failed. Local entries were still
    /// invalidated; `invalidated` says how many.
    #[error("Remote cache clear failed ({invalidated} local entries invalidated): {source}")]
    RemotePurgeFailed {
        invalidated: usize,
        #[source]
        source: QueryError,
    },
}

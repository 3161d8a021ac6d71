//! CLI error types and exit codes

use presensi_query::{QueryError, RefreshError};
use thiserror::Error;

/// Exit codes for the CLI
/// - 0: Success
/// - 1: General error
/// - 3: Network error
/// - 4: Validation or rejected query
/// - 5: Server error
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Query rejected (status {status}): {message}")]
    QueryRejected { status: u16, message: String },

    #[error("Server error: {0}")]
    Server(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Network(_) => 3,
            CliError::Validation(_) | CliError::QueryRejected { .. } => 4,
            CliError::Server(_) => 5,
            CliError::Config(_) | CliError::Io(_) | CliError::Internal(_) => 1,
        }
    }

    /// Print the error to stderr with appropriate formatting
    pub fn print(&self) {
        let use_color = std::env::var("NO_COLOR").is_err();

        if use_color {
            eprintln!("\x1b[31mError:\x1b[0m {}", self);
        } else {
            eprintln!("Error: {}", self);
        }

        if let Some(suggestion) = self.suggestion() {
            if use_color {
                eprintln!("\n\x1b[33mSuggestion:\x1b[0m {}", suggestion);
            } else {
                eprintln!("\nSuggestion: {}", suggestion);
            }
        }
    }

    fn suggestion(&self) -> Option<&'static str> {
        match self {
            CliError::Network(_) => {
                Some("Check the API URL (--api-url or PRESENSI_API_BASE_URL) and try again.")
            }
            CliError::QueryRejected { .. } => Some(
                "Search with a plain name, or a JSON object such as '{\"student\": \"Budi\"}'.",
            ),
            CliError::Server(_) => Some("The backend may be busy. Try 'presensi refresh' later."),
            _ => None,
        }
    }
}

impl From<QueryError> for CliError {
    fn from(e: QueryError) -> Self {
        match e {
            QueryError::ClientQuery {
                status, message, ..
            } => CliError::QueryRejected { status, message },
            QueryError::Server {
                status, message, ..
            } => CliError::Server(format!("{message} (status {status})")),
            QueryError::Transport(message) => CliError::Network(message),
            QueryError::Decode(message) => {
                CliError::Server(format!("Unreadable response: {message}"))
            }
            QueryError::Config(message) => CliError::Config(message),
            QueryError::Internal(message) => CliError::Internal(message),
        }
    }
}

impl From<RefreshError> for CliError {
    fn from(e: RefreshError) -> Self {
        match e {
            RefreshError::RemotePurgeFailed { source, .. } => source.into(),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Internal(format!("JSON error: {}", e))
    }
}

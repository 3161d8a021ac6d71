//! presensi CLI library
//!
//! Exposes the command tree and output helpers for integration testing.
//! The binary entry point is in main.rs.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;

pub use cli::{run, Cli};
pub use error::{CliError, CliResult};

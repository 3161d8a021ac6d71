//! Command-line definition and dispatch

use clap::{Args, Parser, Subcommand};
use presensi_query::{QueryConfig, RetryConfig};

use crate::commands;
use crate::error::{CliError, CliResult};

/// presensi - search tutoring attendance records
#[derive(Parser, Debug)]
#[command(name = "presensi")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// API base URL, e.g. http://localhost:8788/api
    #[arg(long, global = true, env = "PRESENSI_API_BASE_URL")]
    pub api_url: Option<String>,

    /// Rows per page
    #[arg(long, global = true, default_value_t = 15)]
    pub page_size: u32,

    /// Retries for server and network failures
    #[arg(long, global = true, default_value_t = 3)]
    pub max_retries: u32,

    /// Increase log output on stderr (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl GlobalArgs {
    /// Query configuration from the environment with flag overrides.
    pub fn query_config(&self) -> CliResult<QueryConfig> {
        let config = match &self.api_url {
            Some(url) => QueryConfig::new(url.as_str()),
            None => QueryConfig::from_env(),
        }
        .with_page_size(self.page_size)
        .with_retry(RetryConfig::new(self.max_retries));

        config.validate().map_err(|e| CliError::Config(e.to_string()))?;
        Ok(config)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search attendance records by year and/or tutor
    Query(commands::query::QueryArgs),

    /// Clear the backend cache and search again
    Refresh(commands::query::QueryArgs),

    /// List tutor names
    Tutors(commands::names::NamesArgs),

    /// List student names
    Students(commands::names::NamesArgs),

    /// Search as you type: each stdin line replaces the search text
    Live(commands::live::LiveArgs),

    /// List the years that have attendance data
    Years(commands::years::YearsArgs),
}

pub async fn run(cli: Cli) -> CliResult<()> {
    let config = cli.global.query_config()?;
    match cli.command {
        Commands::Query(args) => commands::query::execute(&config, args, false).await,
        Commands::Refresh(args) => commands::query::execute(&config, args, true).await,
        Commands::Tutors(args) => {
            commands::names::execute(&config, commands::names::Directory::Tutors, args).await
        }
        Commands::Students(args) => {
            commands::names::execute(&config, commands::names::Directory::Students, args).await
        }
        Commands::Live(args) => commands::live::execute(&config, args).await,
        Commands::Years(args) => commands::years::execute(args),
    }
}

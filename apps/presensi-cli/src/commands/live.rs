//! `live` command: debounced search over stdin

use clap::Args;
use presensi_query::{PresenceSession, QueryConfig};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::commands::query::print_view;
use crate::commands::years::check_year;
use crate::error::CliResult;
use crate::output::print_info;

#[derive(Args, Debug, Clone)]
pub struct LiveArgs {
    /// Year to list alongside the search
    #[arg(long, short)]
    pub year: Option<String>,
}

/// Read search text line by line. A search runs once input pauses for the
/// configured debounce delay; lines typed in quicker succession only run
/// the last one.
pub async fn execute(config: &QueryConfig, args: LiveArgs) -> CliResult<()> {
    if let Some(year) = &args.year {
        check_year(year)?;
    }
    let mut session = PresenceSession::connect(config)?;
    if let Some(year) = &args.year {
        session.change_year(year.as_str());
    }

    print_info("Type a tutor name (or a JSON filter) and press Enter. Ctrl+D to quit.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(text) => session.type_query(text),
                    None => break,
                }
            }
            changed = session.next_settled_query() => {
                if !changed {
                    continue;
                }
                debug!(query = %session.coordinator().state().active_query, "Running live search");
                let view = session.load().await;
                if let Err(e) = print_view(&view, false) {
                    e.print();
                }
            }
        }
    }

    session.end();
    Ok(())
}

//! `query` and `refresh` commands

use clap::Args;
use presensi_query::{Phase, PresenceSession, QueryConfig, QueryView};

use crate::commands::years::check_year;
use crate::error::CliResult;
use crate::output::{format_pagination, print_info, print_success, print_warning, render_records};

/// Arguments shared by `query` and `refresh`
#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// Year to list, from 2022 to the current year (see `presensi years`)
    #[arg(long, short)]
    pub year: Option<String>,

    /// Tutor name, or a JSON filter such as '{"student": "Budi"}'
    #[arg(long, short)]
    pub search: Option<String>,

    /// Page to show (clamped to the available pages)
    #[arg(long, short, default_value_t = 1)]
    pub page: u32,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub const WELCOME: &str =
    "Choose a year (--year) or search for a tutor (--search) to see attendance records.";

/// Run one search. With `refresh`, the backend cache is cleared first.
pub async fn execute(config: &QueryConfig, args: QueryArgs, refresh: bool) -> CliResult<()> {
    if let Some(year) = &args.year {
        check_year(year)?;
    }
    let mut session = PresenceSession::connect(config)?;
    if let Some(year) = &args.year {
        session.change_year(year.as_str());
    }
    session.submit_search(args.search.clone().unwrap_or_default());

    if session.phase() == Phase::Idle {
        print_info(WELCOME);
        return Ok(());
    }

    let mut view = if refresh {
        let (view, purged) = session.refresh().await;
        match purged {
            Ok(_) => print_success("Backend cache cleared"),
            Err(e) => print_warning(&format!("Cache clearing may be incomplete: {e}")),
        }
        view
    } else {
        session.load().await
    };

    if args.page > 1 && session.change_page(args.page) {
        view = session.load().await;
    }
    if session.coordinator().current_page() != args.page.max(1) {
        print_warning(&format!(
            "Page {} is out of range, showing page {}",
            args.page,
            session.coordinator().current_page()
        ));
    }

    print_view(&view, args.json)
}

/// Print a view, turning a failed load into an error.
pub fn print_view(view: &QueryView, json: bool) -> CliResult<()> {
    let results = match view {
        QueryView::Welcome => {
            print_info(WELCOME);
            return Ok(());
        }
        QueryView::Loading => {
            print_info("Loading...");
            return Ok(());
        }
        QueryView::Failed(e) => return Err(e.clone().into()),
        QueryView::Ready(results) => results,
    };

    if let Some(error) = &results.error {
        print_warning(&format!("Showing earlier results: {error}"));
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&results.page)?);
        return Ok(());
    }

    if results.page.is_empty() {
        print_info("No attendance records match this search.");
        return Ok(());
    }

    print!("{}", render_records(&results.page.items));
    if let Some(pagination) = &results.page.pagination {
        println!("\n{}", format_pagination(pagination));
    }
    if results.page.cached {
        print_info("Served from the backend cache. Use 'presensi refresh' for fresh data.");
    }
    Ok(())
}

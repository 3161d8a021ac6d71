//! `tutors` and `students` commands

use clap::Args;
use presensi_query::{PresenceClient, QueryConfig};

use crate::error::CliResult;
use crate::output::{print_info, print_key_value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directory {
    Tutors,
    Students,
}

#[derive(Args, Debug, Clone)]
pub struct NamesArgs {
    /// Only names containing this text, best matches first
    #[arg(long)]
    pub suggest: Option<String>,

    /// Maximum number of suggestions
    #[arg(long, default_value_t = 10)]
    pub limit: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(config: &QueryConfig, directory: Directory, args: NamesArgs) -> CliResult<()> {
    let client = PresenceClient::new(config)?;
    let names = match directory {
        Directory::Tutors => client.tutors().await?,
        Directory::Students => client.students().await?,
    };

    if let Some(text) = &args.suggest {
        let suggestions = names.suggest(text, args.limit);
        if args.json {
            println!("{}", serde_json::to_string_pretty(&suggestions)?);
        } else if suggestions.is_empty() {
            print_info(&format!("No names match '{text}'"));
        } else {
            for name in suggestions {
                println!("{name}");
            }
        }
        return Ok(());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&names)?);
    } else if names.is_empty() {
        print_info("No names found");
    } else {
        for (id, name) in names.iter() {
            print_key_value(id, name);
        }
    }
    Ok(())
}

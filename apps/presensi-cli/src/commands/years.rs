//! `years` command and year validation

use clap::Args;
use presensi_query::current_available_years;

use crate::error::{CliError, CliResult};

#[derive(Args, Debug, Clone)]
pub struct YearsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: YearsArgs) -> CliResult<()> {
    let years = current_available_years();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&years)?);
    } else {
        for year in years {
            println!("{year}");
        }
    }
    Ok(())
}

/// Reject a `--year` outside the years that have data. Blank means no year.
pub fn check_year(year: &str) -> CliResult<()> {
    check_year_in(year, &current_available_years())
}

fn check_year_in(year: &str, available: &[String]) -> CliResult<()> {
    let year = year.trim();
    if year.is_empty() || available.iter().any(|y| y == year) {
        return Ok(());
    }
    Err(CliError::Validation(format!(
        "no attendance data for year '{year}' (available: {})",
        available.join(", ")
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn available() -> Vec<String> {
        vec!["2024".into(), "2023".into(), "2022".into()]
    }

    #[test]
    fn test_known_and_blank_years_pass() {
        assert!(check_year_in("2023", &available()).is_ok());
        assert!(check_year_in(" 2024 ", &available()).is_ok());
        assert!(check_year_in("", &available()).is_ok());
    }

    #[test]
    fn test_unknown_year_is_validation_error() {
        let err = check_year_in("2019", &available()).unwrap_err();
        assert_eq!(err.exit_code(), 4);
        assert!(err.to_string().contains("2024, 2023, 2022"));
    }
}

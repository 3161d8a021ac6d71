//! Lesson date and time parsing, and the selectable data years.

use chrono::{Datelike, Local, NaiveDate, NaiveTime};

/// First year with attendance data.
pub const FIRST_DATA_YEAR: i32 = 2022;

/// Years that can be filtered on, newest first, up to the year of `today`.
pub fn available_years(today: NaiveDate) -> Vec<String> {
    (FIRST_DATA_YEAR..=today.year().max(FIRST_DATA_YEAR))
        .rev()
        .map(|year| year.to_string())
        .collect()
}

/// [`available_years`] as of the local date.
pub fn current_available_years() -> Vec<String> {
    available_years(Local::now().date_naive())
}

/// Parse a `dd/mm/yyyy` lesson date. Anything else yields `None`.
pub fn parse_lesson_date(value: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = value.trim().split('/').collect();
    let [day, month, year] = parts.as_slice() else {
        return None;
    };

    let day: u32 = day.trim().parse().ok()?;
    let month: u32 = month.trim().parse().ok()?;
    let year: i32 = year.trim().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse a lesson start time written as `HH:MM`, `HH.MM` or `HH:MM:SS`.
pub fn parse_lesson_time(value: &str) -> Option<NaiveTime> {
    let normalized = value.trim().replace('.', ":");
    NaiveTime::parse_from_str(&normalized, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(&normalized, "%H:%M"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_years_run_from_current_back_to_first() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert_eq!(available_years(today), vec!["2025", "2024", "2023", "2022"]);
    }

    #[test]
    fn test_available_years_before_first_year() {
        let today = NaiveDate::from_ymd_opt(2021, 12, 31).unwrap();
        assert_eq!(available_years(today), vec!["2022"]);
    }

    #[test]
    fn test_parse_lesson_date() {
        assert_eq!(
            parse_lesson_date("05/03/2024"),
            NaiveDate::from_ymd_opt(2024, 3, 5)
        );
        assert_eq!(
            parse_lesson_date(" 5/3/2024 "),
            NaiveDate::from_ymd_opt(2024, 3, 5)
        );
    }

    #[test]
    fn test_parse_lesson_date_rejects_invalid() {
        assert!(parse_lesson_date("31/02/2024").is_none());
        assert!(parse_lesson_date("2024-03-05").is_none());
        assert!(parse_lesson_date("05/03").is_none());
        assert!(parse_lesson_date("").is_none());
    }

    #[test]
    fn test_parse_lesson_time() {
        assert_eq!(parse_lesson_time("15:30"), NaiveTime::from_hms_opt(15, 30, 0));
        assert_eq!(parse_lesson_time("09.05"), NaiveTime::from_hms_opt(9, 5, 0));
        assert_eq!(
            parse_lesson_time("07:45:10"),
            NaiveTime::from_hms_opt(7, 45, 10)
        );
        assert!(parse_lesson_time("sore").is_none());
    }
}

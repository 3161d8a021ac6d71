//! Table display of attendance records

use presensi_query::privacy::mask_email;
use presensi_query::{DurationBand, PaginationInfo, PresenceRecord};

/// Truncate a string for table display, handling Unicode safely.
///
/// If the string exceeds `max_len` characters, it is cut and "..." appended.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}

fn duration_label(record: &PresenceRecord) -> String {
    let band = match record.duration_band() {
        DurationBand::Short => "short",
        DurationBand::Medium => "medium",
        DurationBand::Long => "long",
        DurationBand::Extended => "extended",
        DurationBand::Marathon => "marathon",
        DurationBand::Excessive => "excessive",
        DurationBand::Unknown => return "-".to_string(),
    };
    match record.duration_minutes {
        Some(minutes) => format!("{minutes}m ({band})"),
        None => band.to_string(),
    }
}

fn lesson_when(record: &PresenceRecord) -> String {
    let day = record
        .lesson_day()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| record.lesson_date.clone());
    match record.lesson_time.as_deref() {
        Some(time) if !time.is_empty() => format!("{day} {time}"),
        _ => day,
    }
}

/// Render records as a fixed-width table. Student emails are masked.
pub fn render_records(records: &[PresenceRecord]) -> String {
    let mut out = format!(
        "{:<17} {:<20} {:<20} {:<24} {}\n",
        "LESSON", "TUTOR", "STUDENT", "EMAIL", "DURATION"
    );
    out.push_str(&"-".repeat(100));
    out.push('\n');

    for record in records {
        let email = record
            .student_email
            .as_deref()
            .map(mask_email)
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "{:<17} {:<20} {:<20} {:<24} {}\n",
            truncate(&lesson_when(record), 17),
            truncate(&record.tutor_name, 20),
            truncate(&record.student_name, 20),
            truncate(&email, 24),
            duration_label(record),
        ));
    }
    out
}

pub fn format_pagination(pagination: &PaginationInfo) -> String {
    format!(
        "Page {} of {} ({} records)",
        pagination.current_page,
        pagination.total_pages.max(1),
        pagination.total_items
    )
}

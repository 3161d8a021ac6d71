//! Wire models for the attendance API

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::dates;

/// One submitted attendance row.
///
/// Field names on the wire are the column headers of the attendance sheet the
/// backend reads from; camelCase aliases are accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceRecord {
    #[serde(rename = "Nama Tentor", alias = "tutorName", default)]
    pub tutor_name: String,

    #[serde(
        rename = "Email Address",
        alias = "studentEmail",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub student_email: Option<String>,

    #[serde(rename = "Nama Siswa", alias = "studentName", default)]
    pub student_name: String,

    /// Lesson day as written by the tutor, usually `dd/mm/yyyy`.
    #[serde(rename = "Hari dan Tanggal Les", alias = "lessonDate", default)]
    pub lesson_date: String,

    #[serde(
        rename = "Jam Kegiatan Les",
        alias = "lessonTime",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub lesson_time: Option<String>,

    #[serde(
        rename = "Durasi Les",
        alias = "durationMinutes",
        default,
        deserialize_with = "deserialize_minutes",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration_minutes: Option<u32>,

    /// Submission timestamp; unique per row.
    #[serde(rename = "Timestamp", alias = "timestamp", default)]
    pub timestamp: String,
}

/// Duration classes used to badge a lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationBand {
    Short,
    Medium,
    Long,
    Extended,
    Marathon,
    Excessive,
    Unknown,
}

impl DurationBand {
    pub fn from_minutes(minutes: Option<u32>) -> Self {
        match minutes {
            None => DurationBand::Unknown,
            Some(m) if m <= 30 => DurationBand::Short,
            Some(m) if m <= 60 => DurationBand::Medium,
            Some(m) if m <= 90 => DurationBand::Long,
            Some(m) if m <= 120 => DurationBand::Extended,
            Some(m) if m <= 150 => DurationBand::Marathon,
            Some(_) => DurationBand::Excessive,
        }
    }
}

impl PresenceRecord {
    pub fn duration_band(&self) -> DurationBand {
        DurationBand::from_minutes(self.duration_minutes)
    }

    /// Parsed lesson day, when the sheet value is a valid date.
    pub fn lesson_day(&self) -> Option<NaiveDate> {
        dates::parse_lesson_date(&self.lesson_date)
    }

    /// Lesson day and start time combined.
    pub fn lesson_date_time(&self) -> Option<NaiveDateTime> {
        let day = self.lesson_day()?;
        let time = self
            .lesson_time
            .as_deref()
            .and_then(dates::parse_lesson_time)
            .unwrap_or(NaiveTime::MIN);
        Some(day.and_time(time))
    }
}

/// Accepts `90`, `"90"`, `"90 menit"`, `null` or garbage (as `None`).
fn deserialize_minutes<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_u64().and_then(|m| u32::try_from(m).ok()),
        Some(Value::String(s)) => {
            let digits: String = s.trim().chars().take_while(char::is_ascii_digit).collect();
            digits.parse().ok()
        }
        _ => None,
    })
}

/// Pagination block of a query response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_items: u64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl PaginationInfo {
    /// Derive the pagination block for `current_page` of `total_items`.
    pub fn from_totals(current_page: u32, total_items: u64, page_size: u32) -> Self {
        let page_size = u64::from(page_size.max(1));
        let total_pages = u32::try_from(total_items.div_ceil(page_size)).unwrap_or(u32::MAX);
        Self {
            current_page,
            total_pages,
            total_items,
            has_next_page: current_page < total_pages,
            has_previous_page: current_page > 1,
        }
    }

    /// Whether the block agrees with itself for the given page size.
    pub fn is_consistent(&self, page_size: u32) -> bool {
        let expected = u64::from(page_size.max(1));
        if u64::from(self.total_pages) != self.total_items.div_ceil(expected) {
            return false;
        }
        if self.total_items > 0 && !(1..=self.total_pages).contains(&self.current_page) {
            return false;
        }
        true
    }
}

/// One page of results as handed to the cache store.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryPage {
    pub items: Vec<PresenceRecord>,
    pub pagination: Option<PaginationInfo>,
    /// Whether the backend served this page from its own cache.
    pub cached: bool,
}

impl QueryPage {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Body of `POST /data/query`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub page: u32,
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<Value>,
}

/// Envelope of a `POST /data/query` response.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub data: Vec<PresenceRecord>,
    #[serde(default)]
    pub pagination: Option<PaginationInfo>,
    #[serde(default)]
    pub cached: bool,
}

impl From<QueryResponse> for QueryPage {
    fn from(response: QueryResponse) -> Self {
        Self {
            items: response.data,
            pagination: response.pagination,
            cached: response.cached,
        }
    }
}

/// Body of `GET /tutors` and `GET /students`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NamesResponse {
    #[serde(default)]
    pub names: BTreeMap<String, String>,
}

/// Id to display-name directory used for search suggestions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NameDirectory {
    names: BTreeMap<String, String>,
}

impl NameDirectory {
    pub fn new(names: BTreeMap<String, String>) -> Self {
        Self { names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// `(id, name)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.names.iter().map(|(id, name)| (id.as_str(), name.as_str()))
    }

    /// Names containing `text` (case-insensitive), prefix matches first,
    /// then alphabetical, at most `limit`.
    pub fn suggest(&self, text: &str, limit: usize) -> Vec<&str> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<(bool, &str)> = self
            .names
            .values()
            .filter_map(|name| {
                let lower = name.to_lowercase();
                lower
                    .contains(&needle)
                    .then(|| (!lower.starts_with(&needle), name.as_str()))
            })
            .collect();
        matches.sort();
        matches.dedup();
        matches.into_iter().take(limit).map(|(_, n)| n).collect()
    }
}

impl From<NamesResponse> for NameDirectory {
    fn from(response: NamesResponse) -> Self {
        Self::new(response.names)
    }
}

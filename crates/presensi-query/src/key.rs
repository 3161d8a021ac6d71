//! Cache keys and search filter parsing.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

use crate::models::QueryRequest;

/// Namespace of attendance query keys.
pub const PRESENCE_NAMESPACE: &str = "presence-data";

/// Field used when the search text is not a structured filter.
pub const DEFAULT_SEARCH_FIELD: &str = "teacher";

/// Identifier of one cached (filter, page) combination.
///
/// Equality is structural: two keys built from equal inputs find the same
/// cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct QueryKey {
    pub namespace: String,
    /// Selected year, `""` when none.
    pub year: String,
    pub page: u32,
    pub page_size: u32,
    /// Trimmed search text, `""` when none.
    pub search: String,
}

/// Build the key for an attendance query.
///
/// Total: a missing year and an empty year give the same key, and page or
/// page size below 1 are raised to 1.
pub fn build_key(year: Option<&str>, page: u32, page_size: u32, search: &str) -> QueryKey {
    QueryKey {
        namespace: PRESENCE_NAMESPACE.to_string(),
        year: year.map(str::trim).unwrap_or_default().to_string(),
        page: page.max(1),
        page_size: page_size.max(1),
        search: search.trim().to_string(),
    }
}

impl QueryKey {
    pub fn has_year(&self) -> bool {
        !self.year.is_empty()
    }

    pub fn has_search(&self) -> bool {
        !self.search.is_empty()
    }

    /// Parsed search filter of this key.
    pub fn filter(&self) -> Option<SearchFilter> {
        SearchFilter::parse(&self.search)
    }

    /// Request body that fetches this key.
    pub fn to_request(&self) -> QueryRequest {
        QueryRequest {
            page: self.page,
            page_size: self.page_size,
            year: self.has_year().then(|| self.year.clone()),
            search: self.filter().map(|f| f.to_value()),
        }
    }

    /// Same filter, different page.
    #[must_use]
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page: page.max(1),
            ..self.clone()
        }
    }

    /// Whether `other` differs from this key only by page.
    pub fn same_filter(&self, other: &QueryKey) -> bool {
        self.namespace == other.namespace
            && self.year == other.year
            && self.page_size == other.page_size
            && self.search == other.search
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[year={:?} page={} size={} search={:?}]",
            self.namespace, self.year, self.page, self.page_size, self.search
        )
    }
}

/// Search filter sent to the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchFilter {
    /// A JSON object typed by the user, passed through untouched.
    Structured(Map<String, Value>),
    /// Free text, matched against the default field.
    SingleField(String),
}

impl SearchFilter {
    /// Parse search text. Never fails: text that is not a JSON object
    /// becomes a single-field filter; blank text is no filter at all.
    pub fn parse(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }

        match serde_json::from_str::<Value>(trimmed) {
            Ok(Value::Object(map)) => Some(SearchFilter::Structured(map)),
            _ => Some(SearchFilter::SingleField(trimmed.to_string())),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            SearchFilter::Structured(map) => Value::Object(map.clone()),
            SearchFilter::SingleField(text) => {
                let mut map = Map::new();
                map.insert(DEFAULT_SEARCH_FIELD.to_string(), Value::String(text.clone()));
                Value::Object(map)
            }
        }
    }
}

/// Predicate selecting cache keys for invalidation or removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyMatcher {
    All,
    Namespace(String),
    Exact(QueryKey),
    /// Every page and search for one year in a namespace.
    Year { namespace: String, year: String },
    /// Every page of one filter.
    Filter(QueryKey),
}

impl KeyMatcher {
    pub fn presence() -> Self {
        KeyMatcher::Namespace(PRESENCE_NAMESPACE.to_string())
    }

    pub fn matches(&self, key: &QueryKey) -> bool {
        match self {
            KeyMatcher::All => true,
            KeyMatcher::Namespace(ns) => key.namespace == *ns,
            KeyMatcher::Exact(k) => key == k,
            KeyMatcher::Year { namespace, year } => {
                key.namespace == *namespace && key.year == *year
            }
            KeyMatcher::Filter(k) => k.same_filter(key),
        }
    }
}

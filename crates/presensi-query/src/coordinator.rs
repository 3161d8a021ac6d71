//! Search, year and page state driving which key is fetched.

use serde::Serialize;

use crate::key::{build_key, QueryKey};
use crate::models::PaginationInfo;

/// Whether the coordinator allows fetching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Nothing submitted yet; show the welcome placeholder.
    Idle,
    /// An active year or search exists.
    Ready,
}

/// Draft (being edited) and active (last submitted) filter values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchState {
    pub draft_query: String,
    pub active_query: String,
    pub draft_year: String,
    pub active_year: String,
}

/// State machine over [`SearchState`] and the current page.
///
/// Only active values feed the query key. Any change of the active query
/// or year sends the page back to 1, and the page is kept within the last
/// known page count.
#[derive(Debug, Clone)]
pub struct SearchCoordinator {
    state: SearchState,
    page: u32,
    page_size: u32,
    total_pages: Option<u32>,
}

impl SearchCoordinator {
    pub fn new(page_size: u32) -> Self {
        Self {
            state: SearchState::default(),
            page: 1,
            page_size: page_size.max(1),
            total_pages: None,
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn current_page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Last page count reported by the backend for the active filter.
    pub fn total_pages(&self) -> Option<u32> {
        self.total_pages
    }

    pub fn is_enabled(&self) -> bool {
        !self.state.active_query.trim().is_empty() || !self.state.active_year.is_empty()
    }

    pub fn phase(&self) -> Phase {
        if self.is_enabled() {
            Phase::Ready
        } else {
            Phase::Idle
        }
    }

    /// Update the search input without touching the active query.
    pub fn set_draft_query(&mut self, text: impl Into<String>) {
        self.state.draft_query = text.into();
    }

    /// Select a year for the next submission. The active year is unchanged.
    pub fn change_year(&mut self, year: impl Into<String>) {
        self.state.draft_year = year.into().trim().to_string();
    }

    /// Make `query` and the draft year active and go back to page 1.
    /// Returns whether the active filter changed.
    pub fn submit_search(&mut self, query: impl Into<String>) -> bool {
        let query = query.into();
        self.state.draft_query = query.clone();

        let changed =
            self.state.active_query != query || self.state.active_year != self.state.draft_year;
        if changed {
            self.state.active_query = query;
            self.state.active_year = self.state.draft_year.clone();
            self.total_pages = None;
        }
        self.page = 1;
        changed
    }

    /// Move to page `n`, clamped to the known range. Returns whether the
    /// page changed.
    pub fn change_page(&mut self, n: u32) -> bool {
        let target = n.clamp(1, self.last_page());
        if target == self.page {
            return false;
        }
        self.page = target;
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.change_page(self.page.saturating_add(1))
    }

    pub fn previous_page(&mut self) -> bool {
        self.change_page(self.page.saturating_sub(1))
    }

    /// Take the page count from a response for the active filter and pull
    /// the current page back into range.
    pub fn record_pagination(&mut self, pagination: &PaginationInfo) {
        self.total_pages = Some(pagination.total_pages);
        self.page = self.page.clamp(1, self.last_page());
    }

    /// Key of the page to show, `None` while idle.
    pub fn current_key(&self) -> Option<QueryKey> {
        self.is_enabled().then(|| {
            build_key(
                Some(&self.state.active_year),
                self.page,
                self.page_size,
                &self.state.active_query,
            )
        })
    }

    fn last_page(&self) -> u32 {
        self.total_pages.unwrap_or(1).max(1)
    }
}

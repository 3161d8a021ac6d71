//! Cache entry model

use futures::future::{BoxFuture, Shared};
use std::time::Duration;
use tokio::time::Instant;

use crate::error::QueryError;
use crate::key::QueryKey;
use crate::models::{PaginationInfo, PresenceRecord, QueryPage};

/// Outcome of one fetch, shared by every caller waiting on the same key.
pub type FetchOutcome = Result<QueryPage, QueryError>;

/// Handle to the single in-flight fetch of a key.
pub type InFlight = Shared<BoxFuture<'static, FetchOutcome>>;

/// The fetch currently running for an entry.
pub struct PendingFetch {
    /// Store-wide fetch id; a settling task only writes if it still owns the entry.
    pub id: u64,
    /// Entry generation when the fetch started.
    pub generation: u64,
    pub future: InFlight,
}

/// A cached query result with its bookkeeping.
pub struct CacheEntry {
    pub key: QueryKey,
    pub data: Option<QueryPage>,
    /// When `data` was fetched; `None` marks the entry stale.
    pub fetched_at: Option<Instant>,
    /// When `data` was last replaced, kept across invalidation.
    pub updated_at: Option<Instant>,
    pub error: Option<QueryError>,
    pub error_at: Option<Instant>,
    /// Failed attempts of the current or last fetch.
    pub failure_count: u32,
    pub last_accessed: Instant,
    /// Bumped by every invalidation.
    pub generation: u64,
    pub in_flight: Option<PendingFetch>,
}

impl CacheEntry {
    pub fn new(key: QueryKey, now: Instant) -> Self {
        Self {
            key,
            data: None,
            fetched_at: None,
            updated_at: None,
            error: None,
            error_at: None,
            failure_count: 0,
            last_accessed: now,
            generation: 0,
            in_flight: None,
        }
    }

    /// Whether the data can be served without refetching.
    pub fn is_fresh(&self, stale_time: Duration, now: Instant) -> bool {
        match self.fetched_at {
            Some(fetched_at) => now.saturating_duration_since(fetched_at) < stale_time,
            None => false,
        }
    }

    /// Whether the entry has gone untouched for longer than `lifetime`.
    pub fn is_expired(&self, lifetime: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.last_accessed) > lifetime
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Whether the running fetch is the one with `id`.
    pub fn owns_fetch(&self, id: u64) -> bool {
        self.in_flight.as_ref().is_some_and(|p| p.id == id)
    }

    pub fn touch(&mut self, now: Instant) {
        self.last_accessed = now;
    }

    /// Mark stale without dropping data. Returns whether anything changed.
    pub fn invalidate(&mut self) -> bool {
        self.generation += 1;
        self.fetched_at.take().is_some() || self.in_flight.is_some()
    }

    /// Record a successful fetch and clear the pending slot.
    pub fn settle_success(&mut self, page: QueryPage, now: Instant) {
        let started_at = self.in_flight.take().map(|p| p.generation);
        self.data = Some(page);
        self.updated_at = Some(now);
        // invalidated mid-flight: keep the data but leave it stale
        self.fetched_at = (started_at == Some(self.generation)).then_some(now);
        self.error = None;
        self.error_at = None;
        self.failure_count = 0;
    }

    /// Record a failed fetch. Previous data is kept but not refreshed.
    pub fn settle_failure(&mut self, error: QueryError, attempts: u32, now: Instant) {
        self.in_flight = None;
        self.error = Some(error);
        self.error_at = Some(now);
        self.failure_count = attempts;
    }

    pub fn snapshot(&self, stale_time: Duration, now: Instant) -> CacheSnapshot {
        CacheSnapshot {
            key: self.key.clone(),
            data: self.data.clone(),
            error: self.error.clone(),
            fetched_at: self.fetched_at,
            updated_at: self.updated_at,
            error_at: self.error_at,
            failure_count: self.failure_count,
            is_fetching: self.is_fetching(),
            is_stale: !self.is_fresh(stale_time, now),
        }
    }
}

/// Read-only copy of an entry handed to callers.
#[derive(Debug, Clone)]
pub struct CacheSnapshot {
    pub key: QueryKey,
    pub data: Option<QueryPage>,
    pub error: Option<QueryError>,
    pub fetched_at: Option<Instant>,
    pub updated_at: Option<Instant>,
    pub error_at: Option<Instant>,
    pub failure_count: u32,
    pub is_fetching: bool,
    pub is_stale: bool,
}

impl CacheSnapshot {
    /// Snapshot for a fetch whose entry was removed before it settled.
    pub fn detached(key: QueryKey, outcome: FetchOutcome, now: Instant) -> Self {
        let (data, error) = match outcome {
            Ok(page) => (Some(page), None),
            Err(e) => (None, Some(e)),
        };
        Self {
            key,
            fetched_at: data.as_ref().map(|_| now),
            updated_at: data.as_ref().map(|_| now),
            error_at: error.as_ref().map(|_| now),
            data,
            error,
            failure_count: 0,
            is_fetching: false,
            is_stale: true,
        }
    }

    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    pub fn items(&self) -> &[PresenceRecord] {
        self.data.as_ref().map(|d| d.items.as_slice()).unwrap_or(&[])
    }

    pub fn pagination(&self) -> Option<PaginationInfo> {
        self.data.as_ref().and_then(|d| d.pagination)
    }

    /// Whether the backend served the data from its own cache.
    pub fn cached(&self) -> bool {
        self.data.as_ref().is_some_and(|d| d.cached)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::build_key;
    use futures::FutureExt;

    fn entry() -> (CacheEntry, Instant) {
        let now = Instant::now();
        (CacheEntry::new(build_key(Some("2024"), 1, 15, ""), now), now)
    }

    fn start(entry: &mut CacheEntry, id: u64) {
        entry.in_flight = Some(PendingFetch {
            id,
            generation: entry.generation,
            future: futures::future::ready(Ok(QueryPage::default()))
                .boxed()
                .shared(),
        });
    }

    #[test]
    fn test_new_entry_is_stale() {
        let (entry, now) = entry();
        assert!(!entry.is_fresh(Duration::from_secs(300), now));
        assert!(!entry.is_fetching());
    }

    #[test]
    fn test_fresh_until_stale_time() {
        let (mut entry, now) = entry();
        start(&mut entry, 1);
        assert!(entry.is_fetching());
        assert!(entry.owns_fetch(1));
        assert!(!entry.owns_fetch(2));
        entry.settle_success(QueryPage::default(), now);
        assert!(!entry.is_fetching());
        let stale = Duration::from_secs(300);
        assert!(entry.is_fresh(stale, now + Duration::from_secs(299)));
        assert!(!entry.is_fresh(stale, now + Duration::from_secs(300)));
    }

    #[test]
    fn test_expiry_follows_last_access() {
        let (mut entry, now) = entry();
        let lifetime = Duration::from_secs(1800);
        assert!(entry.is_expired(lifetime, now + Duration::from_secs(1801)));
        entry.touch(now + Duration::from_secs(1000));
        assert!(!entry.is_expired(lifetime, now + Duration::from_secs(1801)));
    }

    #[test]
    fn test_invalidate_keeps_data() {
        let (mut entry, now) = entry();
        start(&mut entry, 1);
        entry.settle_success(QueryPage::default(), now);
        assert!(entry.invalidate());
        assert!(entry.data.is_some());
        assert!(entry.fetched_at.is_none());
        assert_eq!(entry.generation, 1);
        assert!(!entry.invalidate());
    }

    #[test]
    fn test_success_from_older_generation_stays_stale() {
        let (mut entry, now) = entry();
        start(&mut entry, 1);
        entry.invalidate();
        entry.settle_success(QueryPage::default(), now);
        assert!(entry.data.is_some());
        assert!(entry.fetched_at.is_none());
    }

    #[test]
    fn test_failure_keeps_previous_data() {
        let (mut entry, now) = entry();
        start(&mut entry, 1);
        entry.settle_success(QueryPage::default(), now);
        start(&mut entry, 2);
        entry.settle_failure(QueryError::Transport("reset".into()), 4, now);
        let snapshot = entry.snapshot(Duration::from_secs(300), now);
        assert!(snapshot.has_data());
        assert!(snapshot.error.is_some());
        assert_eq!(snapshot.failure_count, 4);
        assert!(!snapshot.is_stale);
        assert!(!snapshot.is_fetching);
    }
}

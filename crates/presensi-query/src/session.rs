//! One user's browsing session over the attendance data.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

use crate::cache::{CacheConfig, CacheSnapshot, CacheStore};
use crate::client::PresenceClient;
use crate::config::QueryConfig;
use crate::coordinator::{Phase, SearchCoordinator};
use crate::debounce::Debouncer;
use crate::error::{QueryError, QueryResult, RefreshError};
use crate::key::{KeyMatcher, QueryKey};
use crate::models::QueryPage;
use crate::refresh::RefreshController;
use crate::traits::{FetchExecutor, RemoteCache};

/// What the results area should show.
#[derive(Debug, Clone)]
pub enum QueryView {
    /// Nothing submitted yet. Distinct from a query with zero matches.
    Welcome,
    /// First load of a key with nothing to show meanwhile.
    Loading,
    Ready(ResultsView),
    /// The fetch failed and no data is available at all.
    Failed(QueryError),
}

#[derive(Debug, Clone)]
pub struct ResultsView {
    /// Key the rows belong to.
    pub key: QueryKey,
    pub page: QueryPage,
    /// Rows come from the previously shown key while the current one loads.
    pub is_placeholder: bool,
    pub is_fetching: bool,
    pub is_stale: bool,
    /// Error of the current key's last fetch, shown next to the rows.
    pub error: Option<QueryError>,
}

impl QueryView {
    pub fn results(&self) -> Option<&ResultsView> {
        match self {
            QueryView::Ready(results) => Some(results),
            _ => None,
        }
    }

    pub fn is_welcome(&self) -> bool {
        matches!(self, QueryView::Welcome)
    }
}

/// Ties the coordinator, the cache store and the refresh controller
/// together, with debounced live search.
///
/// The cache store is shared; ending the session clears it.
pub struct PresenceSession {
    coordinator: SearchCoordinator,
    store: Arc<CacheStore>,
    refresh: RefreshController,
    debouncer: Debouncer<String>,
    settled: watch::Receiver<String>,
    /// Last key whose data was shown, used as the placeholder.
    last_shown: Option<QueryKey>,
}

impl PresenceSession {
    pub fn new(
        config: &QueryConfig,
        executor: Arc<dyn FetchExecutor>,
        remote: Arc<dyn RemoteCache>,
    ) -> Self {
        let store = Arc::new(CacheStore::new(executor, CacheConfig::from(config)));
        Self::with_store(config, store, remote)
    }

    /// Session over an existing store.
    pub fn with_store(
        config: &QueryConfig,
        store: Arc<CacheStore>,
        remote: Arc<dyn RemoteCache>,
    ) -> Self {
        let debouncer = Debouncer::new(String::new(), config.debounce());
        let settled = debouncer.subscribe();
        Self {
            coordinator: SearchCoordinator::new(config.page_size),
            refresh: RefreshController::new(Arc::clone(&store), remote),
            store,
            debouncer,
            settled,
            last_shown: None,
        }
    }

    /// Session talking to the HTTP backend named by `config`.
    pub fn connect(config: &QueryConfig) -> QueryResult<Self> {
        let client = Arc::new(PresenceClient::new(config)?);
        Ok(Self::new(config, client.clone(), client))
    }

    pub fn coordinator(&self) -> &SearchCoordinator {
        &self.coordinator
    }

    pub fn store(&self) -> &Arc<CacheStore> {
        &self.store
    }

    pub fn phase(&self) -> Phase {
        self.coordinator.phase()
    }

    pub fn current_key(&self) -> Option<QueryKey> {
        self.coordinator.current_key()
    }

    pub fn change_year(&mut self, year: impl Into<String>) {
        self.coordinator.change_year(year);
    }

    /// Submit `query` now, dropping any pending or unread debounced input.
    pub fn submit_search(&mut self, query: impl Into<String>) -> bool {
        self.debouncer.cancel();
        let _ = self.settled.borrow_and_update();
        self.coordinator.submit_search(query)
    }

    pub fn change_page(&mut self, page: u32) -> bool {
        self.coordinator.change_page(page)
    }

    pub fn next_page(&mut self) -> bool {
        self.coordinator.next_page()
    }

    pub fn previous_page(&mut self) -> bool {
        self.coordinator.previous_page()
    }

    /// Update the search input; it is submitted once typing pauses.
    pub fn type_query(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.coordinator.set_draft_query(text.clone());
        self.debouncer.set(text);
    }

    /// Wait for the typed query to settle and submit it. Returns whether the
    /// active filter changed.
    pub async fn next_settled_query(&mut self) -> bool {
        if self.settled.changed().await.is_err() {
            return false;
        }
        let query = self.settled.borrow_and_update().clone();
        debug!(query = %query, "Search input settled");
        self.coordinator.submit_search(query)
    }

    /// Current view from the cache alone, without fetching.
    pub fn view(&self) -> QueryView {
        let Some(key) = self.coordinator.current_key() else {
            return QueryView::Welcome;
        };

        let current = self.store.get(&key);
        if let Some(snapshot) = current.as_ref().filter(|s| s.has_data()) {
            return QueryView::Ready(results(snapshot, false));
        }

        let placeholder = self
            .last_shown
            .as_ref()
            .filter(|shown| **shown != key)
            .and_then(|shown| self.store.get(shown))
            .filter(CacheSnapshot::has_data);

        match (placeholder, current) {
            (Some(previous), current) => {
                let mut view = results(&previous, true);
                view.is_fetching = current.as_ref().map_or(true, |c| c.is_fetching);
                view.error = current.and_then(|c| c.error);
                QueryView::Ready(view)
            }
            (None, Some(CacheSnapshot {
                error: Some(error),
                is_fetching: false,
                ..
            })) => QueryView::Failed(error),
            (None, _) => QueryView::Loading,
        }
    }

    /// Fetch the current key if needed and return the resulting view.
    /// Makes no request while idle.
    pub async fn load(&mut self) -> QueryView {
        let Some(key) = self.coordinator.current_key() else {
            return QueryView::Welcome;
        };

        let snapshot = self.store.ensure(&key).await;
        if snapshot.has_data() {
            if let Some(pagination) = snapshot.pagination() {
                self.coordinator.record_pagination(&pagination);
            }
            self.last_shown = Some(key);
        }
        self.view()
    }

    /// Start loading the current key without waiting, and return what can
    /// be shown meanwhile.
    pub fn request(&self) -> QueryView {
        if let Some(key) = self.coordinator.current_key() {
            self.store.prefetch(&key);
        }
        self.view()
    }

    /// Clear the backend cache, invalidate every attendance entry and load
    /// again. A failed backend clear is returned next to the fresh view.
    pub async fn refresh(&mut self) -> (QueryView, Result<usize, RefreshError>) {
        let purged = self.refresh.purge_remote(&KeyMatcher::presence()).await;
        (self.load().await, purged)
    }

    /// Drop all cached data. Returns how many entries were removed.
    pub fn end(mut self) -> usize {
        self.debouncer.cancel();
        self.store.clear()
    }
}

fn results(snapshot: &CacheSnapshot, is_placeholder: bool) -> ResultsView {
    ResultsView {
        key: snapshot.key.clone(),
        page: snapshot.data.clone().unwrap_or_default(),
        is_placeholder,
        is_fetching: snapshot.is_fetching,
        is_stale: snapshot.is_stale,
        error: snapshot.error.clone(),
    }
}

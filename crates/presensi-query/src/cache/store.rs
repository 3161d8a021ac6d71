//! Cache store implementation

use futures::FutureExt;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::cache::entry::{CacheEntry, CacheSnapshot, FetchOutcome, InFlight, PendingFetch};
use crate::cache::{CacheConfig, CacheStats};
use crate::config::RetryConfig;
use crate::error::QueryError;
use crate::key::{KeyMatcher, QueryKey};
use crate::traits::FetchExecutor;

type Entries = Arc<Mutex<HashMap<QueryKey, CacheEntry>>>;

/// Result of looking a key up before deciding whether to fetch.
enum Access {
    Fresh(CacheSnapshot),
    /// Running fetch and the entry generation it started at.
    Pending(InFlight, u64),
}

/// Keyed store of query results with request deduplication.
///
/// At most one fetch runs per key. Each fetch is a spawned task that writes
/// its outcome back into the entry it was started for, so the entry settles
/// even when every caller awaiting it has gone away. Errors are recorded on
/// the entry and never returned as `Err`.
pub struct CacheStore {
    executor: Arc<dyn FetchExecutor>,
    config: CacheConfig,
    entries: Entries,
    next_fetch_id: Arc<AtomicU64>,
}

impl CacheStore {
    pub fn new(executor: Arc<dyn FetchExecutor>, config: CacheConfig) -> Self {
        Self {
            executor,
            config,
            entries: Arc::new(Mutex::new(HashMap::new())),
            next_fetch_id: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Current state of `key` without starting a fetch.
    pub fn get(&self, key: &QueryKey) -> Option<CacheSnapshot> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        sweep(&mut entries, &self.config, now, key);
        entries.get_mut(key).map(|entry| {
            entry.touch(now);
            entry.snapshot(self.config.stale_time, now)
        })
    }

    /// Fresh data for `key`, fetching if it is missing or stale.
    ///
    /// Joins the running fetch when one exists. If the entry is invalidated
    /// while that fetch runs, one more fetch is started once it settles.
    /// The returned snapshot carries the error when the fetch failed.
    pub async fn ensure(&self, key: &QueryKey) -> CacheSnapshot {
        let (in_flight, started_at) = match self.access(key) {
            Access::Fresh(snapshot) => return snapshot,
            Access::Pending(in_flight, generation) => (in_flight, generation),
        };

        let mut outcome = in_flight.await;
        if self.invalidated_since(key, started_at) {
            debug!(key = %key, "Entry invalidated during fetch, refetching");
            outcome = match self.access(key) {
                Access::Fresh(snapshot) => return snapshot,
                Access::Pending(in_flight, _) => in_flight.await,
            };
        }

        let now = Instant::now();
        let entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) => entry.snapshot(self.config.stale_time, now),
            None => CacheSnapshot::detached(key.clone(), outcome, now),
        }
    }

    /// Start fetching `key` in the background unless it is fresh.
    /// Returns whether a fetch is now running.
    pub fn prefetch(&self, key: &QueryKey) -> bool {
        matches!(self.access(key), Access::Pending(..))
    }

    /// Mark matching entries stale, keeping their data. Returns how many
    /// entries were affected.
    pub fn invalidate(&self, matcher: &KeyMatcher) -> usize {
        self.invalidate_where(|key| matcher.matches(key))
    }

    pub fn invalidate_where(&self, predicate: impl Fn(&QueryKey) -> bool) -> usize {
        let mut entries = self.entries.lock();
        let count = entries
            .iter_mut()
            .filter(|(key, _)| predicate(key))
            .map(|(_, entry)| entry.invalidate())
            .filter(|changed| *changed)
            .count();
        debug!(count, "Invalidated cache entries");
        count
    }

    /// Drop matching entries. Running fetches for them are discarded when
    /// they settle.
    pub fn remove(&self, matcher: &KeyMatcher) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|key, _| !matcher.matches(key));
        let removed = before - entries.len();
        debug!(removed, "Removed cache entries");
        removed
    }

    pub fn clear(&self) -> usize {
        let mut entries = self.entries.lock();
        let removed = entries.len();
        entries.clear();
        info!(removed, "Cleared query cache");
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys currently held, in key order.
    pub fn keys(&self) -> Vec<QueryKey> {
        let mut keys: Vec<QueryKey> = self.entries.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let entries = self.entries.lock();
        let mut stats = CacheStats {
            entries: entries.len(),
            fetches_started: self.next_fetch_id.load(Ordering::Relaxed),
            ..Default::default()
        };
        for entry in entries.values() {
            if entry.is_fetching() {
                stats.fetching += 1;
            }
            if !entry.is_fresh(self.config.stale_time, now) {
                stats.stale += 1;
            }
            if entry.error.is_some() {
                stats.failed += 1;
            }
        }
        stats
    }

    fn access(&self, key: &QueryKey) -> Access {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        let entry = entries
            .entry(key.clone())
            .or_insert_with(|| CacheEntry::new(key.clone(), now));
        entry.touch(now);

        let access = if let Some(pending) = &entry.in_flight {
            debug!(key = %key, "Joining in-flight fetch");
            Access::Pending(pending.future.clone(), pending.generation)
        } else if entry.is_fresh(self.config.stale_time, now) {
            Access::Fresh(entry.snapshot(self.config.stale_time, now))
        } else {
            let pending = self.spawn_fetch(key, entry.generation);
            let access = Access::Pending(pending.future.clone(), pending.generation);
            entry.in_flight = Some(pending);
            access
        };

        sweep(&mut entries, &self.config, now, key);
        access
    }

    /// Whether `key` was invalidated after generation `started_at`.
    /// A removed entry counts as not invalidated.
    fn invalidated_since(&self, key: &QueryKey, started_at: u64) -> bool {
        self.entries
            .lock()
            .get(key)
            .is_some_and(|entry| entry.generation != started_at)
    }

    fn spawn_fetch(&self, key: &QueryKey, generation: u64) -> PendingFetch {
        let id = self.next_fetch_id.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(key = %key, fetch_id = id, "Starting fetch");

        let handle = tokio::spawn(run_fetch(
            Arc::clone(&self.executor),
            Arc::clone(&self.entries),
            self.config.retry.clone(),
            key.clone(),
            id,
        ));

        let future = async move {
            handle
                .await
                .unwrap_or_else(|e| Err(QueryError::Internal(format!("fetch task failed: {e}"))))
        }
        .boxed()
        .shared();

        PendingFetch {
            id,
            generation,
            future,
        }
    }
}

/// Run one fetch with retries and write the outcome back to the entry.
async fn run_fetch(
    executor: Arc<dyn FetchExecutor>,
    entries: Entries,
    retry: RetryConfig,
    key: QueryKey,
    fetch_id: u64,
) -> FetchOutcome {
    let mut failures = 0u32;
    let outcome = loop {
        match executor.execute(&key).await {
            Ok(page) => break Ok(page),
            Err(e) if e.is_retriable() && failures < retry.max_retries => {
                failures += 1;
                let backoff = retry.calculate_backoff(failures);
                warn!(
                    key = %key,
                    attempt = failures,
                    backoff_ms = backoff.as_millis() as u64,
                    error = %e,
                    "Fetch failed, retrying"
                );
                {
                    let mut entries = entries.lock();
                    if let Some(entry) = entries.get_mut(&key).filter(|e| e.owns_fetch(fetch_id)) {
                        entry.failure_count = failures;
                    }
                }
                tokio::time::sleep(backoff).await;
            }
            Err(e) => {
                failures += 1;
                warn!(key = %key, attempts = failures, error = %e, "Fetch failed");
                break Err(e);
            }
        }
    };

    let now = Instant::now();
    let mut entries = entries.lock();
    match entries.get_mut(&key) {
        Some(entry) if entry.owns_fetch(fetch_id) => match &outcome {
            Ok(page) => {
                debug!(key = %key, items = page.items.len(), "Fetch settled");
                entry.settle_success(page.clone(), now);
            }
            Err(e) => entry.settle_failure(e.clone(), failures, now),
        },
        _ => debug!(key = %key, fetch_id, "Entry gone before fetch settled, discarding"),
    }
    outcome
}

/// Evict expired entries, then the least recently used ones over the cap.
/// Entries with a running fetch and the entry being accessed are kept.
fn sweep(
    entries: &mut HashMap<QueryKey, CacheEntry>,
    config: &CacheConfig,
    now: Instant,
    keep: &QueryKey,
) {
    let before = entries.len();
    entries.retain(|key, entry| {
        key == keep || entry.is_fetching() || !entry.is_expired(config.cache_lifetime, now)
    });

    if let Some(max) = config.max_entries {
        while entries.len() > max {
            let victim = entries
                .iter()
                .filter(|(key, entry)| *key != keep && !entry.is_fetching())
                .min_by_key(|(_, entry)| entry.last_accessed)
                .map(|(key, _)| key.clone());
            match victim {
                Some(key) => {
                    entries.remove(&key);
                }
                None => break,
            }
        }
    }

    let evicted = before - entries.len();
    if evicted > 0 {
        debug!(evicted, "Evicted cache entries");
    }
}

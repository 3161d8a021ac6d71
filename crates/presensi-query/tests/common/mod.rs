//! Shared fixtures for presensi-query integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use presensi_query::{
    FetchExecutor, PaginationInfo, PresenceClient, PresenceRecord, QueryConfig, QueryError,
    QueryKey, QueryPage, QueryResult, RemoteCache, RetryConfig,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wiremock::MockServer;

pub const PAGE_SIZE: u32 = 15;

/// Wiremock backend plus a config pointing at it.
pub struct TestContext {
    pub server: MockServer,
    pub config: QueryConfig,
}

impl TestContext {
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        let config = QueryConfig::new(format!("{}/api", server.uri()))
            .with_retry(fast_retry(3));
        Self { server, config }
    }

    pub fn client(&self) -> Arc<PresenceClient> {
        Arc::new(PresenceClient::new(&self.config).expect("valid test config"))
    }
}

/// Retry policy with short, deterministic backoff.
pub fn fast_retry(max_retries: u32) -> RetryConfig {
    RetryConfig::new(max_retries)
        .with_initial_backoff(10)
        .without_jitter()
}

/// One attendance row as the backend sends it.
pub fn record_json(n: usize) -> Value {
    json!({
        "Nama Tentor": format!("Tutor {n}"),
        "Email Address": format!("student{n}@example.com"),
        "Nama Siswa": format!("Student {n}"),
        "Hari dan Tanggal Les": "14/03/2024",
        "Jam Kegiatan Les": "15:30",
        "Durasi Les": "90 menit",
        "Timestamp": format!("2024-03-14T15:{:02}:00Z", n % 60)
    })
}

/// A `POST /data/query` response body for `page` of `total_items`.
pub fn query_response(page: u32, total_items: u64) -> Value {
    let pagination = PaginationInfo::from_totals(page, total_items, PAGE_SIZE);
    let start = (page.saturating_sub(1) * PAGE_SIZE) as u64;
    let end = (start + u64::from(PAGE_SIZE)).min(total_items);
    let data: Vec<Value> = (start..end).map(|n| record_json(n as usize)).collect();
    json!({
        "data": data,
        "pagination": pagination,
        "cached": false
    })
}

/// In-process executor counting calls per key.
///
/// Rows of a search carry the search text as tutor name.
pub struct MockExecutor {
    calls: Mutex<Vec<QueryKey>>,
    total_items: u64,
    delay: Duration,
    search_delays: Mutex<HashMap<String, Duration>>,
    failure: Mutex<Option<QueryError>>,
}

impl MockExecutor {
    pub fn new(total_items: u64) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            total_items,
            delay: Duration::from_millis(100),
            search_delays: Mutex::new(HashMap::new()),
            failure: Mutex::new(None),
        })
    }

    /// Answer keys searching for `search` after `delay` instead.
    pub fn delay_search(&self, search: &str, delay: Duration) {
        self.search_delays.lock().insert(search.to_string(), delay);
    }

    pub fn fail_with(&self, error: Option<QueryError>) {
        *self.failure.lock() = error;
    }

    pub fn calls(&self) -> Vec<QueryKey> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl FetchExecutor for MockExecutor {
    async fn execute(&self, key: &QueryKey) -> QueryResult<QueryPage> {
        self.calls.lock().push(key.clone());
        let delay = self
            .search_delays
            .lock()
            .get(&key.search)
            .copied()
            .unwrap_or(self.delay);
        tokio::time::sleep(delay).await;

        if let Some(error) = self.failure.lock().clone() {
            return Err(error);
        }

        let pagination = PaginationInfo::from_totals(key.page, self.total_items, key.page_size);
        let start = u64::from(key.page - 1) * u64::from(key.page_size);
        let end = (start + u64::from(key.page_size)).min(self.total_items);
        let mut items = (start..end)
            .map(|n| serde_json::from_value::<PresenceRecord>(record_json(n as usize)))
            .collect::<Result<Vec<_>, _>>()?;
        if key.has_search() {
            for item in &mut items {
                item.tutor_name = key.search.clone();
            }
        }

        Ok(QueryPage {
            items,
            pagination: Some(pagination),
            cached: false,
        })
    }
}

/// Backend cache endpoint stand-in.
pub struct MockRemote {
    pub calls: AtomicUsize,
    pub fail: bool,
}

impl MockRemote {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail: false,
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail: true,
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteCache for MockRemote {
    async fn clear_remote_cache(&self) -> QueryResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(QueryError::Server {
                status: 502,
                message: "Bad Gateway".into(),
                payload: None,
            });
        }
        Ok(())
    }
}

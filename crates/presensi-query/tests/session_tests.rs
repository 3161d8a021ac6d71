//! Integration tests for the browsing session
//!
//! Tests cover:
//! - No requests while idle
//! - Search, year, paging and refresh flows
//! - Previous data shown while a new key loads
//! - Debounced live search

mod common;

use common::{MockExecutor, MockRemote, PAGE_SIZE};
use presensi_query::{
    Phase, PresenceSession, QueryConfig, QueryError, QueryView, RefreshError, SearchFilter,
};
use serde_json::json;
use std::time::Duration;

fn config() -> QueryConfig {
    QueryConfig::default().with_retry(common::fast_retry(3))
}

#[tokio::test(start_paused = true)]
async fn test_idle_session_never_fetches() {
    let executor = MockExecutor::new(30);
    let mut session = PresenceSession::new(&config(), executor.clone(), MockRemote::ok());

    assert_eq!(session.phase(), Phase::Idle);
    assert!(session.view().is_welcome());
    assert!(session.load().await.is_welcome());
    assert!(session.request().is_welcome());

    session.change_year("2024");
    session.type_query("Jane");
    assert!(session.load().await.is_welcome());
    assert_eq!(executor.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_submitted_name_fetches_with_teacher_filter() {
    let executor = MockExecutor::new(4);
    let mut session = PresenceSession::new(&config(), executor.clone(), MockRemote::ok());

    session.type_query("Jane");
    session.submit_search("Jane");
    let view = session.load().await;

    let calls = executor.calls();
    assert_eq!(calls.len(), 1);
    let request = calls[0].to_request();
    assert_eq!(request.search, Some(json!({"teacher": "Jane"})));
    assert!(request.year.is_none());
    assert_eq!(calls[0].filter(), Some(SearchFilter::SingleField("Jane".into())));

    let results = view.results().unwrap();
    assert_eq!(results.page.items.len(), 4);
    assert!(!results.is_placeholder);
}

#[tokio::test(start_paused = true)]
async fn test_year_submission_resets_page() {
    let executor = MockExecutor::new(60);
    let mut session = PresenceSession::new(&config(), executor.clone(), MockRemote::ok());

    session.change_year("2023");
    session.submit_search("");
    session.load().await;
    assert!(session.change_page(3));
    session.load().await;

    session.change_year("2024");
    session.submit_search("");
    assert_eq!(session.coordinator().current_page(), 1);
    session.load().await;

    let last = executor.calls().pop().unwrap();
    let request = last.to_request();
    assert_eq!(request.year.as_deref(), Some("2024"));
    assert!(request.search.is_none());
    assert_eq!(request.page, 1);
}

#[tokio::test(start_paused = true)]
async fn test_paging_fetches_new_key_and_keeps_previous() {
    let executor = MockExecutor::new(3 * u64::from(PAGE_SIZE));
    let mut session = PresenceSession::new(&config(), executor.clone(), MockRemote::ok());

    session.change_year("2024");
    session.submit_search("");
    session.load().await;
    assert_eq!(session.coordinator().total_pages(), Some(3));

    assert!(session.change_page(2));
    session.load().await;

    let calls = executor.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].page, 2);
    assert_ne!(calls[0], calls[1]);
    assert!(session.store().get(&calls[0]).unwrap().has_data());

    assert!(session.change_page(1));
    session.load().await;
    assert_eq!(executor.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_change_page_is_clamped() {
    let executor = MockExecutor::new(3 * u64::from(PAGE_SIZE));
    let mut session = PresenceSession::new(&config(), executor.clone(), MockRemote::ok());

    session.submit_search("Jane");
    session.load().await;

    session.change_page(0);
    assert_eq!(session.coordinator().current_page(), 1);
    session.change_page(3 + 5);
    assert_eq!(session.coordinator().current_page(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_refresh_after_failed_purge_refetches() {
    let executor = MockExecutor::new(30);
    let remote = MockRemote::failing();
    let mut session = PresenceSession::new(&config(), executor.clone(), remote.clone());

    session.change_year("2024");
    session.submit_search("");
    session.load().await;
    session.load().await;
    assert_eq!(executor.call_count(), 1);

    let (view, purged) = session.refresh().await;

    assert_eq!(remote.call_count(), 1);
    assert!(matches!(
        purged,
        Err(RefreshError::RemotePurgeFailed { invalidated: 1, .. })
    ));
    assert_eq!(executor.call_count(), 2);
    let results = view.results().unwrap();
    assert!(!results.is_stale);
}

#[tokio::test(start_paused = true)]
async fn test_refresh_reports_purged_entries() {
    let executor = MockExecutor::new(30);
    let mut session = PresenceSession::new(&config(), executor.clone(), MockRemote::ok());

    session.submit_search("Jane");
    session.load().await;
    let (_, purged) = session.refresh().await;
    assert_eq!(purged.unwrap(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_previous_page_is_shown_while_next_loads() {
    let executor = MockExecutor::new(3 * u64::from(PAGE_SIZE));
    let mut session = PresenceSession::new(&config(), executor.clone(), MockRemote::ok());

    session.change_year("2024");
    session.submit_search("");
    session.load().await;

    session.change_page(2);
    let view = session.request();
    let results = view.results().expect("placeholder rows");
    assert!(results.is_placeholder);
    assert!(results.is_fetching);
    assert_eq!(results.key.page, 1);

    tokio::time::sleep(Duration::from_millis(200)).await;
    let view = session.view();
    let results = view.results().unwrap();
    assert!(!results.is_placeholder);
    assert_eq!(results.key.page, 2);
}

#[tokio::test(start_paused = true)]
async fn test_first_load_shows_loading_then_failure() {
    let executor = MockExecutor::new(30);
    executor.fail_with(Some(QueryError::ClientQuery {
        status: 400,
        message: "bad search".into(),
        payload: None,
    }));
    let mut session = PresenceSession::new(&config(), executor.clone(), MockRemote::ok());

    session.submit_search("{\"teachr\":1}");
    assert!(matches!(session.request(), QueryView::Loading));

    match session.load().await {
        QueryView::Failed(QueryError::ClientQuery { message, .. }) => {
            assert_eq!(message, "bad search")
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(executor.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_failure_keeps_placeholder_with_error() {
    let executor = MockExecutor::new(30);
    let mut session = PresenceSession::new(&config(), executor.clone(), MockRemote::ok());

    session.submit_search("Jane");
    session.load().await;

    executor.fail_with(Some(QueryError::ClientQuery {
        status: 400,
        message: "bad search".into(),
        payload: None,
    }));
    session.submit_search("Budi");
    let view = session.load().await;

    let results = view.results().unwrap();
    assert!(results.is_placeholder);
    assert!(!results.is_fetching);
    assert!(results.error.is_some());
    assert_eq!(results.key.search, "Jane");
}

#[tokio::test(start_paused = true)]
async fn test_live_search_submits_after_typing_pauses() {
    let executor = MockExecutor::new(30);
    let mut session = PresenceSession::new(
        &config().with_debounce_ms(500),
        executor.clone(),
        MockRemote::ok(),
    );

    for text in ["J", "Ja", "Jan", "Jane"] {
        session.type_query(text);
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert_eq!(session.phase(), Phase::Idle);
    assert_eq!(session.coordinator().state().draft_query, "Jane");

    assert!(session.next_settled_query().await);
    assert_eq!(session.coordinator().state().active_query, "Jane");
    session.load().await;

    let calls = executor.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].search, "Jane");
}

#[tokio::test(start_paused = true)]
async fn test_end_clears_cache() {
    let executor = MockExecutor::new(30);
    let mut session = PresenceSession::new(&config(), executor, MockRemote::ok());

    session.submit_search("Jane");
    session.load().await;
    let store = session.store().clone();
    assert_eq!(store.len(), 1);

    assert_eq!(session.end(), 1);
    assert!(store.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_refresh_while_loading_fetches_again() {
    let executor = MockExecutor::new(30);
    let mut session = PresenceSession::new(&config(), executor.clone(), MockRemote::ok());

    session.submit_search("Jane");
    assert!(matches!(session.request(), QueryView::Loading));

    let (view, purged) = session.refresh().await;

    assert_eq!(purged.unwrap(), 1);
    assert_eq!(executor.call_count(), 2);
    let results = view.results().unwrap();
    assert!(!results.is_stale);
    assert!(!results.is_fetching);
    assert!(!results.is_placeholder);
}

#[tokio::test(start_paused = true)]
async fn test_slow_superseded_search_does_not_overwrite_current() {
    let executor = MockExecutor::new(4);
    executor.delay_search("Jane", Duration::from_millis(500));
    let mut session = PresenceSession::new(&config(), executor.clone(), MockRemote::ok());

    session.submit_search("Jane");
    session.request();
    let jane = session.current_key().unwrap();

    session.submit_search("Budi");
    let view = session.load().await;
    let budi = session.current_key().unwrap();
    assert_eq!(view.results().unwrap().key, budi);

    tokio::time::sleep(Duration::from_millis(600)).await;

    let view = session.view();
    let results = view.results().unwrap();
    assert_eq!(results.key, budi);
    assert!(!results.is_placeholder);
    assert!(results.page.items.iter().all(|r| r.tutor_name == "Budi"));

    let jane_entry = session.store().get(&jane).unwrap();
    assert_eq!(jane_entry.items().len(), 4);
    assert!(jane_entry.items().iter().all(|r| r.tutor_name == "Jane"));
    assert_eq!(executor.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_explicit_submit_discards_unread_settled_input() {
    let executor = MockExecutor::new(30);
    let mut session = PresenceSession::new(
        &config().with_debounce_ms(500),
        executor,
        MockRemote::ok(),
    );

    session.type_query("Ja");
    tokio::time::sleep(Duration::from_millis(600)).await;
    session.submit_search("Jane");

    let settled = tokio::time::timeout(Duration::from_secs(1), session.next_settled_query()).await;
    assert!(settled.is_err());
    assert_eq!(session.coordinator().state().active_query, "Jane");
}

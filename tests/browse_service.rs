//! Browse Service Tests
//!
//! Tests for service invariants:
//! - A timed-out or failed fetch leaves the session cursor untouched
//! - Concurrent navigation on one session is rejected
//! - Count policy: size estimates without a filter, exact count with one
//! - Count failures never hide rows
//! - Store rejections carry the statement verbatim

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use keyspace_browser::browse::{
    BrowseConfig, BrowseError, BrowseService, CountRequest, ExecuteRequest, FetchPageRequest,
    NavAction, NavigateRequest,
};
use keyspace_browser::envelope::SortSpec;
use keyspace_browser::executor::{
    ExecutionRequest, ExecutorError, ExecutorResult, MemoryStore, PageResult, Row, SeedTable,
    StatementExecutor,
};
use keyspace_browser::query::RawFilter;
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

fn users() -> MemoryStore {
    let rows: Vec<Row> = [
        ("ann", "active", 4.5),
        ("bob", "idle", 3.0),
        ("cid", "active", 2.5),
        ("dee", "active", 5.0),
        ("eve", "idle", 1.0),
    ]
    .iter()
    .enumerate()
    .map(|(i, (name, status, score))| {
        json!({ "id": i + 1, "name": name, "status": status, "score": score })
            .as_object()
            .cloned()
            .unwrap()
    })
    .collect();

    MemoryStore::from_tables(vec![SeedTable::new("app", "users")
        .with_partition_key(&["id"])
        .with_rows(rows)
        .with_size_estimate(1200)])
}

fn config() -> BrowseConfig {
    BrowseConfig {
        executor_timeout_ms: 100,
        count_timeout_ms: 100,
        ..Default::default()
    }
}

/// Wraps the store; can stall row fetches or fail size-estimate lookups.
struct Flaky {
    inner: MemoryStore,
    stall_rows: AtomicBool,
    fail_estimates: AtomicBool,
    calls: AtomicUsize,
}

impl Flaky {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: users(),
            stall_rows: AtomicBool::new(false),
            fail_estimates: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        })
    }
}

impl StatementExecutor for Flaky {
    fn execute(&self, request: &ExecutionRequest) -> ExecutorResult<PageResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let is_estimate = request.statement.contains("size_estimates");
        if is_estimate && self.fail_estimates.load(Ordering::SeqCst) {
            return Err(ExecutorError::unavailable("system tables unreadable"));
        }
        if !is_estimate && self.stall_rows.load(Ordering::SeqCst) {
            std::thread::sleep(Duration::from_millis(400));
        }
        self.inner.execute(request)
    }
}

fn nav(action: NavAction) -> NavigateRequest {
    NavigateRequest::new(action, "app", "users").with_page_size(2)
}

// =============================================================================
// Page Fetch Tests
// =============================================================================

#[tokio::test]
async fn test_fetch_page_envelope() {
    let service = BrowseService::new(Arc::new(users()), config());
    let envelope = service
        .fetch_page(FetchPageRequest::new("app", "users").with_page_size(2))
        .await
        .unwrap();

    assert_eq!(envelope.returned_count, 2);
    assert_eq!(envelope.page_size, 2);
    assert!(envelope.has_more);
    assert!(envelope.next_token.is_some());
    assert_eq!(envelope.statement_text, "SELECT * FROM app.users LIMIT 2");
    assert!(!envelope.requires_full_scan);
    assert_eq!(envelope.estimate.as_ref().map(|e| (e.value, e.exact)), Some((1200, false)));
    assert_eq!(envelope.page_number, None);

    let next = service
        .fetch_page(
            FetchPageRequest::new("app", "users")
                .with_page_size(2)
                .with_page_token(envelope.next_token.clone().unwrap())
                .without_count(),
        )
        .await
        .unwrap();
    assert_eq!(next.rows[0]["name"], "cid");
    assert_eq!(next.estimate, None);
}

#[tokio::test]
async fn test_filtered_page_with_sort() {
    let service = BrowseService::new(Arc::new(users()), config());
    let envelope = service
        .fetch_page(
            FetchPageRequest::new("app", "users")
                .with_filter(RawFilter::new("status", "eq", "active"))
                .with_sort(SortSpec::desc("score")),
        )
        .await
        .unwrap();

    let names: Vec<&str> = envelope.rows.iter().map(|r| r["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["dee", "ann", "cid"]);
    assert!(envelope.requires_full_scan);
    assert!(envelope.statement_text.ends_with("ALLOW FILTERING"));

    let estimate = envelope.estimate.unwrap();
    assert!(estimate.exact);
    assert_eq!(estimate.value, 3);
}

#[tokio::test]
async fn test_page_size_defaults_and_clamps() {
    let service = BrowseService::new(
        Arc::new(users()),
        BrowseConfig {
            max_result_limit: 3,
            default_page_size: 3,
            ..config()
        },
    );

    let envelope = service
        .fetch_page(FetchPageRequest::new("app", "users").with_page_size(50))
        .await
        .unwrap();
    assert_eq!(envelope.page_size, 3);
    assert_eq!(envelope.statement_text, "SELECT * FROM app.users LIMIT 3");

    let envelope = service
        .fetch_page(FetchPageRequest::new("app", "users").with_page_size(0))
        .await
        .unwrap();
    assert_eq!(envelope.page_size, 1);
}

#[tokio::test]
async fn test_invalid_filter_never_reaches_store() {
    let store = Flaky::new();
    let service = BrowseService::new(store.clone(), config());

    let err = service
        .fetch_page(FetchPageRequest::new("app", "users").with_filter(RawFilter {
            column: None,
            operator: Some("eq".into()),
            value: Some("x".into()),
        }))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "INVALID_FILTER");
    assert_eq!(store.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_rejected_statement_is_verbatim() {
    let service = BrowseService::new(Arc::new(users()), config());
    let err = service
        .fetch_page(FetchPageRequest::new("app", "nope").without_count())
        .await
        .unwrap_err();

    assert_eq!(err.code(), "REJECTED_STATEMENT");
    assert_eq!(err.statement(), Some("SELECT * FROM app.nope LIMIT 100"));
}

#[tokio::test]
async fn test_count_failure_keeps_rows() {
    let store = Flaky::new();
    store.fail_estimates.store(true, Ordering::SeqCst);
    let service = BrowseService::new(store, config());

    let envelope = service
        .fetch_page(FetchPageRequest::new("app", "users"))
        .await
        .unwrap();
    assert_eq!(envelope.returned_count, 5);
    assert_eq!(envelope.estimate, None);
    assert_eq!(envelope.count_error.unwrap().code, "COUNT_UNAVAILABLE");
}

#[tokio::test]
async fn test_slow_rows_do_not_cancel_count() {
    let store = Flaky::new();
    store.stall_rows.store(true, Ordering::SeqCst);
    let service = BrowseService::new(store, config());

    let err = service
        .fetch_page(FetchPageRequest::new("app", "users"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "EXECUTOR_TIMEOUT");

    // The count path is independent and still answers on its own
    let estimate = service
        .estimate_count(CountRequest::new("app", "users"))
        .await
        .unwrap();
    assert_eq!(estimate.value, 1200);
}

// =============================================================================
// Count Tests
// =============================================================================

#[tokio::test]
async fn test_count_policy() {
    let service = BrowseService::new(Arc::new(users()), config());

    let unfiltered = service
        .estimate_count(CountRequest::new("app", "users"))
        .await
        .unwrap();
    assert!(!unfiltered.exact);
    assert_eq!(unfiltered.warning, None);

    let filtered = service
        .estimate_count(
            CountRequest::new("app", "users").with_filter(RawFilter::new("status", "eq", "active")),
        )
        .await
        .unwrap();
    assert!(filtered.exact);
    assert_eq!(filtered.value, 3);
    assert!(filtered.warning.is_some());
}

#[tokio::test]
async fn test_count_unavailable_and_fallback() {
    let store = Flaky::new();
    store.fail_estimates.store(true, Ordering::SeqCst);

    let strict = BrowseService::new(store.clone(), config());
    let err = strict
        .estimate_count(CountRequest::new("app", "users"))
        .await
        .unwrap_err();
    assert!(matches!(err, BrowseError::Count(_)));
    assert_eq!(err.code(), "COUNT_UNAVAILABLE");

    let lenient = BrowseService::new(
        store,
        BrowseConfig {
            count_fallback: true,
            ..config()
        },
    );
    let estimate = lenient
        .estimate_count(CountRequest::new("app", "users"))
        .await
        .unwrap();
    assert!(estimate.exact);
    assert_eq!(estimate.value, 5);
}

// =============================================================================
// Session Tests
// =============================================================================

#[tokio::test]
async fn test_timeout_leaves_cursor_unchanged() {
    let store = Flaky::new();
    let service = BrowseService::new(store.clone(), config());
    let session = service.create_session().session_id;

    service.navigate(&session, nav(NavAction::First)).await.unwrap();
    let second = service.navigate(&session, nav(NavAction::Next)).await.unwrap();
    assert_eq!(second.page_number, Some(2));

    store.stall_rows.store(true, Ordering::SeqCst);
    let err = service
        .navigate(&session, nav(NavAction::Next))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "EXECUTOR_TIMEOUT");
    let err = service
        .navigate(&session, nav(NavAction::Previous))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "EXECUTOR_TIMEOUT");
    store.stall_rows.store(false, Ordering::SeqCst);

    let current = service
        .navigate(&session, nav(NavAction::Current))
        .await
        .unwrap();
    assert_eq!(current.page_number, Some(2));
    assert_eq!(current.rows, second.rows);

    let third = service.navigate(&session, nav(NavAction::Next)).await.unwrap();
    assert_eq!(third.page_number, Some(3));
    assert_eq!(third.rows[0]["name"], "eve");
}

#[tokio::test]
async fn test_concurrent_navigation_rejected() {
    let service = BrowseService::new(Arc::new(users()), config());
    let session = service.create_session().session_id;

    let held = service.sessions().lease(&session).unwrap();
    let err = service
        .navigate(&session, nav(NavAction::First))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "CONCURRENT_CURSOR_MUTATION");

    drop(held);
    assert!(service.navigate(&session, nav(NavAction::First)).await.is_ok());
}

#[tokio::test]
async fn test_overlapping_navigations_one_wins() {
    let store = Flaky::new();
    store.stall_rows.store(true, Ordering::SeqCst);
    let service = Arc::new(BrowseService::new(
        store,
        BrowseConfig {
            executor_timeout_ms: 2_000,
            ..config()
        },
    ));
    let session = service.create_session().session_id;

    let (a, b) = tokio::join!(
        service.navigate(&session, nav(NavAction::First).without_count()),
        async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            service
                .navigate(&session, nav(NavAction::First).without_count())
                .await
        }
    );

    assert!(a.is_ok());
    assert_eq!(b.unwrap_err().code(), "CONCURRENT_CURSOR_MUTATION");
}

#[tokio::test]
async fn test_unknown_and_closed_sessions() {
    let service = BrowseService::new(Arc::new(users()), config());

    let err = service
        .navigate("no-such-session", nav(NavAction::First))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "UNKNOWN_SESSION");

    assert!(service.sessions().is_empty());

    let session = service.create_session().session_id;
    service.navigate(&session, nav(NavAction::First)).await.unwrap();
    service.close_session(&session).unwrap();

    // A closed session is never brought back by a later navigation
    let err = service
        .navigate(&session, nav(NavAction::Current))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "UNKNOWN_SESSION");
    assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
    assert!(!service.sessions().contains(&session));

    assert_eq!(
        service.close_session(&session).unwrap_err().code(),
        "UNKNOWN_SESSION"
    );
}

// =============================================================================
// Ad-hoc Statement Tests
// =============================================================================

#[tokio::test]
async fn test_execute_raw_statement() {
    let service = BrowseService::new(Arc::new(users()), config());

    let envelope = service
        .execute_raw(ExecuteRequest {
            statement: "SELECT name FROM app.users WHERE score > 2.9 ALLOW FILTERING".to_string(),
            page_size: Some(10),
            page_token: None,
        })
        .await
        .unwrap();
    assert_eq!(envelope.returned_count, 3);
    assert!(envelope.requires_full_scan);
    assert_eq!(envelope.estimate, None);

    let statement = "SELECT * FROM app.users WHERE status = 'idle'";
    let err = service
        .execute_raw(ExecuteRequest {
            statement: statement.to_string(),
            page_size: None,
            page_token: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.code(), "REJECTED_STATEMENT");
    assert_eq!(err.statement(), Some(statement));
}

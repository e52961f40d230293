use serde_json::json;
use tokio::sync::oneshot;

use super::*;
use crate::net::api::CryptoService;
use crate::net::gateway::test_helpers::*;
use crate::net::types::{CryptoPage, Currency, ListQuery};

async fn let_tasks_start() {
    for _ in 0..3 {
        tokio::task::yield_now().await;
    }
}

// =============================================================================
// failure_message
// =============================================================================

#[test]
fn failure_message_prefers_backend_detail() {
    let err = ApiError::Status { status: 422, detail: Some("field required".into()) };
    assert_eq!(failure_message(&err), "field required");
}

#[test]
fn failure_message_falls_back_to_display() {
    let err = ApiError::Network("connection refused".into());
    assert_eq!(failure_message(&err), err.to_string());
}

#[test]
fn failure_message_falls_back_to_unknown() {
    assert_eq!(failure_message(&String::new()), UNKNOWN_ERROR);
    assert_eq!(failure_message(&"  ".to_owned()), UNKNOWN_ERROR);
}

// =============================================================================
// execute / reset
// =============================================================================

#[test]
fn starts_at_initial_value() {
    let state = RequestState::new(vec![1, 2]);
    assert_eq!(
        state.snapshot(),
        RequestSnapshot { data: vec![1, 2], loading: false, error: String::new() }
    );
}

#[tokio::test]
async fn successful_execute_stores_data() {
    let state = RequestState::new(0);
    let value = state.execute(|| async { Ok::<_, String>(7) }).await;

    assert_eq!(value, Ok(7));
    assert_eq!(state.data(), 7);
    assert!(!state.loading());
    assert_eq!(state.error(), "");
}

#[tokio::test]
async fn failed_execute_keeps_previous_data() {
    let state = RequestState::new(0);
    state.execute(|| async { Ok::<_, String>(3) }).await.unwrap();

    let err = state
        .execute(|| async { Err::<i32, _>("boom".to_owned()) })
        .await
        .unwrap_err();

    assert_eq!(err, "boom");
    assert_eq!(state.data(), 3);
    assert_eq!(state.error(), "boom");
    assert!(!state.loading());
}

#[tokio::test]
async fn execute_clears_previous_error() {
    let state = RequestState::new(0);
    state.set_error("stale");
    state.execute(|| async { Ok::<_, String>(1) }).await.unwrap();
    assert_eq!(state.error(), "");
}

#[tokio::test]
async fn reset_after_failure_restores_initial() {
    let state = RequestState::new(vec![0]);
    state.set_data(vec![4, 5]);
    let _ = state
        .execute(|| async { Err::<Vec<i32>, _>("nope".to_owned()) })
        .await;

    state.reset();

    assert_eq!(state.data(), vec![0]);
    assert_eq!(state.error(), "");
    assert!(!state.loading());
}

#[tokio::test]
async fn reset_during_execute_discards_result() {
    let state = RequestState::new(0);
    let (tx, rx) = oneshot::channel::<i32>();
    let worker = state.clone();
    let handle = tokio::spawn(async move {
        worker
            .execute(|| async { rx.await.map_err(|e| e.to_string()) })
            .await
    });
    let_tasks_start().await;
    assert!(state.loading());

    state.reset();
    tx.send(9).unwrap();

    assert_eq!(handle.await.unwrap(), Ok(9));
    assert_eq!(state.data(), 0);
    assert!(!state.loading());
}

#[tokio::test]
async fn overlapping_executes_keep_loading_until_all_settle() {
    let state = RequestState::new(0);
    let (tx_a, rx_a) = oneshot::channel::<i32>();
    let (tx_b, rx_b) = oneshot::channel::<i32>();

    let worker = state.clone();
    let first = tokio::spawn(async move {
        worker
            .execute(|| async { rx_a.await.map_err(|e| e.to_string()) })
            .await
    });
    let worker = state.clone();
    let second = tokio::spawn(async move {
        worker
            .execute(|| async { rx_b.await.map_err(|e| e.to_string()) })
            .await
    });
    let_tasks_start().await;

    tx_a.send(1).unwrap();
    first.await.unwrap().unwrap();
    assert!(state.loading());
    assert_eq!(state.data(), 1);

    tx_b.send(2).unwrap();
    second.await.unwrap().unwrap();
    assert!(!state.loading());
    assert_eq!(state.data(), 2);
}

#[tokio::test]
async fn dropped_execute_releases_loading() {
    let state = RequestState::new(0);
    let (_tx, rx) = oneshot::channel::<i32>();
    let worker = state.clone();
    let handle = tokio::spawn(async move {
        worker
            .execute(|| async { rx.await.map_err(|e| e.to_string()) })
            .await
    });
    let_tasks_start().await;
    assert!(state.loading());

    handle.abort();
    assert!(handle.await.unwrap_err().is_cancelled());
    assert!(!state.loading());
}

// =============================================================================
// with endpoint services
// =============================================================================

#[tokio::test]
async fn listing_page_lands_in_state() {
    let h = Harness::new(
        Some("tok"),
        vec![ok(json!({
            "current_page": 2,
            "cryptocurrencies": [{ "id": "bitcoin", "symbol": "btc", "name": "Bitcoin" }]
        }))],
    );
    let crypto = CryptoService::new(h.gateway.clone());
    let state = RequestState::new(CryptoPage::default());
    let query = ListQuery { currency: Currency::Eur, page: 2, per_page: 10 };

    state.execute(|| crypto.list(&query)).await.unwrap();

    let snapshot = state.snapshot();
    assert_eq!(snapshot.data.cryptocurrencies.len(), 1);
    assert_eq!(snapshot.data.cryptocurrencies[0].id, "bitcoin");
    assert!(!snapshot.loading);
    assert_eq!(snapshot.error, "");
}

#[tokio::test]
async fn backend_detail_becomes_error_message() {
    let h = Harness::new(Some("tok"), vec![status(404, json!({ "detail": "Cryptocurrency not found" }))]);
    let crypto = CryptoService::new(h.gateway.clone());
    let state = RequestState::new(CryptoPage::default());
    let query = ListQuery::default();

    let err = state
        .execute(|| crypto.list(&query))
        .await
        .unwrap_err();

    assert_eq!(err, "Cryptocurrency not found");
    assert_eq!(state.error(), "Cryptocurrency not found");
}

use serde_json::json;

use super::*;
use crate::net::gateway::test_helpers::*;
use crate::net::transport::{Method, RequestBody};

// =============================================================================
// endpoint paths
// =============================================================================

#[test]
fn user_endpoint_formats_expected_path() {
    assert_eq!(user_endpoint(42), "/42");
}

#[test]
fn history_endpoint_formats_expected_path() {
    assert_eq!(history_endpoint("bitcoin"), "/cryptocurrencies/bitcoin/history");
}

#[test]
fn favorite_endpoint_formats_expected_path() {
    assert_eq!(favorite_endpoint(3), "/favorites/3");
}

// =============================================================================
// services
// =============================================================================

#[tokio::test]
async fn login_posts_form_fields() {
    let h = Harness::new(None, vec![ok(json!({ "access_token": "tok", "token_type": "bearer" }))]);
    let token = UserService::new(h.gateway.clone())
        .login(&Credentials::new("a", "b"))
        .await
        .unwrap();

    assert_eq!(token.access_token, "tok");
    let sent = &h.transport.requests()[0];
    assert_eq!(sent.method, Method::Post);
    assert_eq!(sent.path, LOGIN_PATH);
    assert_eq!(
        sent.body,
        RequestBody::Form(vec![("username".to_owned(), "a".to_owned()), ("password".to_owned(), "b".to_owned())])
    );
}

#[tokio::test]
async fn signup_passes_body_through() {
    let h = Harness::new(None, vec![ok(json!({ "id": 5, "name": "new" }))]);
    let created = UserService::new(h.gateway.clone())
        .signup(&NewUser { name: "new".into(), password: "pw".into(), role: None })
        .await
        .unwrap();

    assert_eq!(created["id"], 5);
    assert_eq!(h.transport.requests()[0].path, SIGNUP_PATH);
}

#[tokio::test]
async fn update_user_puts_partial_body() {
    let h = Harness::new(Some("tok"), vec![ok(json!({ "id": 2, "name": "renamed" }))]);
    let update = UserUpdate { name: Some("renamed".into()), ..UserUpdate::default() };
    let user = UserService::new(h.gateway.clone())
        .update_user(2, &update)
        .await
        .unwrap();

    assert_eq!(user.name, "renamed");
    let sent = &h.transport.requests()[0];
    assert_eq!(sent.method, Method::Put);
    assert_eq!(sent.body, RequestBody::Json(json!({ "name": "renamed" })));
}

#[tokio::test]
async fn list_sends_paging_query() {
    let h = Harness::new(Some("tok"), vec![ok(json!({ "current_page": 2, "cryptocurrencies": [] }))]);
    let query = ListQuery { currency: Currency::Eur, page: 2, per_page: 10 };
    let page = CryptoService::new(h.gateway.clone())
        .list(&query)
        .await
        .unwrap();

    assert_eq!(page.current_page, Some(2));
    assert_eq!(h.transport.requests()[0].query, query.query_pairs());
}

#[tokio::test]
async fn history_rejects_blank_id_without_request() {
    let h = Harness::new(Some("tok"), Vec::new());
    let err = CryptoService::new(h.gateway.clone())
        .history("  ", &HistoryQuery::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::InvalidRequest(_)));
    assert!(h.transport.requests().is_empty());
}

#[tokio::test]
async fn summary_sends_currency() {
    let h = Harness::new(Some("tok"), vec![ok(json!({ "top_market_cap": [] }))]);
    MarketService::new(h.gateway.clone())
        .summary(Currency::Eur)
        .await
        .unwrap();

    let sent = &h.transport.requests()[0];
    assert_eq!(sent.path, MARKET_SUMMARY_PATH);
    assert_eq!(sent.query, vec![("currency".to_owned(), "eur".to_owned())]);
}

#[tokio::test]
async fn add_favorite_lowercases_coin_id() {
    let h = Harness::new(Some("tok"), vec![ok(json!({ "id": 1, "coin_id": "btc", "user_id": 7 }))]);
    let favorite = FavoriteService::new(h.gateway.clone())
        .add("BTC")
        .await
        .unwrap();

    assert_eq!(favorite.coin_id, "btc");
    assert_eq!(h.transport.requests()[0].body, RequestBody::Json(json!({ "coin_id": "btc" })));
}

#[tokio::test]
async fn remove_favorite_ignores_empty_body() {
    let h = Harness::new(Some("tok"), vec![Ok(crate::net::transport::InboundResponse::new(204, ""))]);
    FavoriteService::new(h.gateway.clone())
        .remove(3)
        .await
        .unwrap();

    let sent = &h.transport.requests()[0];
    assert_eq!(sent.method, Method::Delete);
    assert_eq!(sent.path, "/favorites/3");
}

use super::*;
use crate::net::transport::{Method, RequestBody};

#[test]
fn before_send_attaches_bearer_header() {
    let credential = Credential::new("abc").unwrap();
    let request = before_send(OutboundRequest::new(Method::Get, "/logado"), Some(&credential));
    assert_eq!(request.header("authorization"), Some("Bearer abc"));
}

#[test]
fn before_send_without_credential_is_identity() {
    let original = OutboundRequest::new(Method::Post, "/favorites")
        .with_query(vec![("currency".to_owned(), "usd".to_owned())])
        .with_body(RequestBody::Json(serde_json::json!({ "coin_id": "btc" })));
    let request = before_send(original.clone(), None);
    assert_eq!(request, original);
}

#[test]
fn before_send_only_adds_one_header() {
    let credential = Credential::new("abc").unwrap();
    let original = OutboundRequest::new(Method::Delete, "/favorites/3");
    let request = before_send(original.clone(), Some(&credential));
    assert_eq!(request.headers.len(), 1);
    assert_eq!(request.path, original.path);
    assert_eq!(request.body, original.body);
}

#[test]
fn after_receive_flags_authenticated_401() {
    assert_eq!(after_receive(401, true), ResponseVerdict::Unauthorized);
}

#[test]
fn after_receive_passes_anonymous_401() {
    assert_eq!(after_receive(401, false), ResponseVerdict::Pass);
}

#[test]
fn after_receive_passes_other_failures() {
    for status in [200, 403, 404, 422, 500] {
        assert_eq!(after_receive(status, true), ResponseVerdict::Pass, "status {status}");
    }
}

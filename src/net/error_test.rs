use super::*;

// =============================================================================
// extract_detail
// =============================================================================

#[test]
fn extract_detail_reads_string_message() {
    let body = r#"{"detail":"Incorrect username or password"}"#;
    assert_eq!(extract_detail(body).as_deref(), Some("Incorrect username or password"));
}

#[test]
fn extract_detail_joins_validation_entries() {
    let body = concat!(
        r#"{"detail":["#,
        r#"{"loc":["body","name"],"msg":"field required"},"#,
        r#"{"loc":["body","password"],"msg":"too short"}"#,
        r#"]}"#,
    );
    assert_eq!(extract_detail(body).as_deref(), Some("field required; too short"));
}

#[test]
fn extract_detail_ignores_blank_message() {
    assert_eq!(extract_detail(r#"{"detail":"   "}"#), None);
}

#[test]
fn extract_detail_ignores_non_json_body() {
    assert_eq!(extract_detail("<html>Bad Gateway</html>"), None);
}

#[test]
fn extract_detail_ignores_missing_field() {
    assert_eq!(extract_detail(r#"{"error":"nope"}"#), None);
}

// =============================================================================
// ApiError
// =============================================================================

#[test]
fn from_response_keeps_status_and_detail() {
    let err = ApiError::from_response(404, r#"{"detail":"Favorite not found"}"#);
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.detail(), Some("Favorite not found"));
    assert!(!err.is_unauthorized());
}

#[test]
fn network_error_has_no_detail() {
    let err = ApiError::Network("connection refused".to_owned());
    assert_eq!(err.detail(), None);
    assert_eq!(err.status(), None);
    assert_eq!(err.detail_or("login failed"), "login failed");
}

#[test]
fn unauthorized_reports_401() {
    let err = ApiError::Unauthorized { detail: Some("Token expired".to_owned()) };
    assert!(err.is_unauthorized());
    assert_eq!(err.status(), Some(UNAUTHORIZED));
    assert_eq!(err.detail_or("fallback"), "Token expired");
}

#[test]
fn display_mentions_status() {
    let err = ApiError::Status { status: 503, detail: None };
    assert_eq!(err.to_string(), "request failed with status 503");
}

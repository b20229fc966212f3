use reqwest::StatusCode;
use screener_api::error::{classify_status_error, existing_user_in_detail, parse_error_detail};
use screener_api::ScreenerApiError;

#[test]
fn error_detail_string_is_flattened() {
    let message = parse_error_detail(StatusCode::NOT_FOUND, r#"{"detail":"Thread not found"}"#);
    assert_eq!(message, "Thread not found");
}

#[test]
fn error_detail_object_message_is_flattened() {
    let message = parse_error_detail(
        StatusCode::UNAUTHORIZED,
        r#"{"detail":{"message":"User already exists","user_id":7,"name":"ada"}}"#,
    );
    assert_eq!(message, "User already exists");
}

#[test]
fn error_non_json_body_is_passed_through() {
    let message = parse_error_detail(StatusCode::BAD_GATEWAY, "upstream exploded");
    assert_eq!(message, "upstream exploded");
}

#[test]
fn error_empty_body_falls_back_to_canonical_reason() {
    let message = parse_error_detail(StatusCode::NOT_FOUND, "");
    assert_eq!(message, "Not Found");
}

#[test]
fn error_existing_user_requires_numeric_user_id() {
    let body = r#"{"detail":{"message":"User already exists","user_id":7,"name":null}}"#;
    assert_eq!(existing_user_in_detail(body), Some((7, None)));

    let non_numeric = r#"{"detail":{"message":"User already exists","user_id":"7"}}"#;
    assert_eq!(existing_user_in_detail(non_numeric), None);

    let plain = r#"{"detail":"unauthorized"}"#;
    assert_eq!(existing_user_in_detail(plain), None);
}

#[test]
fn error_classification_maps_not_found() {
    let error = classify_status_error(StatusCode::NOT_FOUND, r#"{"detail":"Thread not found"}"#);
    assert!(matches!(error, ScreenerApiError::NotFound(message) if message == "Thread not found"));
}

#[test]
fn error_classification_maps_conflict_to_user_exists() {
    let body = r#"{"detail":{"message":"User already exists","user_id":12,"name":"grace"}}"#;
    let error = classify_status_error(StatusCode::UNAUTHORIZED, body);

    match error {
        ScreenerApiError::UserExists { user_id, name } => {
            assert_eq!(user_id, 12);
            assert_eq!(name.as_deref(), Some("grace"));
        }
        other => panic!("expected UserExists, got {other:?}"),
    }
}

#[test]
fn error_classification_leaves_plain_unauthorized_as_status() {
    let error = classify_status_error(StatusCode::UNAUTHORIZED, r#"{"detail":"nope"}"#);
    assert!(matches!(error, ScreenerApiError::Status(status, message)
        if status == StatusCode::UNAUTHORIZED && message == "nope"));
}

#[test]
fn error_cancelled_is_distinguishable_from_failures() {
    assert!(ScreenerApiError::Cancelled.is_cancelled());
    assert!(!ScreenerApiError::NotFound("gone".to_string()).is_cancelled());
}

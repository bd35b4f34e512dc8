//! Tests for domain error construction and serialisation.

use super::*;
use rstest::rstest;
use serde_json::json;

#[rstest]
#[case(Error::invalid_request("bad"), ErrorCode::InvalidRequest)]
#[case(Error::not_found("gone"), ErrorCode::NotFound)]
#[case(Error::conflict("dup"), ErrorCode::Conflict)]
#[case(Error::service_unavailable("down"), ErrorCode::ServiceUnavailable)]
#[case(Error::internal("boom"), ErrorCode::InternalError)]
fn constructors_set_code(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
#[case(ErrorCode::NotFound, "resource not found")]
#[case(ErrorCode::InternalError, "internal error")]
fn blank_messages_fall_back_to_code_text(#[case] code: ErrorCode, #[case] expected: &str) {
    let error = Error::new(code, "   ");
    assert_eq!(error.message(), expected);
}

#[rstest]
fn display_is_the_message() {
    let error = Error::conflict("student_id S1 already exists");
    assert_eq!(error.to_string(), "student_id S1 already exists");
}

#[rstest]
fn serialises_code_in_snake_case_and_skips_missing_details() {
    let value = serde_json::to_value(Error::service_unavailable("db down")).expect("serialise");
    assert_eq!(
        value,
        json!({ "code": "service_unavailable", "message": "db down" })
    );
}

#[rstest]
fn details_are_serialised_when_present() {
    let error = Error::invalid_request("bad").with_details(json!({ "field": "email" }));
    let value = serde_json::to_value(error).expect("serialise");
    assert_eq!(value["details"], json!({ "field": "email" }));
}

//! Tests for the users HTTP handlers.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::domain::ports::{MockUsersCommand, MockUsersQuery};
use crate::inbound::http::test_utils::{memory_state, send, test_app};

fn create(student_id: &str) -> actix_test::TestRequest {
    actix_test::TestRequest::post()
        .uri("/api/v1/users")
        .set_json(json!({"name": "A", "student_id": student_id, "phone": "123"}))
}

#[actix_web::test]
async fn create_then_lookup_then_delete() {
    let app = actix_test::init_service(test_app(memory_state())).await;

    let (status, body) = send(&app, create("S1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "data": {"uid": 1, "name": "A", "student_id": "S1", "email": null, "phone": "123"},
            "msg": "success",
            "code": 200
        })
    );

    let (_, body) = send(&app, actix_test::TestRequest::get().uri("/api/v1/users/S1")).await;
    assert_eq!(body["data"]["student_id"], json!("S1"));

    let (status, body) = send(&app, actix_test::TestRequest::delete().uri("/api/v1/users/S1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["uid"], json!(1));

    let (status, body) = send(&app, actix_test::TestRequest::get().uri("/api/v1/users/S1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"data": null, "msg": "success", "code": 200}));
}

#[actix_web::test]
async fn duplicate_student_id_fails_with_500() {
    let app = actix_test::init_service(test_app(memory_state())).await;
    send(&app, create("S1")).await;

    let (status, body) = send(&app, create("S1")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], json!(500));
    assert_eq!(body["data"], Value::Null);
    assert_eq!(
        body["msg"],
        json!("user already exists: student_id S1 is taken")
    );
}

#[rstest]
#[case(json!({"name": "A", "student_id": "", "phone": "123"}), "student_id must not be empty")]
#[case(json!({"name": "A", "student_id": "S1", "phone": "123", "email": "nope"}), "email is not a valid email address")]
#[actix_rt::test]
async fn invalid_create_payloads_are_rejected(#[case] payload: Value, #[case] msg: &str) {
    let app = actix_test::init_service(test_app(memory_state())).await;
    let request = actix_test::TestRequest::post()
        .uri("/api/v1/users")
        .set_json(payload);
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["msg"], json!(msg));
}

#[actix_web::test]
async fn malformed_json_uses_the_envelope() {
    let app = actix_test::init_service(test_app(memory_state())).await;
    let request = actix_test::TestRequest::post()
        .uri("/api/v1/users")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json");
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], json!(500));
    assert_eq!(body["data"], Value::Null);
}

#[actix_web::test]
async fn list_reports_total_and_count() {
    let app = actix_test::init_service(test_app(memory_state())).await;
    for sid in ["S1", "S2", "S3"] {
        send(&app, create(sid)).await;
    }

    let (status, body) = send(
        &app,
        actix_test::TestRequest::get().uri("/api/v1/users?page=1&page_size=2"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], json!(3));
    assert_eq!(body["data"]["count"], json!(1));
    assert_eq!(body["data"]["users"][0]["student_id"], json!("S3"));
}

#[rstest]
#[case("/api/v1/users?page_size=0")]
#[case("/api/v1/users?page_size=1000")]
#[case("/api/v1/users?page=minus-one")]
#[actix_rt::test]
async fn bad_pagination_yields_an_empty_list(#[case] uri: &str) {
    let app = actix_test::init_service(test_app(memory_state())).await;
    let (status, body) = send(&app, actix_test::TestRequest::get().uri(uri)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["data"], json!([]));
}

#[actix_web::test]
async fn update_touches_only_supplied_fields() {
    let app = actix_test::init_service(test_app(memory_state())).await;
    send(
        &app,
        actix_test::TestRequest::post().uri("/api/v1/users").set_json(json!({
            "name": "A", "student_id": "S1", "phone": "123", "email": "a@b.cn"
        })),
    )
    .await;

    let (_, body) = send(
        &app,
        actix_test::TestRequest::put()
            .uri("/api/v1/users/S1")
            .set_json(json!({"phone": "456"})),
    )
    .await;
    assert_eq!(body["data"]["phone"], json!("456"));
    assert_eq!(body["data"]["email"], json!("a@b.cn"));

    let (_, body) = send(
        &app,
        actix_test::TestRequest::put()
            .uri("/api/v1/users/S1")
            .set_json(json!({"email": null})),
    )
    .await;
    assert_eq!(body["data"]["email"], Value::Null);
    assert_eq!(body["data"]["name"], json!("A"));
}

#[actix_web::test]
async fn update_of_unknown_user_is_an_empty_success() {
    let app = actix_test::init_service(test_app(memory_state())).await;
    let (status, body) = send(
        &app,
        actix_test::TestRequest::put()
            .uri("/api/v1/users/S9")
            .set_json(json!({"name": "B"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], Value::Null);
    assert_eq!(body["msg"], json!("update failed: user S9 not found"));
}

#[actix_web::test]
async fn over_long_student_id_lookup_is_a_validation_failure() {
    let app = actix_test::init_service(test_app(memory_state())).await;
    let uri = format!("/api/v1/users/{}", "S".repeat(21));
    let (status, body) = send(&app, actix_test::TestRequest::get().uri(&uri)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["data"], Value::Null);
    assert_eq!(body["msg"], json!("student_id must be at most 20 characters"));
}

#[actix_web::test]
async fn delete_of_unknown_user_fails() {
    let app = actix_test::init_service(test_app(memory_state())).await;
    let (status, body) = send(&app, actix_test::TestRequest::delete().uri("/api/v1/users/S9")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["msg"], json!("user with student_id S9 not found"));
}

#[actix_web::test]
async fn infrastructure_failures_surface_their_text() {
    let mut query = MockUsersQuery::new();
    query
        .expect_get_user_by_student_id()
        .returning(|_| Err(Error::service_unavailable("database is down")));
    let mut state = memory_state();
    state.users = Arc::new(query);
    state.users_command = Arc::new(MockUsersCommand::new());
    let app = actix_test::init_service(test_app(state)).await;

    let (status, body) = send(&app, actix_test::TestRequest::get().uri("/api/v1/users/S1")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"data": null, "msg": "database is down", "code": 500})
    );
}

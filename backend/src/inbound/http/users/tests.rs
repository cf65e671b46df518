//! Tests for user directory handlers.

use std::sync::Arc;

use actix_web::test as actix_test;
use rstest::{fixture, rstest};
use serde_json::json;

use crate::inbound::http::test_utils::{
    call_json, login, memory_state, register, seed_admin, test_app,
};
use crate::test_support::{MutableClock, sample_now};

use super::*;

#[fixture]
fn state() -> HttpState {
    memory_state(Arc::new(MutableClock::new(sample_now())))
}

#[rstest]
#[actix_web::test]
async fn plain_users_cannot_list_accounts(state: HttpState) {
    let app = actix_test::init_service(test_app(state)).await;
    register(&app, "ada_l").await;
    let ada = login(&app, "ada_l").await;
    let (status, body) = call_json(
        &app,
        ada.sign(actix_test::TestRequest::get().uri("/api/v1/users")),
    )
    .await;
    assert_eq!(status, 403);
    assert_eq!(body["error"]["code"], "forbidden");
}

#[rstest]
#[actix_web::test]
async fn profiles_are_private_to_their_owner(state: HttpState) {
    let app = actix_test::init_service(test_app(state)).await;
    let bob = register(&app, "bob_b").await;
    register(&app, "ada_l").await;
    let ada = login(&app, "ada_l").await;

    let own = format!("/api/v1/users/{}", ada.user["id"].as_str().expect("id"));
    let (status, body) = call_json(&app, ada.sign(actix_test::TestRequest::get().uri(&own))).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["nickname"], "ada_l");

    let other = format!("/api/v1/users/{}", bob["id"].as_str().expect("id"));
    let (status, _) = call_json(&app, ada.sign(actix_test::TestRequest::get().uri(&other))).await;
    assert_eq!(status, 403);
}

#[rstest]
#[actix_web::test]
async fn malformed_user_id_is_a_bad_request(state: HttpState) {
    let app = actix_test::init_service(test_app(state)).await;
    register(&app, "ada_l").await;
    let ada = login(&app, "ada_l").await;
    let (status, body) = call_json(
        &app,
        ada.sign(actix_test::TestRequest::get().uri("/api/v1/users/not-a-uuid")),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["details"]["code"], "invalid_path");
}

#[rstest]
#[actix_web::test]
async fn role_change_applies_on_the_next_request(state: HttpState) {
    seed_admin(&state, "root_admin").await;
    let app = actix_test::init_service(test_app(state)).await;
    let ada_id = register(&app, "ada_l").await["id"]
        .as_str()
        .expect("id")
        .to_owned();
    let ada = login(&app, "ada_l").await;
    let admin = login(&app, "root_admin").await;

    let (status, body) = call_json(
        &app,
        admin.sign(
            actix_test::TestRequest::put()
                .uri(&format!("/api/v1/users/{ada_id}/role"))
                .set_json(json!({"role": "assistant"})),
        ),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["role"], "assistant");

    // Ada's existing session picks up the new role without logging in again.
    let (status, body) = call_json(
        &app,
        ada.sign(actix_test::TestRequest::get().uri("/api/v1/users")),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(2));

    let (status, body) = call_json(
        &app,
        ada.sign(actix_test::TestRequest::get().uri("/api/v1/notifications")),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"][0]["kind"], "role_changed");
}

#[rstest]
#[actix_web::test]
async fn admins_cannot_demote_themselves(state: HttpState) {
    let admin_user = seed_admin(&state, "root_admin").await;
    let app = actix_test::init_service(test_app(state)).await;
    let admin = login(&app, "root_admin").await;
    let (status, _) = call_json(
        &app,
        admin.sign(
            actix_test::TestRequest::put()
                .uri(&format!("/api/v1/users/{}/role", admin_user.id))
                .set_json(json!({"role": "user"})),
        ),
    )
    .await;
    assert_eq!(status, 403);
}

#[rstest]
#[case(json!({"profileImage": "  https://cdn.example.com/ada.png "}), json!("https://cdn.example.com/ada.png"))]
#[case(json!({"profileImage": "   "}), serde_json::Value::Null)]
#[case(json!({"profileImage": null}), serde_json::Value::Null)]
#[actix_web::test]
async fn profile_image_is_trimmed_or_cleared(
    state: HttpState,
    #[case] payload: serde_json::Value,
    #[case] expected: serde_json::Value,
) {
    let app = actix_test::init_service(test_app(state)).await;
    register(&app, "ada_l").await;
    let ada = login(&app, "ada_l").await;
    let uri = format!(
        "/api/v1/users/{}/profile-image",
        ada.user["id"].as_str().expect("id")
    );
    let (status, body) = call_json(
        &app,
        ada.sign(actix_test::TestRequest::put().uri(&uri).set_json(payload)),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["profileImage"], expected);
}

#[rstest]
#[actix_web::test]
async fn own_history_starts_empty(state: HttpState) {
    let app = actix_test::init_service(test_app(state)).await;
    register(&app, "ada_l").await;
    let ada = login(&app, "ada_l").await;
    let uri = format!(
        "/api/v1/users/{}/transactions?limit=5",
        ada.user["id"].as_str().expect("id")
    );
    let (status, body) = call_json(&app, ada.sign(actix_test::TestRequest::get().uri(&uri))).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"], json!([]));
}

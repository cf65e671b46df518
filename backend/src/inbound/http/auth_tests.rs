//! Tests for account and session handlers.

use std::sync::Arc;

use actix_web::test as actix_test;
use rstest::{fixture, rstest};
use serde_json::json;

use crate::inbound::http::test_utils::{
    LOGIN_LIMIT, PASSWORD, call_json, login as login_as, memory_state, register as register_as,
    test_app,
};
use crate::middleware::TRACE_ID_HEADER;
use crate::test_support::{MutableClock, sample_now};

use super::*;

#[fixture]
fn state() -> HttpState {
    memory_state(Arc::new(MutableClock::new(sample_now())))
}

#[rstest]
#[actix_web::test]
async fn register_returns_user_without_password(state: HttpState) {
    let app = actix_test::init_service(test_app(state)).await;
    let user = register_as(&app, "ada_l").await;
    assert_eq!(user["nickname"], "ada_l");
    assert_eq!(user["role"], "user");
    assert_eq!(user["totalPoints"], 0);
    assert!(user.get("passwordHash").is_none());
}

#[rstest]
#[actix_web::test]
async fn register_reports_every_invalid_field(state: HttpState) {
    let app = actix_test::init_service(test_app(state)).await;
    let (status, body) = call_json(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(json!({"nickname": "x", "email": "nope", "password": "short"})),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "invalid_request");
    assert_eq!(
        body["error"]["details"]["errors"]
            .as_array()
            .map(Vec::len),
        Some(3)
    );
}

#[rstest]
#[actix_web::test]
async fn duplicate_nickname_conflicts(state: HttpState) {
    let app = actix_test::init_service(test_app(state)).await;
    register_as(&app, "ada_l").await;
    let (status, body) = call_json(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(json!({
                "nickname": "ada_l",
                "email": "other@example.com",
                "password": PASSWORD,
            })),
    )
    .await;
    assert_eq!(status, 409);
    assert_eq!(body["error"]["code"], "conflict");
}

#[rstest]
#[case(json!({"login": "   ", "password": "pw"}), "login", "empty_login")]
#[case(json!({"login": "ada_l", "password": ""}), "password", "empty_password")]
#[actix_web::test]
async fn login_rejects_blank_fields(
    state: HttpState,
    #[case] payload: serde_json::Value,
    #[case] field: &str,
    #[case] code: &str,
) {
    let app = actix_test::init_service(test_app(state)).await;
    let (status, body) = call_json(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(payload),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["details"]["field"], field);
    assert_eq!(body["error"]["details"]["code"], code);
}

#[rstest]
#[actix_web::test]
async fn login_accepts_nickname_or_email(state: HttpState) {
    let app = actix_test::init_service(test_app(state)).await;
    register_as(&app, "ada_l").await;
    let by_nickname = login_as(&app, "ada_l").await;
    let by_email = login_as(&app, "ADA_L@example.com").await;
    assert_eq!(by_nickname.user["id"], by_email.user["id"]);
    assert_ne!(by_nickname.csrf, by_email.csrf);
}

#[rstest]
#[actix_web::test]
async fn me_requires_a_session(state: HttpState) {
    let app = actix_test::init_service(test_app(state)).await;
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get().uri("/api/v1/auth/me").to_request(),
    )
    .await;
    assert_eq!(res.status().as_u16(), 401);
    assert!(res.headers().contains_key(TRACE_ID_HEADER));
}

#[rstest]
#[actix_web::test]
async fn logout_needs_csrf_then_clears_the_session(state: HttpState) {
    let app = actix_test::init_service(test_app(state)).await;
    register_as(&app, "ada_l").await;
    let authed = login_as(&app, "ada_l").await;

    let (status, _) = call_json(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/auth/logout")
            .cookie(authed.cookie.clone()),
    )
    .await;
    assert_eq!(status, 403);

    let res = actix_test::call_service(
        &app,
        authed
            .sign(actix_test::TestRequest::post().uri("/api/v1/auth/logout"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status().as_u16(), 200);
    let cleared = res
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("cookie removal");
    assert_eq!(cleared.value(), "");
}

#[rstest]
#[actix_web::test]
async fn repeated_failures_are_throttled(state: HttpState) {
    let app = actix_test::init_service(test_app(state)).await;
    register_as(&app, "ada_l").await;
    let wrong = || {
        actix_test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({"login": "ada_l", "password": "wrong password"}))
    };
    for _ in 0..LOGIN_LIMIT {
        assert_eq!(call_json(&app, wrong()).await.0, 401);
    }
    let (status, body) = call_json(&app, wrong()).await;
    assert_eq!(status, 429);
    assert_eq!(body["error"]["code"], "too_many_requests");

    let (status, _) = call_json(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({"login": "ada_l", "password": PASSWORD})),
    )
    .await;
    assert_eq!(status, 429, "correct password is refused while throttled");
}

#[rstest]
#[case("ada_l", "10.0.0.7|ada_l")]
#[case("  Ada@Example.com ", "10.0.0.7|ada@example.com")]
fn throttle_key_pairs_address_with_normalised_login(
    #[case] login_name: &str,
    #[case] key: &str,
) {
    let req = actix_test::TestRequest::default()
        .peer_addr("10.0.0.7:4000".parse().expect("socket address"))
        .to_http_request();
    assert_eq!(throttle_key(&req, login_name), key);
}

//! Shared helpers for the HTTP integration suites.
//!
//! Integration tests compile as separate crates under `backend/tests/`, so
//! they cannot reach the crate's `#[cfg(test)]` helpers. This module mounts
//! the full `/api/v1` table over the in-memory store and wraps the request
//! plumbing each suite needs: registering, logging in and signing requests
//! with the session cookie and CSRF header.

use std::sync::Arc;
use std::time::Duration;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test, web};
use chrono::{TimeDelta, Utc};
use mockable::{Clock, DefaultClock};
use serde_json::{Value, json};

use pointsboard::Trace;
use pointsboard::domain::ports::Repositories;
use pointsboard::domain::{CacheTtls, Registration, Services};
use pointsboard::inbound::http::routes::configure_api;
use pointsboard::inbound::http::session::CSRF_HEADER;
use pointsboard::inbound::http::state::HttpState;
use pointsboard::inbound::http::throttle::LoginThrottle;
use pointsboard::outbound::cache::MemoryCache;
use pointsboard::outbound::memory::InMemoryStore;

pub const PASSWORD: &str = "correct horse battery";
pub const ADMIN: &str = "root_admin";

/// Handler state over a fresh in-memory store, with `ADMIN` already seeded.
pub async fn seeded_state() -> HttpState {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let repos = Repositories::from_store(Arc::new(InMemoryStore::new()));
    let cache = Arc::new(MemoryCache::new(clock.clone()));
    let services = Services::new(&repos, cache, clock.clone(), CacheTtls::default());
    let admin = Registration::try_new(ADMIN, "root@example.com", PASSWORD)
        .expect("valid admin registration");
    services
        .users
        .ensure_admin(admin)
        .await
        .expect("seed admin");
    let throttle = LoginThrottle::new(5, Duration::from_secs(900), clock.clone());
    HttpState::new(services, Arc::new(throttle), clock)
}

/// The API under `/api/v1`, mounted the way the server mounts it.
pub fn app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let session = SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build();
    App::new()
        .app_data(web::Data::new(state))
        .wrap(Trace)
        .service(web::scope("/api/v1").wrap(session).configure(configure_api))
}

/// A logged-in client.
#[derive(Debug, Clone)]
pub struct Client {
    pub cookie: Cookie<'static>,
    pub csrf: String,
    pub id: String,
}

impl Client {
    pub fn sign(&self, req: test::TestRequest) -> test::TestRequest {
        req.cookie(self.cookie.clone())
            .insert_header((CSRF_HEADER, self.csrf.clone()))
    }

    pub fn get(&self, uri: &str) -> test::TestRequest {
        self.sign(test::TestRequest::get().uri(uri))
    }

    pub fn post(&self, uri: &str, body: Value) -> test::TestRequest {
        self.sign(test::TestRequest::post().uri(uri).set_json(body))
    }
}

pub async fn call_json<S>(app: &S, req: test::TestRequest) -> (u16, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = test::call_service(app, req.to_request()).await;
    let status = res.status().as_u16();
    let body = test::read_body(res).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

/// Call and require a 2xx status, returning `data` from the envelope.
pub async fn data<S>(app: &S, req: test::TestRequest) -> Value
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let (status, body) = call_json(app, req).await;
    assert!((200..300).contains(&status), "unexpected {status}: {body}");
    assert_eq!(body["success"], true);
    body["data"].clone()
}

pub async fn register<S>(app: &S, nickname: &str) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let user = data(
        app,
        test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(json!({
                "nickname": nickname,
                "email": format!("{nickname}@example.com"),
                "password": PASSWORD,
            })),
    )
    .await;
    user["id"].as_str().expect("user id").to_owned()
}

pub async fn login<S>(app: &S, login: &str) -> Client
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({ "login": login, "password": PASSWORD }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status().as_u16(), 200, "login {login}");
    let cookie = res
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie");
    let body: Value = serde_json::from_slice(&test::read_body(res).await).expect("login body");
    Client {
        cookie,
        csrf: body["data"]["csrfToken"]
            .as_str()
            .expect("csrf token")
            .to_owned(),
        id: body["data"]["user"]["id"]
            .as_str()
            .expect("user id")
            .to_owned(),
    }
}

/// Create an event running from yesterday until tomorrow.
pub async fn running_event<S>(app: &S, admin: &Client) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let now = Utc::now();
    let event = data(
        app,
        admin.post(
            "/api/v1/events",
            json!({
                "name": "Spring Games",
                "startDate": now - TimeDelta::days(1),
                "endDate": now + TimeDelta::days(1),
            }),
        ),
    )
    .await;
    event["id"].as_str().expect("event id").to_owned()
}

/// Give `user_id` a bonus of `amount` points.
pub async fn award<S>(app: &S, admin: &Client, user_id: &str, amount: i64)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    data(
        app,
        admin.post(
            "/api/v1/points",
            json!({ "userId": user_id, "amount": amount, "source": "bonus" }),
        ),
    )
    .await;
}

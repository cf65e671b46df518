//! Test helpers for inbound HTTP components.

use std::sync::Arc;
use std::time::Duration;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test, web};
use mockable::Clock;
use serde_json::{Value, json};

use crate::domain::ports::Repositories;
use crate::domain::{CacheTtls, Registration, Services, User};
use crate::inbound::http::routes::configure_api;
use crate::inbound::http::session::CSRF_HEADER;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::throttle::LoginThrottle;
use crate::middleware::Trace;
use crate::outbound::cache::MemoryCache;
use crate::outbound::memory::InMemoryStore;

/// Name of the session cookie issued by the API.
pub const SESSION_COOKIE: &str = "session";

/// Password shared by every account the helpers create.
pub const PASSWORD: &str = "correct horse battery";

/// Failed logins tolerated by [`memory_state`] before throttling.
pub const LOGIN_LIMIT: u32 = 3;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name(SESSION_COOKIE.to_owned())
        .cookie_secure(false)
        .build()
}

/// Extract the session cookie set by a response.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(Cookie::into_owned)
        .expect("session cookie set")
}

/// Handler state over a fresh in-memory store and cache.
pub fn memory_state(clock: Arc<dyn Clock>) -> HttpState {
    let repos = Repositories::from_store(Arc::new(InMemoryStore::new()));
    let cache = Arc::new(MemoryCache::new(clock.clone()));
    let services = Services::new(&repos, cache, clock.clone(), CacheTtls::default());
    let throttle = LoginThrottle::new(LOGIN_LIMIT, Duration::from_secs(900), clock.clone());
    HttpState::new(services, Arc::new(throttle), clock)
}

/// The full API under `/api/v1`, as the server mounts it.
pub fn test_app(
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
    App::new()
        .app_data(web::Data::new(state))
        .wrap(Trace)
        .service(
            web::scope("/api/v1")
                .wrap(test_session_middleware())
                .configure(configure_api),
        )
}

/// Create an admin account directly through the service layer.
pub async fn seed_admin(state: &HttpState, nickname: &str) -> User {
    let registration = Registration::try_new(nickname, &format!("{nickname}@example.com"), PASSWORD)
        .expect("valid registration");
    state
        .services
        .users
        .ensure_admin(registration)
        .await
        .expect("bootstrap admin")
}

/// A logged-in client: session cookie plus CSRF token.
#[derive(Debug, Clone)]
pub struct Authed {
    pub cookie: Cookie<'static>,
    pub csrf: String,
    pub user: Value,
}

impl Authed {
    /// Attach the session cookie and CSRF header.
    pub fn sign(&self, req: test::TestRequest) -> test::TestRequest {
        req.cookie(self.cookie.clone())
            .insert_header((CSRF_HEADER, self.csrf.clone()))
    }
}

/// Call the service and decode the JSON envelope.
pub async fn call_json<S>(app: &S, req: test::TestRequest) -> (u16, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = test::call_service(app, req.to_request()).await;
    let status = res.status().as_u16();
    let body = test::read_body(res).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

pub async fn register<S>(app: &S, nickname: &str) -> Value
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let (status, body) = call_json(
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
    assert_eq!(status, 201, "register {nickname}: {body}");
    body["data"].clone()
}

pub async fn login<S>(app: &S, login: &str) -> Authed
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
    let cookie = session_cookie(&res);
    let body: Value = serde_json::from_slice(&test::read_body(res).await).expect("login body");
    Authed {
        cookie,
        csrf: body["data"]["csrfToken"]
            .as_str()
            .expect("csrf token")
            .to_owned(),
        user: body["data"]["user"].clone(),
    }
}

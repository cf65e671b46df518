//! Cookie session handling and the authenticated caller extractor.
//!
//! The session cookie stores the user id, the role seen at login, the login
//! time and a CSRF token. [`Caller`] turns a session into a
//! [`RequestContext`]: it requires a logged-in user, validates the
//! `X-CSRF-Token` header on mutating requests and reloads the role from the
//! user store so role changes apply immediately.

use std::ops::Deref;

use actix_session::Session;
use actix_web::http::Method;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use chrono::{DateTime, Utc};
use futures_util::future::LocalBoxFuture;
use rand::RngCore;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::{Error, RequestContext, Role, User, UserId};
use crate::inbound::http::state::HttpState;

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const ROLE_KEY: &str = "role";
pub(crate) const LOGIN_AT_KEY: &str = "login_at";
pub(crate) const CSRF_KEY: &str = "csrf_token";

/// Request header carrying the CSRF token on mutating requests.
pub const CSRF_HEADER: &str = "X-CSRF-Token";

const CSRF_TOKEN_BYTES: usize = 32;

fn new_csrf_token() -> String {
    let mut bytes = [0_u8; CSRF_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn session_error(action: &str, error: impl std::fmt::Display) -> Error {
    Error::internal(format!("failed to {action} session: {error}"))
}

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    fn insert<T: serde::Serialize>(&self, key: &str, value: T) -> Result<(), Error> {
        self.0
            .insert(key, value)
            .map_err(|error| session_error("persist", error))
    }

    fn get<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<Option<T>, Error> {
        self.0
            .get::<T>(key)
            .map_err(|error| session_error("read", error))
    }

    /// Start a fresh session for `user` and return its CSRF token.
    pub fn establish(&self, user: &User, login_at: DateTime<Utc>) -> Result<String, Error> {
        self.0.renew();
        let token = new_csrf_token();
        self.insert(USER_ID_KEY, user.id.as_uuid())?;
        self.insert(ROLE_KEY, user.role)?;
        self.insert(LOGIN_AT_KEY, login_at)?;
        self.insert(CSRF_KEY, &token)?;
        Ok(token)
    }

    /// Drop every session value and expire the cookie.
    pub fn clear(&self) {
        self.0.purge();
    }

    /// The logged-in user id, if the cookie carries a valid one.
    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        match self.get::<String>(USER_ID_KEY) {
            Ok(Some(raw)) => match Uuid::parse_str(&raw) {
                Ok(id) => Ok(Some(UserId::from_uuid(id))),
                Err(error) => {
                    warn!(%error, "invalid user id in session cookie");
                    Ok(None)
                }
            },
            Ok(None) => Ok(None),
            Err(error) => {
                warn!(%error, "unreadable user id in session cookie");
                Ok(None)
            }
        }
    }

    /// Require a logged-in user or return `401 Unauthorized`.
    pub fn require_user_id(&self) -> Result<UserId, Error> {
        self.user_id()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    pub fn role(&self) -> Result<Option<Role>, Error> {
        self.get(ROLE_KEY)
    }

    /// Record a role change observed on reload.
    pub fn set_role(&self, role: Role) -> Result<(), Error> {
        self.insert(ROLE_KEY, role)
    }

    pub fn login_at(&self) -> Result<Option<DateTime<Utc>>, Error> {
        self.get(LOGIN_AT_KEY)
    }

    pub fn csrf_token(&self) -> Result<Option<String>, Error> {
        self.get(CSRF_KEY)
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

fn is_mutating(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

fn check_csrf(req: &HttpRequest, session: &SessionContext) -> Result<(), Error> {
    if !is_mutating(req.method()) {
        return Ok(());
    }
    let supplied = req
        .headers()
        .get(CSRF_HEADER)
        .and_then(|value| value.to_str().ok());
    match (supplied, session.csrf_token()?) {
        (Some(supplied), Some(expected)) if supplied == expected => Ok(()),
        _ => Err(Error::forbidden("missing or invalid CSRF token")),
    }
}

/// Authenticated caller with a freshly reloaded role.
#[derive(Debug, Clone, Copy)]
pub struct Caller(RequestContext);

impl Caller {
    #[must_use]
    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

impl Deref for Caller {
    type Target = RequestContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

async fn resolve_caller(
    req: HttpRequest,
    session: SessionContext,
    state: Option<web::Data<HttpState>>,
) -> Result<Caller, Error> {
    let user_id = session.require_user_id()?;
    check_csrf(&req, &session)?;
    let state = state.ok_or_else(|| Error::internal("HTTP state is not configured"))?;
    let Some(user) = state.services.users.find(user_id).await? else {
        session.clear();
        return Err(Error::unauthorized("login required"));
    };
    if session.role()? != Some(user.role) {
        debug!(%user_id, role = %user.role, "session role refreshed");
        session.set_role(user.role)?;
    }
    Ok(Caller(RequestContext::new(user.id, user.role)))
}

impl FromRequest for Caller {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let session = SessionContext::from_request(req, payload);
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let req = req.clone();
        Box::pin(async move {
            let session = session.await?;
            resolve_caller(req, session, state)
                .await
                .map_err(actix_web::Error::from)
        })
    }
}


#[cfg(test)]
mod method_tests {
    use actix_web::http::Method;
    use rstest::rstest;

    use super::is_mutating;

    #[rstest]
    #[case(Method::GET, false)]
    #[case(Method::HEAD, false)]
    #[case(Method::POST, true)]
    #[case(Method::PUT, true)]
    #[case(Method::PATCH, true)]
    #[case(Method::DELETE, true)]
    fn csrf_applies_to_mutating_methods(#[case] method: Method, #[case] expected: bool) {
        assert_eq!(is_mutating(&method), expected);
    }
}

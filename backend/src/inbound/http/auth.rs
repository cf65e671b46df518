//! Account and session handlers.
//!
//! ```text
//! POST /api/v1/auth/register {"nickname":"ada_l","email":"ada@example.com","password":"..."}
//! POST /api/v1/auth/login {"login":"ada_l","password":"..."}
//! POST /api/v1/auth/logout
//! GET  /api/v1/auth/me
//! ```
//!
//! Login and register do not require a CSRF token; the token returned by
//! login must accompany every later mutating request.

use actix_web::{HttpRequest, HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{Error, LoginCredentials, LoginValidationError, Registration, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope::{created, ok};
use crate::inbound::http::schemas::{ErrorSchema, UserSchema};
use crate::inbound::http::session::{Caller, SessionContext};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::invalid_field;

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[schema(example = "ada_l")]
    pub nickname: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    pub password: String,
}

/// Login body; `login` accepts a nickname or an email address.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[schema(example = "ada_l")]
    pub login: String,
    pub password: String,
}

impl TryFrom<&LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: &LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.login, &value.password)
    }
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::EmptyLogin => {
            invalid_field("login", "empty_login", err.to_string())
        }
        LoginValidationError::EmptyPassword => {
            invalid_field("password", "empty_password", err.to_string())
        }
    }
}

/// Session payload returned by login.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[schema(value_type = UserSchema)]
    pub user: User,
    /// Send back in the `X-CSRF-Token` header on mutating requests.
    pub csrf_token: String,
}

fn throttle_key(req: &HttpRequest, login_name: &str) -> String {
    let client = req
        .peer_addr()
        .map_or_else(|| "unknown".to_owned(), |addr| addr.ip().to_string());
    format!("{client}|{}", login_name.trim().to_lowercase())
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Nickname or email taken", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration =
        Registration::try_new(&payload.nickname, &payload.email, &payload.password)?;
    let user = state.services.users.register(registration).await?;
    Ok(created(user))
}

/// Authenticate and start a fresh session.
///
/// Failed attempts are counted per client address and login; once the limit
/// is reached the endpoint answers `429` until the window lapses.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = LoginResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 429, description = "Too many failed attempts", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials =
        LoginCredentials::try_from(&payload.into_inner()).map_err(map_login_validation_error)?;
    let key = throttle_key(&req, credentials.login());
    state.login_throttle.check(&key)?;
    let user = match state.services.users.authenticate(&credentials).await {
        Ok(user) => user,
        Err(error) => {
            state.login_throttle.record_failure(&key);
            return Err(error);
        }
    };
    state.login_throttle.reset(&key);
    let csrf_token = session.establish(&user, state.clock.utc())?;
    info!(user_id = %user.id, role = %user.role, "user logged in");
    Ok(ok(LoginResponse { user, csrf_token }))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses(
        (status = 200, description = "Session cleared"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Missing CSRF token", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/auth/logout")]
pub async fn logout(caller: Caller, session: SessionContext) -> ApiResult<HttpResponse> {
    session.clear();
    info!(user_id = %caller.user_id(), "user logged out");
    Ok(ok(serde_json::json!({ "loggedOut": true })))
}

/// The authenticated account.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "currentUser"
)]
#[get("/auth/me")]
pub async fn me(caller: Caller, state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let user = state
        .services
        .users
        .profile(caller.context(), caller.user_id())
        .await?;
    Ok(ok(user))
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;

//! User directory handlers.
//!
//! ```text
//! GET /api/v1/users
//! GET /api/v1/users/{id}
//! PUT /api/v1/users/{id}/role {"role":"assistant"}
//! PUT /api/v1/users/{id}/profile-image {"profileImage":"https://..."}
//! GET /api/v1/users/{id}/transactions?limit=20
//! GET /api/v1/users/{id}/claims
//! ```

use actix_web::{HttpResponse, get, put, web};
use serde::{Deserialize, Serialize};

use crate::domain::{Role, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope::ok;
use crate::inbound::http::schemas::{
    ClaimSchema, ErrorSchema, PointTransactionSchema, RoleSchema, UserSchema,
};
use crate::inbound::http::session::Caller;
use crate::inbound::http::state::HttpState;

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleRequest {
    #[schema(value_type = RoleSchema)]
    pub role: Role,
}

/// Profile image reference; `null` or blank clears it.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileImageRequest {
    pub profile_image: Option<String>,
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryQuery {
    /// Most recent entries to return (default 50, at most 200).
    pub limit: Option<usize>,
}

/// Every account. Assistant or higher.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "Users", body = [UserSchema]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(caller: Caller, state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    Ok(ok(state.services.users.list(caller.context()).await?))
}

/// A profile: the caller's own, or anyone's for assistants and above.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = UserSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    caller: Caller,
    state: web::Data<HttpState>,
    path: web::Path<UserId>,
) -> ApiResult<HttpResponse> {
    let user = state
        .services
        .users
        .profile(caller.context(), path.into_inner())
        .await?;
    Ok(ok(user))
}

/// Change a user's role. Admin only; admins cannot change their own.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}/role",
    params(("id" = String, Path, description = "User id")),
    request_body = RoleRequest,
    responses(
        (status = 200, description = "Updated user", body = UserSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "changeUserRole"
)]
#[put("/users/{id}/role")]
pub async fn change_role(
    caller: Caller,
    state: web::Data<HttpState>,
    path: web::Path<UserId>,
    payload: web::Json<RoleRequest>,
) -> ApiResult<HttpResponse> {
    let user = state
        .services
        .users
        .change_role(caller.context(), path.into_inner(), payload.role)
        .await?;
    Ok(ok(user))
}

#[utoipa::path(
    put,
    path = "/api/v1/users/{id}/profile-image",
    params(("id" = String, Path, description = "User id")),
    request_body = ProfileImageRequest,
    responses(
        (status = 200, description = "Updated user", body = UserSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateProfileImage"
)]
#[put("/users/{id}/profile-image")]
pub async fn update_profile_image(
    caller: Caller,
    state: web::Data<HttpState>,
    path: web::Path<UserId>,
    payload: web::Json<ProfileImageRequest>,
) -> ApiResult<HttpResponse> {
    let user = state
        .services
        .users
        .update_profile_image(
            caller.context(),
            path.into_inner(),
            payload.into_inner().profile_image,
        )
        .await?;
    Ok(ok(user))
}

/// Point history, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/transactions",
    params(("id" = String, Path, description = "User id"), HistoryQuery),
    responses(
        (status = 200, description = "Ledger entries", body = [PointTransactionSchema]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["points"],
    operation_id = "pointHistory"
)]
#[get("/users/{id}/transactions")]
pub async fn point_history(
    caller: Caller,
    state: web::Data<HttpState>,
    path: web::Path<UserId>,
    query: web::Query<HistoryQuery>,
) -> ApiResult<HttpResponse> {
    let history = state
        .services
        .points
        .history(caller.context(), path.into_inner(), query.limit)
        .await?;
    Ok(ok(history))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/claims",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Claims", body = [ClaimSchema]),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["claims"],
    operation_id = "userClaims"
)]
#[get("/users/{id}/claims")]
pub async fn user_claims(
    caller: Caller,
    state: web::Data<HttpState>,
    path: web::Path<UserId>,
) -> ApiResult<HttpResponse> {
    let claims = state
        .services
        .claims
        .list_for_user(caller.context(), path.into_inner())
        .await?;
    Ok(ok(claims))
}

#[cfg(test)]
mod tests;

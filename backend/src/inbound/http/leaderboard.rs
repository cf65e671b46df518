//! Public leaderboard handlers.
//!
//! ```text
//! GET /api/v1/leaderboard?limit=10
//! GET /api/v1/leaderboard/users/{id}/rank
//! GET /api/v1/leaderboard/users/{id}/context?window=2
//! ```
//!
//! These routes need no session so the board can be shown on public screens.

use actix_web::{HttpResponse, get, web};
use serde::{Deserialize, Serialize};

use crate::domain::UserId;
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope::ok;
use crate::inbound::http::schemas::{ContextEntrySchema, ErrorSchema, LeaderboardEntrySchema};
use crate::inbound::http::state::HttpState;

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LimitQuery {
    /// Rows to return, clamped to 1..=100 (default 10).
    pub limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WindowQuery {
    /// Neighbours on each side, at most 10 (default 2).
    pub window: Option<usize>,
}

/// Rank lookup result; `rank` is `null` until the user earns points.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RankResponse {
    #[schema(value_type = String, format = Uuid)]
    pub user_id: UserId,
    pub rank: Option<usize>,
}

#[utoipa::path(
    get,
    path = "/api/v1/leaderboard",
    params(LimitQuery),
    responses(
        (status = 200, description = "Top of the board", body = [LeaderboardEntrySchema]),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["leaderboard"],
    operation_id = "leaderboard",
    security([])
)]
#[get("/leaderboard")]
pub async fn leaderboard(
    state: web::Data<HttpState>,
    query: web::Query<LimitQuery>,
) -> ApiResult<HttpResponse> {
    Ok(ok(state.services.leaderboard.leaderboard(query.limit).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/leaderboard/users/{id}/rank",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Rank", body = RankResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["leaderboard"],
    operation_id = "userRank",
    security([])
)]
#[get("/leaderboard/users/{id}/rank")]
pub async fn user_rank(
    state: web::Data<HttpState>,
    path: web::Path<UserId>,
) -> ApiResult<HttpResponse> {
    let user_id = path.into_inner();
    let rank = state.services.leaderboard.user_rank(user_id).await?;
    Ok(ok(RankResponse { user_id, rank }))
}

/// The user's row and its neighbours; empty when the user is unranked.
#[utoipa::path(
    get,
    path = "/api/v1/leaderboard/users/{id}/context",
    params(("id" = String, Path, description = "User id"), WindowQuery),
    responses(
        (status = 200, description = "Rows around the user", body = [ContextEntrySchema]),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["leaderboard"],
    operation_id = "userContext",
    security([])
)]
#[get("/leaderboard/users/{id}/context")]
pub async fn user_context(
    state: web::Data<HttpState>,
    path: web::Path<UserId>,
    query: web::Query<WindowQuery>,
) -> ApiResult<HttpResponse> {
    let rows = state
        .services
        .leaderboard
        .user_context(path.into_inner(), query.window)
        .await?;
    Ok(ok(rows))
}

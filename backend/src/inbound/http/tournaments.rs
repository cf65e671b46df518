//! Tournament handlers.
//!
//! ```text
//! GET    /api/v1/tournaments/{id}
//! PUT    /api/v1/tournaments/{id}
//! DELETE /api/v1/tournaments/{id}
//! PATCH  /api/v1/tournaments/{id}/status {"status":"active"}
//! POST   /api/v1/tournaments/{id}/award {"userIds":["..."],"notes":"podium"}
//! ```
//!
//! Listing and creation live under the owning event in [`super::events`].

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use serde::{Deserialize, Serialize};

use crate::domain::{TournamentId, TournamentStatus, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope::{created, ok};
use crate::inbound::http::events::TournamentRequest;
use crate::inbound::http::schemas::{
    ErrorSchema, PointTransactionSchema, TournamentSchema, TournamentStatusSchema,
};
use crate::inbound::http::session::Caller;
use crate::inbound::http::state::HttpState;

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusRequest {
    #[schema(value_type = TournamentStatusSchema)]
    pub status: TournamentStatus,
}

/// Recipients of a tournament's reward.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AwardRequest {
    #[schema(value_type = Vec<String>)]
    pub user_ids: Vec<UserId>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/tournaments/{id}",
    params(("id" = String, Path, description = "Tournament id")),
    responses(
        (status = 200, description = "Tournament", body = TournamentSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["tournaments"],
    operation_id = "getTournament"
)]
#[get("/tournaments/{id}")]
pub async fn get_tournament(
    _caller: Caller,
    state: web::Data<HttpState>,
    path: web::Path<TournamentId>,
) -> ApiResult<HttpResponse> {
    Ok(ok(state.services.tournaments.get(path.into_inner()).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/tournaments/{id}",
    params(("id" = String, Path, description = "Tournament id")),
    request_body = TournamentRequest,
    responses(
        (status = 200, description = "Updated tournament", body = TournamentSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["tournaments"],
    operation_id = "updateTournament"
)]
#[put("/tournaments/{id}")]
pub async fn update_tournament(
    caller: Caller,
    state: web::Data<HttpState>,
    path: web::Path<TournamentId>,
    payload: web::Json<TournamentRequest>,
) -> ApiResult<HttpResponse> {
    let tournament = state
        .services
        .tournaments
        .update(caller.context(), path.into_inner(), payload.into_inner().into())
        .await?;
    Ok(ok(tournament))
}

/// Delete a tournament that has not distributed points. Admin only.
#[utoipa::path(
    delete,
    path = "/api/v1/tournaments/{id}",
    params(("id" = String, Path, description = "Tournament id")),
    responses(
        (status = 200, description = "Tournament deleted"),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Points already distributed", body = ErrorSchema)
    ),
    tags = ["tournaments"],
    operation_id = "deleteTournament"
)]
#[delete("/tournaments/{id}")]
pub async fn delete_tournament(
    caller: Caller,
    state: web::Data<HttpState>,
    path: web::Path<TournamentId>,
) -> ApiResult<HttpResponse> {
    let id = path.into_inner();
    state.services.tournaments.delete(caller.context(), id).await?;
    Ok(ok(serde_json::json!({ "id": id })))
}

/// Move the status forward (`scheduled -> active -> completed`).
#[utoipa::path(
    patch,
    path = "/api/v1/tournaments/{id}/status",
    params(("id" = String, Path, description = "Tournament id")),
    request_body = StatusRequest,
    responses(
        (status = 200, description = "Updated tournament", body = TournamentSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Status cannot move backwards", body = ErrorSchema)
    ),
    tags = ["tournaments"],
    operation_id = "advanceTournamentStatus"
)]
#[patch("/tournaments/{id}/status")]
pub async fn advance_status(
    caller: Caller,
    state: web::Data<HttpState>,
    path: web::Path<TournamentId>,
    payload: web::Json<StatusRequest>,
) -> ApiResult<HttpResponse> {
    let tournament = state
        .services
        .tournaments
        .advance_status(caller.context(), path.into_inner(), payload.status)
        .await?;
    Ok(ok(tournament))
}

/// Give each listed user the tournament's reward. All recipients are
/// validated before any points are written.
#[utoipa::path(
    post,
    path = "/api/v1/tournaments/{id}/award",
    params(("id" = String, Path, description = "Tournament id")),
    request_body = AwardRequest,
    responses(
        (status = 201, description = "Recorded ledger entries", body = [PointTransactionSchema]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 409, description = "No active event", body = ErrorSchema)
    ),
    tags = ["points"],
    operation_id = "awardTournament"
)]
#[post("/tournaments/{id}/award")]
pub async fn award_tournament(
    caller: Caller,
    state: web::Data<HttpState>,
    path: web::Path<TournamentId>,
    payload: web::Json<AwardRequest>,
) -> ApiResult<HttpResponse> {
    let AwardRequest { user_ids, notes } = payload.into_inner();
    let entries = state
        .services
        .points
        .award_tournament(caller.context(), path.into_inner(), user_ids, notes)
        .await?;
    Ok(created(entries))
}

//! Event handlers.
//!
//! ```text
//! GET    /api/v1/events
//! POST   /api/v1/events
//! GET    /api/v1/events/active
//! GET    /api/v1/events/{id}
//! PUT    /api/v1/events/{id}
//! DELETE /api/v1/events/{id}
//! GET    /api/v1/events/{id}/tournaments
//! POST   /api/v1/events/{id}/tournaments
//! ```
//!
//! Reads are open to any logged-in user; writes need an admin, except
//! tournament creation which assistants may perform.

use std::collections::BTreeMap;

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{EventDraft, EventId, TournamentDraft};
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope::{created, ok};
use crate::inbound::http::schemas::{ErrorSchema, EventSchema, TournamentSchema};
use crate::inbound::http::session::Caller;
use crate::inbound::http::state::HttpState;

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventRequest {
    #[schema(example = "Summer Cup")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl From<EventRequest> for EventDraft {
    fn from(value: EventRequest) -> Self {
        Self {
            name: value.name,
            description: value.description,
            start_date: value.start_date,
            end_date: value.end_date,
            is_active: value.is_active,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TournamentRequest {
    #[schema(example = "Finals")]
    pub name: String,
    pub scheduled_time: DateTime<Utc>,
    #[schema(minimum = 1, maximum = 1000, example = 50)]
    pub points_reward: i64,
    #[serde(default)]
    pub specifications: BTreeMap<String, String>,
}

impl From<TournamentRequest> for TournamentDraft {
    fn from(value: TournamentRequest) -> Self {
        Self {
            name: value.name,
            scheduled_time: value.scheduled_time,
            points_reward: value.points_reward,
            specifications: value.specifications,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/events",
    responses(
        (status = 200, description = "Events", body = [EventSchema]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["events"],
    operation_id = "listEvents"
)]
#[get("/events")]
pub async fn list_events(_caller: Caller, state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    Ok(ok(state.services.events.list().await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/events",
    request_body = EventRequest,
    responses(
        (status = 201, description = "Event created", body = EventSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["events"],
    operation_id = "createEvent"
)]
#[post("/events")]
pub async fn create_event(
    caller: Caller,
    state: web::Data<HttpState>,
    payload: web::Json<EventRequest>,
) -> ApiResult<HttpResponse> {
    let event = state
        .services
        .events
        .create(caller.context(), payload.into_inner().into())
        .await?;
    Ok(created(event))
}

/// The event running now, or `null` between events.
#[utoipa::path(
    get,
    path = "/api/v1/events/active",
    responses(
        (status = 200, description = "Active event or null", body = EventSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["events"],
    operation_id = "activeEvent"
)]
#[get("/events/active")]
pub async fn active_event(_caller: Caller, state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    Ok(ok(state.services.events.active().await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/events/{id}",
    params(("id" = String, Path, description = "Event id")),
    responses(
        (status = 200, description = "Event", body = EventSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["events"],
    operation_id = "getEvent"
)]
#[get("/events/{id}")]
pub async fn get_event(
    _caller: Caller,
    state: web::Data<HttpState>,
    path: web::Path<EventId>,
) -> ApiResult<HttpResponse> {
    Ok(ok(state.services.events.get(path.into_inner()).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/events/{id}",
    params(("id" = String, Path, description = "Event id")),
    request_body = EventRequest,
    responses(
        (status = 200, description = "Updated event", body = EventSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["events"],
    operation_id = "updateEvent"
)]
#[put("/events/{id}")]
pub async fn update_event(
    caller: Caller,
    state: web::Data<HttpState>,
    path: web::Path<EventId>,
    payload: web::Json<EventRequest>,
) -> ApiResult<HttpResponse> {
    let event = state
        .services
        .events
        .update(caller.context(), path.into_inner(), payload.into_inner().into())
        .await?;
    Ok(ok(event))
}

/// Delete an event that has no tournaments or stands. Admin only.
#[utoipa::path(
    delete,
    path = "/api/v1/events/{id}",
    params(("id" = String, Path, description = "Event id")),
    responses(
        (status = 200, description = "Event deleted"),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Event still has dependants", body = ErrorSchema)
    ),
    tags = ["events"],
    operation_id = "deleteEvent"
)]
#[delete("/events/{id}")]
pub async fn delete_event(
    caller: Caller,
    state: web::Data<HttpState>,
    path: web::Path<EventId>,
) -> ApiResult<HttpResponse> {
    let id = path.into_inner();
    state.services.events.delete(caller.context(), id).await?;
    Ok(ok(serde_json::json!({ "id": id })))
}

#[utoipa::path(
    get,
    path = "/api/v1/events/{id}/tournaments",
    params(("id" = String, Path, description = "Event id")),
    responses(
        (status = 200, description = "Tournaments in the event", body = [TournamentSchema]),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["tournaments"],
    operation_id = "listTournaments"
)]
#[get("/events/{id}/tournaments")]
pub async fn list_tournaments(
    _caller: Caller,
    state: web::Data<HttpState>,
    path: web::Path<EventId>,
) -> ApiResult<HttpResponse> {
    let tournaments = state
        .services
        .tournaments
        .list_for_event(path.into_inner())
        .await?;
    Ok(ok(tournaments))
}

#[utoipa::path(
    post,
    path = "/api/v1/events/{id}/tournaments",
    params(("id" = String, Path, description = "Event id")),
    request_body = TournamentRequest,
    responses(
        (status = 201, description = "Tournament created", body = TournamentSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Event not found", body = ErrorSchema),
        (status = 409, description = "Event is not active", body = ErrorSchema)
    ),
    tags = ["tournaments"],
    operation_id = "createTournament"
)]
#[post("/events/{id}/tournaments")]
pub async fn create_tournament(
    caller: Caller,
    state: web::Data<HttpState>,
    path: web::Path<EventId>,
    payload: web::Json<TournamentRequest>,
) -> ApiResult<HttpResponse> {
    let tournament = state
        .services
        .tournaments
        .create(caller.context(), path.into_inner(), payload.into_inner().into())
        .await?;
    Ok(created(tournament))
}

//! Reporting handlers.
//!
//! ```text
//! GET /api/v1/reports/dashboard
//! GET /api/v1/reports/events/{id}
//! GET /api/v1/reports/stands/{id}
//! ```

use actix_web::{HttpResponse, get, web};

use crate::domain::{EventId, StandId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope::ok;
use crate::inbound::http::schemas::{
    DashboardStatsSchema, ErrorSchema, EventReportSchema, StandReportSchema,
};
use crate::inbound::http::session::Caller;
use crate::inbound::http::state::HttpState;

/// Platform-wide counters. Admin only.
#[utoipa::path(
    get,
    path = "/api/v1/reports/dashboard",
    responses(
        (status = 200, description = "Dashboard statistics", body = DashboardStatsSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["reports"],
    operation_id = "dashboard"
)]
#[get("/reports/dashboard")]
pub async fn dashboard(caller: Caller, state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    Ok(ok(state.services.reports.dashboard(caller.context()).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/reports/events/{id}",
    params(("id" = String, Path, description = "Event id")),
    responses(
        (status = 200, description = "Event report", body = EventReportSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["reports"],
    operation_id = "eventReport"
)]
#[get("/reports/events/{id}")]
pub async fn event_report(
    caller: Caller,
    state: web::Data<HttpState>,
    path: web::Path<EventId>,
) -> ApiResult<HttpResponse> {
    let report = state
        .services
        .reports
        .event_report(caller.context(), path.into_inner())
        .await?;
    Ok(ok(report))
}

/// Per-product breakdown. The stand's manager or an admin.
#[utoipa::path(
    get,
    path = "/api/v1/reports/stands/{id}",
    params(("id" = String, Path, description = "Stand id")),
    responses(
        (status = 200, description = "Stand report", body = StandReportSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["reports"],
    operation_id = "standReport"
)]
#[get("/reports/stands/{id}")]
pub async fn stand_report(
    caller: Caller,
    state: web::Data<HttpState>,
    path: web::Path<StandId>,
) -> ApiResult<HttpResponse> {
    let report = state
        .services
        .reports
        .stand_report(caller.context(), path.into_inner())
        .await?;
    Ok(ok(report))
}

//! Notification inbox handlers.
//!
//! ```text
//! GET  /api/v1/notifications?unreadOnly=true&limit=20
//! GET  /api/v1/notifications/unread-count
//! POST /api/v1/notifications/{id}/read
//! POST /api/v1/notifications/read-all
//! POST /api/v1/notifications/broadcast {"title":"Finals at 3pm","message":"..."}
//! ```
//!
//! Every route acts on the caller's own inbox except broadcast, which is
//! admin only and writes to every account.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{NotificationId, NotificationKind};
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope::{created, ok};
use crate::inbound::http::schemas::{ErrorSchema, NotificationKindSchema, NotificationSchema};
use crate::inbound::http::session::Caller;
use crate::inbound::http::state::HttpState;

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct InboxQuery {
    #[serde(default)]
    pub unread_only: bool,
    /// Newest entries to return (default 50, at most 200).
    pub limit: Option<usize>,
}

fn announcement() -> NotificationKind {
    NotificationKind::Announcement
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastRequest {
    /// Defaults to `announcement`.
    #[serde(default = "announcement")]
    #[schema(value_type = NotificationKindSchema)]
    pub kind: NotificationKind,
    #[schema(max_length = 120)]
    pub title: String,
    #[serde(default)]
    #[schema(max_length = 1000)]
    pub message: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CountResponse {
    pub count: u64,
}

#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    params(InboxQuery),
    responses(
        (status = 200, description = "Notifications, newest first", body = [NotificationSchema]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "listNotifications"
)]
#[get("/notifications")]
pub async fn list_notifications(
    caller: Caller,
    state: web::Data<HttpState>,
    query: web::Query<InboxQuery>,
) -> ApiResult<HttpResponse> {
    let inbox = state
        .services
        .notifications
        .list(caller.context(), query.unread_only, query.limit)
        .await?;
    Ok(ok(inbox))
}

#[utoipa::path(
    get,
    path = "/api/v1/notifications/unread-count",
    responses(
        (status = 200, description = "Unread notifications", body = CountResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "unreadCount"
)]
#[get("/notifications/unread-count")]
pub async fn unread_count(caller: Caller, state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let count = state
        .services
        .notifications
        .unread_count(caller.context())
        .await?;
    Ok(ok(CountResponse {
        count: u64::try_from(count).unwrap_or_default(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/notifications/{id}/read",
    params(("id" = String, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Marked read"),
        (status = 404, description = "Not one of the caller's notifications", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "markNotificationRead"
)]
#[post("/notifications/{id}/read")]
pub async fn mark_read(
    caller: Caller,
    state: web::Data<HttpState>,
    path: web::Path<NotificationId>,
) -> ApiResult<HttpResponse> {
    let id = path.into_inner();
    state
        .services
        .notifications
        .mark_read(caller.context(), id)
        .await?;
    Ok(ok(serde_json::json!({ "id": id })))
}

#[utoipa::path(
    post,
    path = "/api/v1/notifications/read-all",
    responses(
        (status = 200, description = "Notifications marked read", body = CountResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "markAllNotificationsRead"
)]
#[post("/notifications/read-all")]
pub async fn mark_all_read(caller: Caller, state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let count = state
        .services
        .notifications
        .mark_all_read(caller.context())
        .await?;
    Ok(ok(CountResponse { count }))
}

#[utoipa::path(
    post,
    path = "/api/v1/notifications/broadcast",
    request_body = BroadcastRequest,
    responses(
        (status = 201, description = "Recipients notified", body = CountResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "broadcastNotification"
)]
#[post("/notifications/broadcast")]
pub async fn broadcast(
    caller: Caller,
    state: web::Data<HttpState>,
    payload: web::Json<BroadcastRequest>,
) -> ApiResult<HttpResponse> {
    let recipients = state
        .services
        .notifications
        .broadcast(
            caller.context(),
            payload.kind,
            &payload.title,
            &payload.message,
        )
        .await?;
    Ok(created(CountResponse {
        count: u64::try_from(recipients).unwrap_or_default(),
    }))
}

//! Points assignment handler.
//!
//! ```text
//! POST /api/v1/points {"userId":"...","amount":25,"source":"bonus","notes":"helped set up"}
//! ```
//!
//! History is served per user from [`super::users`].

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{AssignPointsRequest, PointSource, TournamentId, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope::created;
use crate::inbound::http::schemas::{ErrorSchema, PointSourceSchema, PointTransactionSchema};
use crate::inbound::http::session::Caller;
use crate::inbound::http::state::HttpState;

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignPointsBody {
    #[schema(value_type = String, format = Uuid)]
    pub user_id: UserId,
    #[schema(minimum = 1, maximum = 1000, example = 25)]
    pub amount: i64,
    /// `tournament`, `challenge` or `bonus`.
    #[schema(value_type = PointSourceSchema)]
    pub source: PointSource,
    /// Required when `source` is `tournament`; ignored otherwise.
    #[serde(default)]
    #[schema(value_type = Option<String>, format = Uuid)]
    pub tournament_id: Option<TournamentId>,
    #[serde(default)]
    #[schema(max_length = 500)]
    pub notes: Option<String>,
}

impl From<AssignPointsBody> for AssignPointsRequest {
    fn from(value: AssignPointsBody) -> Self {
        Self {
            user_id: value.user_id,
            amount: value.amount,
            source: value.source,
            tournament_id: value.tournament_id,
            notes: value.notes,
        }
    }
}

/// Award points to one user during the active event. Assistant or higher.
///
/// Validation failures are reported together in `details.errors`; nothing is
/// written unless every check passes.
#[utoipa::path(
    post,
    path = "/api/v1/points",
    request_body = AssignPointsBody,
    responses(
        (status = 201, description = "Recorded ledger entry", body = PointTransactionSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 409, description = "No active event", body = ErrorSchema)
    ),
    tags = ["points"],
    operation_id = "assignPoints"
)]
#[post("/points")]
pub async fn assign_points(
    caller: Caller,
    state: web::Data<HttpState>,
    payload: web::Json<AssignPointsBody>,
) -> ApiResult<HttpResponse> {
    let entry = state
        .services
        .points
        .assign(caller.context(), payload.into_inner().into())
        .await?;
    Ok(created(entry))
}

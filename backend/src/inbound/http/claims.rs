//! Claim handlers.
//!
//! ```text
//! POST /api/v1/claims {"productId":"...","standId":"..."}
//! POST /api/v1/claims {"productId":"...","standId":"...","userId":"...","processedBy":"..."}
//! GET  /api/v1/claims/{id}
//! POST /api/v1/claims/{id}/process
//! ```
//!
//! Without `userId` the claim is made for the caller. A stand manager
//! redeeming directly at the counter names the claimant in `userId` and
//! themselves in `processedBy`.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{ClaimId, CreateClaim, ProductId, StandId, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope::{created, ok};
use crate::inbound::http::schemas::{ClaimSchema, ErrorSchema};
use crate::inbound::http::session::Caller;
use crate::inbound::http::state::HttpState;

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRequest {
    #[schema(value_type = String, format = Uuid)]
    pub product_id: ProductId,
    #[schema(value_type = String, format = Uuid)]
    pub stand_id: StandId,
    /// Claimant; defaults to the caller.
    #[serde(default)]
    #[schema(value_type = Option<String>, format = Uuid)]
    pub user_id: Option<UserId>,
    /// Processor for direct redemption; must be the caller.
    #[serde(default)]
    #[schema(value_type = Option<String>, format = Uuid)]
    pub processed_by: Option<UserId>,
}

/// Create a claim. Pending unless processed directly by the stand.
#[utoipa::path(
    post,
    path = "/api/v1/claims",
    request_body = ClaimRequest,
    responses(
        (status = 201, description = "Claim created", body = ClaimSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 409, description = "Duplicate claim or insufficient points", body = ErrorSchema)
    ),
    tags = ["claims"],
    operation_id = "createClaim"
)]
#[post("/claims")]
pub async fn create_claim(
    caller: Caller,
    state: web::Data<HttpState>,
    payload: web::Json<ClaimRequest>,
) -> ApiResult<HttpResponse> {
    let request = payload.into_inner();
    let input = CreateClaim {
        user_id: request.user_id.unwrap_or_else(|| caller.user_id()),
        product_id: request.product_id,
        stand_id: request.stand_id,
        processed_by: request.processed_by,
    };
    let claim = state.services.claims.create(caller.context(), input).await?;
    Ok(created(claim))
}

#[utoipa::path(
    get,
    path = "/api/v1/claims/{id}",
    params(("id" = String, Path, description = "Claim id")),
    responses(
        (status = 200, description = "Claim", body = ClaimSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["claims"],
    operation_id = "getClaim"
)]
#[get("/claims/{id}")]
pub async fn get_claim(
    caller: Caller,
    state: web::Data<HttpState>,
    path: web::Path<ClaimId>,
) -> ApiResult<HttpResponse> {
    let claim = state
        .services
        .claims
        .get(caller.context(), path.into_inner())
        .await?;
    Ok(ok(claim))
}

/// Complete a pending claim and record the redemption. Stand manager of the
/// claim's stand or admin.
#[utoipa::path(
    post,
    path = "/api/v1/claims/{id}/process",
    params(("id" = String, Path, description = "Claim id")),
    responses(
        (status = 200, description = "Completed claim", body = ClaimSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Already processed or insufficient points", body = ErrorSchema)
    ),
    tags = ["claims"],
    operation_id = "processClaim"
)]
#[post("/claims/{id}/process")]
pub async fn process_claim(
    caller: Caller,
    state: web::Data<HttpState>,
    path: web::Path<ClaimId>,
) -> ApiResult<HttpResponse> {
    let claim = state
        .services
        .claims
        .process(caller.context(), path.into_inner())
        .await?;
    Ok(ok(claim))
}

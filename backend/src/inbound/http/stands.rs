//! Stand and product handlers.
//!
//! ```text
//! GET    /api/v1/stands?eventId=...
//! POST   /api/v1/stands
//! GET    /api/v1/stands/{id}
//! PUT    /api/v1/stands/{id}
//! DELETE /api/v1/stands/{id}
//! GET    /api/v1/stands/{id}/products?activeOnly=false
//! POST   /api/v1/stands/{id}/products
//! GET    /api/v1/stands/{id}/claims?status=pending
//! GET    /api/v1/products/{id}
//! PUT    /api/v1/products/{id}
//! PATCH  /api/v1/products/{id}/active {"isActive":false}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use serde::{Deserialize, Serialize};

use crate::domain::{ClaimStatus, EventId, ProductDraft, ProductId, StandDraft, StandId, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope::{created, ok};
use crate::inbound::http::schemas::{ClaimSchema, ErrorSchema, ProductSchema, StandSchema};
use crate::inbound::http::session::Caller;
use crate::inbound::http::state::HttpState;

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StandRequest {
    #[schema(example = "Merch corner")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Must hold the stand manager role or higher.
    #[schema(value_type = String, format = Uuid)]
    pub manager_id: UserId,
    #[schema(value_type = String, format = Uuid)]
    pub event_id: EventId,
}

impl From<StandRequest> for StandDraft {
    fn from(value: StandRequest) -> Self {
        Self {
            name: value.name,
            description: value.description,
            manager_id: value.manager_id,
            event_id: value.event_id,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    #[schema(example = "Team scarf")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[schema(minimum = 1, example = 100)]
    pub points_required: i64,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl From<ProductRequest> for ProductDraft {
    fn from(value: ProductRequest) -> Self {
        Self {
            name: value.name,
            description: value.description,
            points_required: value.points_required,
            image_url: value.image_url,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductActiveRequest {
    pub is_active: bool,
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct StandListQuery {
    /// Restrict to one event.
    #[param(value_type = Option<String>, format = Uuid)]
    pub event_id: Option<EventId>,
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProductListQuery {
    /// Only redeemable products (default true).
    pub active_only: Option<bool>,
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct StandClaimsQuery {
    /// `pending` or `completed`.
    #[param(value_type = Option<String>)]
    pub status: Option<ClaimStatus>,
}

#[utoipa::path(
    get,
    path = "/api/v1/stands",
    params(StandListQuery),
    responses(
        (status = 200, description = "Stands", body = [StandSchema]),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["stands"],
    operation_id = "listStands"
)]
#[get("/stands")]
pub async fn list_stands(
    _caller: Caller,
    state: web::Data<HttpState>,
    query: web::Query<StandListQuery>,
) -> ApiResult<HttpResponse> {
    Ok(ok(state.services.stands.list(query.event_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/stands",
    request_body = StandRequest,
    responses(
        (status = 201, description = "Stand created", body = StandSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["stands"],
    operation_id = "createStand"
)]
#[post("/stands")]
pub async fn create_stand(
    caller: Caller,
    state: web::Data<HttpState>,
    payload: web::Json<StandRequest>,
) -> ApiResult<HttpResponse> {
    let stand = state
        .services
        .stands
        .create(caller.context(), payload.into_inner().into())
        .await?;
    Ok(created(stand))
}

#[utoipa::path(
    get,
    path = "/api/v1/stands/{id}",
    params(("id" = String, Path, description = "Stand id")),
    responses(
        (status = 200, description = "Stand", body = StandSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["stands"],
    operation_id = "getStand"
)]
#[get("/stands/{id}")]
pub async fn get_stand(
    _caller: Caller,
    state: web::Data<HttpState>,
    path: web::Path<StandId>,
) -> ApiResult<HttpResponse> {
    Ok(ok(state.services.stands.get(path.into_inner()).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/stands/{id}",
    params(("id" = String, Path, description = "Stand id")),
    request_body = StandRequest,
    responses(
        (status = 200, description = "Updated stand", body = StandSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["stands"],
    operation_id = "updateStand"
)]
#[put("/stands/{id}")]
pub async fn update_stand(
    caller: Caller,
    state: web::Data<HttpState>,
    path: web::Path<StandId>,
    payload: web::Json<StandRequest>,
) -> ApiResult<HttpResponse> {
    let stand = state
        .services
        .stands
        .update(caller.context(), path.into_inner(), payload.into_inner().into())
        .await?;
    Ok(ok(stand))
}

/// Delete a stand that has no claims, with its products. Admin only.
#[utoipa::path(
    delete,
    path = "/api/v1/stands/{id}",
    params(("id" = String, Path, description = "Stand id")),
    responses(
        (status = 200, description = "Stand deleted"),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Stand has claims", body = ErrorSchema)
    ),
    tags = ["stands"],
    operation_id = "deleteStand"
)]
#[delete("/stands/{id}")]
pub async fn delete_stand(
    caller: Caller,
    state: web::Data<HttpState>,
    path: web::Path<StandId>,
) -> ApiResult<HttpResponse> {
    let id = path.into_inner();
    state.services.stands.delete(caller.context(), id).await?;
    Ok(ok(serde_json::json!({ "id": id })))
}

#[utoipa::path(
    get,
    path = "/api/v1/stands/{id}/products",
    params(("id" = String, Path, description = "Stand id"), ProductListQuery),
    responses(
        (status = 200, description = "Products", body = [ProductSchema]),
        (status = 404, description = "Stand not found", body = ErrorSchema)
    ),
    tags = ["stands"],
    operation_id = "listProducts"
)]
#[get("/stands/{id}/products")]
pub async fn list_products(
    _caller: Caller,
    state: web::Data<HttpState>,
    path: web::Path<StandId>,
    query: web::Query<ProductListQuery>,
) -> ApiResult<HttpResponse> {
    let products = state
        .services
        .stands
        .list_products(path.into_inner(), query.active_only.unwrap_or(true))
        .await?;
    Ok(ok(products))
}

#[utoipa::path(
    post,
    path = "/api/v1/stands/{id}/products",
    params(("id" = String, Path, description = "Stand id")),
    request_body = ProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Stand not found", body = ErrorSchema)
    ),
    tags = ["stands"],
    operation_id = "createProduct"
)]
#[post("/stands/{id}/products")]
pub async fn create_product(
    caller: Caller,
    state: web::Data<HttpState>,
    path: web::Path<StandId>,
    payload: web::Json<ProductRequest>,
) -> ApiResult<HttpResponse> {
    let product = state
        .services
        .stands
        .create_product(caller.context(), path.into_inner(), payload.into_inner().into())
        .await?;
    Ok(created(product))
}

/// Claims at the stand. Its manager or an admin.
#[utoipa::path(
    get,
    path = "/api/v1/stands/{id}/claims",
    params(("id" = String, Path, description = "Stand id"), StandClaimsQuery),
    responses(
        (status = 200, description = "Claims", body = [ClaimSchema]),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Stand not found", body = ErrorSchema)
    ),
    tags = ["claims"],
    operation_id = "standClaims"
)]
#[get("/stands/{id}/claims")]
pub async fn stand_claims(
    caller: Caller,
    state: web::Data<HttpState>,
    path: web::Path<StandId>,
    query: web::Query<StandClaimsQuery>,
) -> ApiResult<HttpResponse> {
    let claims = state
        .services
        .claims
        .list_for_stand(caller.context(), path.into_inner(), query.status)
        .await?;
    Ok(ok(claims))
}

#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product", body = ProductSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["stands"],
    operation_id = "getProduct"
)]
#[get("/products/{id}")]
pub async fn get_product(
    _caller: Caller,
    state: web::Data<HttpState>,
    path: web::Path<ProductId>,
) -> ApiResult<HttpResponse> {
    Ok(ok(state.services.stands.get_product(path.into_inner()).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    request_body = ProductRequest,
    responses(
        (status = 200, description = "Updated product", body = ProductSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["stands"],
    operation_id = "updateProduct"
)]
#[put("/products/{id}")]
pub async fn update_product(
    caller: Caller,
    state: web::Data<HttpState>,
    path: web::Path<ProductId>,
    payload: web::Json<ProductRequest>,
) -> ApiResult<HttpResponse> {
    let product = state
        .services
        .stands
        .update_product(caller.context(), path.into_inner(), payload.into_inner().into())
        .await?;
    Ok(ok(product))
}

#[utoipa::path(
    patch,
    path = "/api/v1/products/{id}/active",
    params(("id" = String, Path, description = "Product id")),
    request_body = ProductActiveRequest,
    responses(
        (status = 200, description = "Updated product", body = ProductSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["stands"],
    operation_id = "setProductActive"
)]
#[patch("/products/{id}/active")]
pub async fn set_product_active(
    caller: Caller,
    state: web::Data<HttpState>,
    path: web::Path<ProductId>,
    payload: web::Json<ProductActiveRequest>,
) -> ApiResult<HttpResponse> {
    let product = state
        .services
        .stands
        .set_product_active(caller.context(), path.into_inner(), payload.is_active)
        .await?;
    Ok(ok(product))
}

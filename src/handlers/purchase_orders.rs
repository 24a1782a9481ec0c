use axum::{extract::State, response::Response, routing::get, Router};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use super::common::{
    created_response, message_response, resolve_paging, success_response, validate_input, ApiJson,
    ApiPath, ApiQuery, PaginatedResponse,
};
use crate::entities::{OrderStatus, PaymentStatus};
use crate::errors::{ErrorResponse, ServiceError};
use crate::finance::OrderStats;
use crate::services::purchase_orders::{
    PurchaseOrderDetail, PurchaseOrderFilter, PurchaseOrderInput, PurchaseOrderUpdate,
    DEFAULT_STATS_PERIOD_DAYS,
};
use crate::{ApiResponse, AppState};

const MAX_STATS_PERIOD_DAYS: i64 = 3650;

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PurchaseOrderQuery {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub bike_id: Option<Uuid>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatsQuery {
    /// Window for the `recent` figures, in days (default 30)
    pub period: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/admin/purchase-orders",
    params(PurchaseOrderQuery),
    responses(
        (status = 200, description = "Orders page with derived profit", body = ApiResponse<PaginatedResponse<PurchaseOrderDetail>>)
    ),
    tag = "purchase-orders"
)]
pub async fn list_purchase_orders(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PurchaseOrderQuery>,
) -> Result<Response, ServiceError> {
    let (page, limit) = resolve_paging(query.page, query.limit, &state.config);
    let filter = PurchaseOrderFilter {
        status: query.status,
        payment_status: query.payment_status,
        bike_id: query.bike_id,
    };

    let orders = state.services.purchase_orders.list(filter, page, limit).await?;
    Ok(success_response(
        "Purchase orders retrieved successfully",
        PaginatedResponse::from_page(orders, page, limit),
    ))
}

#[utoipa::path(
    post,
    path = "/api/admin/purchase-orders",
    request_body = PurchaseOrderInput,
    responses(
        (status = 201, description = "Purchase order created", body = ApiResponse<PurchaseOrderDetail>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Bike or partner not found", body = ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn create_purchase_order(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<PurchaseOrderInput>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let order = state.services.purchase_orders.create(payload).await?;
    Ok(created_response("Purchase order created successfully", order))
}

#[utoipa::path(
    get,
    path = "/api/admin/purchase-orders/stats",
    params(StatsQuery),
    responses(
        (status = 200, description = "Order statistics", body = ApiResponse<OrderStats>),
        (status = 400, description = "Invalid period", body = ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn purchase_order_stats(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<StatsQuery>,
) -> Result<Response, ServiceError> {
    let period = query.period.unwrap_or(DEFAULT_STATS_PERIOD_DAYS);
    if !(1..=MAX_STATS_PERIOD_DAYS).contains(&period) {
        return Err(ServiceError::BadRequest(format!(
            "period must be between 1 and {} days",
            MAX_STATS_PERIOD_DAYS
        )));
    }

    let stats = state.services.purchase_orders.stats(period).await?;
    Ok(success_response("Purchase order statistics retrieved successfully", stats))
}

#[utoipa::path(
    get,
    path = "/api/admin/purchase-orders/{id}",
    params(("id" = Uuid, Path, description = "Purchase order ID")),
    responses(
        (status = 200, description = "Purchase order with totalPartnerProfit and netProfit", body = ApiResponse<PurchaseOrderDetail>),
        (status = 404, description = "Purchase order not found", body = ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn get_purchase_order(
    State(state): State<AppState>,
    ApiPath(order_id): ApiPath<Uuid>,
) -> Result<Response, ServiceError> {
    let order = state.services.purchase_orders.get(order_id).await?;
    Ok(success_response("Purchase order retrieved successfully", order))
}

/// Status change, payment change or full update, selected by `updateType`
#[utoipa::path(
    put,
    path = "/api/admin/purchase-orders/{id}",
    params(("id" = Uuid, Path, description = "Purchase order ID")),
    request_body = PurchaseOrderUpdate,
    responses(
        (status = 200, description = "Purchase order updated", body = ApiResponse<PurchaseOrderDetail>),
        (status = 400, description = "Invalid update", body = ErrorResponse),
        (status = 404, description = "Order, bike or partner not found", body = ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn update_purchase_order(
    State(state): State<AppState>,
    ApiPath(order_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<PurchaseOrderUpdate>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let order = state.services.purchase_orders.update(order_id, payload).await?;
    Ok(success_response("Purchase order updated successfully", order))
}

#[utoipa::path(
    delete,
    path = "/api/admin/purchase-orders/{id}",
    params(("id" = Uuid, Path, description = "Purchase order ID")),
    responses(
        (status = 200, description = "Purchase order deleted"),
        (status = 400, description = "Order is confirmed", body = ErrorResponse),
        (status = 404, description = "Purchase order not found", body = ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn delete_purchase_order(
    State(state): State<AppState>,
    ApiPath(order_id): ApiPath<Uuid>,
) -> Result<Response, ServiceError> {
    state.services.purchase_orders.delete(order_id).await?;
    Ok(message_response("Purchase order deleted successfully"))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/purchase-orders",
            get(list_purchase_orders).post(create_purchase_order),
        )
        .route("/purchase-orders/stats", get(purchase_order_stats))
        .route(
            "/purchase-orders/:id",
            get(get_purchase_order)
                .put(update_purchase_order)
                .delete(delete_purchase_order),
        )
}

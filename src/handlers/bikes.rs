use axum::{extract::State, response::Response, routing::get, Router};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use super::common::{
    created_response, resolve_paging, success_response, validate_input, ApiJson, ApiPath, ApiQuery,
    PaginatedResponse,
};
use crate::entities::BikeStatus;
use crate::errors::{ErrorResponse, ServiceError};
use crate::services::bikes::{
    BikeDetail, BikeFilter, BikeInput, BikeUpdate, PublicBike, PublicBikeFilter,
};
use crate::{ApiResponse, AppState};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PublicBikeQuery {
    pub brand: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    /// Matches name, brand or model
    pub search: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AdminBikeQuery {
    pub status: Option<BikeStatus>,
    pub brand: Option<String>,
    pub search: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// Bikes for sale
#[utoipa::path(
    get,
    path = "/api/bikes",
    params(PublicBikeQuery),
    responses(
        (status = 200, description = "Bikes with status active or available", body = ApiResponse<PaginatedResponse<PublicBike>>)
    ),
    tag = "storefront"
)]
pub async fn list_public_bikes(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PublicBikeQuery>,
) -> Result<Response, ServiceError> {
    let (page, limit) = resolve_paging(query.page, query.limit, &state.config);
    let filter = PublicBikeFilter {
        brand: query.brand,
        min_price: query.min_price,
        max_price: query.max_price,
        search: query.search,
    };

    let bikes = state.services.bikes.list_public(filter, page, limit).await?;
    Ok(success_response(
        "Bikes retrieved successfully",
        PaginatedResponse::from_page(bikes, page, limit),
    ))
}

#[utoipa::path(
    get,
    path = "/api/bikes/{id}",
    params(("id" = Uuid, Path, description = "Bike ID")),
    responses(
        (status = 200, description = "Bike found", body = ApiResponse<PublicBike>),
        (status = 404, description = "Bike not found or not for sale", body = ErrorResponse)
    ),
    tag = "storefront"
)]
pub async fn get_public_bike(
    State(state): State<AppState>,
    ApiPath(bike_id): ApiPath<Uuid>,
) -> Result<Response, ServiceError> {
    let bike = state.services.bikes.get_public(bike_id).await?;
    Ok(success_response("Bike retrieved successfully", bike))
}

#[utoipa::path(
    get,
    path = "/api/admin/bikes",
    params(AdminBikeQuery),
    responses(
        (status = 200, description = "Inventory page", body = ApiResponse<PaginatedResponse<BikeDetail>>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not an admin", body = ErrorResponse)
    ),
    tag = "bikes"
)]
pub async fn list_bikes(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<AdminBikeQuery>,
) -> Result<Response, ServiceError> {
    let (page, limit) = resolve_paging(query.page, query.limit, &state.config);
    let filter = BikeFilter {
        status: query.status,
        brand: query.brand,
        search: query.search,
    };

    let bikes = state.services.bikes.list(filter, page, limit).await?;
    Ok(success_response(
        "Bikes retrieved successfully",
        PaginatedResponse::from_page(bikes, page, limit),
    ))
}

#[utoipa::path(
    post,
    path = "/api/admin/bikes",
    request_body = BikeInput,
    responses(
        (status = 201, description = "Bike created", body = ApiResponse<BikeDetail>),
        (status = 400, description = "Invalid bike or partner shares", body = ErrorResponse),
        (status = 404, description = "Referenced partner not found", body = ErrorResponse)
    ),
    tag = "bikes"
)]
pub async fn create_bike(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<BikeInput>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let bike = state.services.bikes.create(payload).await?;
    Ok(created_response("Bike created successfully", bike))
}

#[utoipa::path(
    get,
    path = "/api/admin/bikes/{id}",
    params(("id" = Uuid, Path, description = "Bike ID")),
    responses(
        (status = 200, description = "Bike with partners and service history", body = ApiResponse<BikeDetail>),
        (status = 404, description = "Bike not found", body = ErrorResponse)
    ),
    tag = "bikes"
)]
pub async fn get_bike(
    State(state): State<AppState>,
    ApiPath(bike_id): ApiPath<Uuid>,
) -> Result<Response, ServiceError> {
    let bike = state.services.bikes.get(bike_id).await?;
    Ok(success_response("Bike retrieved successfully", bike))
}

/// Status toggle (`updateType: "status"`) or full update
#[utoipa::path(
    put,
    path = "/api/admin/bikes/{id}",
    params(("id" = Uuid, Path, description = "Bike ID")),
    request_body = BikeUpdate,
    responses(
        (status = 200, description = "Bike updated", body = ApiResponse<BikeDetail>),
        (status = 400, description = "Invalid update", body = ErrorResponse),
        (status = 404, description = "Bike or partner not found", body = ErrorResponse)
    ),
    tag = "bikes"
)]
pub async fn update_bike(
    State(state): State<AppState>,
    ApiPath(bike_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<BikeUpdate>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let bike = state.services.bikes.update(bike_id, payload).await?;
    Ok(success_response("Bike updated successfully", bike))
}

/// Marks the bike inactive; bikes are never removed
#[utoipa::path(
    delete,
    path = "/api/admin/bikes/{id}",
    params(("id" = Uuid, Path, description = "Bike ID")),
    responses(
        (status = 200, description = "Bike deactivated", body = ApiResponse<BikeDetail>),
        (status = 404, description = "Bike not found", body = ErrorResponse)
    ),
    tag = "bikes"
)]
pub async fn delete_bike(
    State(state): State<AppState>,
    ApiPath(bike_id): ApiPath<Uuid>,
) -> Result<Response, ServiceError> {
    let bike = state.services.bikes.deactivate(bike_id).await?;
    Ok(success_response("Bike deactivated successfully", bike))
}

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/bikes", get(list_public_bikes))
        .route("/bikes/:id", get(get_public_bike))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/bikes", get(list_bikes).post(create_bike))
        .route(
            "/bikes/:id",
            get(get_bike).put(update_bike).delete(delete_bike),
        )
}

use axum::{extract::State, response::Response, routing::{get, put}, Router};
use uuid::Uuid;

use super::common::{
    created_response, message_response, success_response, validate_input, ApiJson, ApiPath,
};
use crate::entities::bike_wash_location;
use crate::errors::{ErrorResponse, ServiceError};
use crate::services::bike_wash::BikeWashInput;
use crate::{ApiResponse, AppState};

#[utoipa::path(
    get,
    path = "/api/bike-wash",
    responses(
        (status = 200, description = "Active bike wash locations", body = ApiResponse<Vec<bike_wash_location::Model>>)
    ),
    tag = "storefront"
)]
pub async fn list_public_locations(
    State(state): State<AppState>,
) -> Result<Response, ServiceError> {
    let locations = state.services.bike_wash.list_active().await?;
    Ok(success_response("Bike wash locations retrieved successfully", locations))
}

#[utoipa::path(
    get,
    path = "/api/admin/bike-wash",
    responses(
        (status = 200, description = "All bike wash locations", body = ApiResponse<Vec<bike_wash_location::Model>>)
    ),
    tag = "bike-wash"
)]
pub async fn list_locations(State(state): State<AppState>) -> Result<Response, ServiceError> {
    let locations = state.services.bike_wash.list_all().await?;
    Ok(success_response("Bike wash locations retrieved successfully", locations))
}

#[utoipa::path(
    post,
    path = "/api/admin/bike-wash",
    request_body = BikeWashInput,
    responses(
        (status = 201, description = "Location created", body = ApiResponse<bike_wash_location::Model>),
        (status = 400, description = "Invalid location", body = ErrorResponse)
    ),
    tag = "bike-wash"
)]
pub async fn create_location(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<BikeWashInput>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let location = state.services.bike_wash.create(payload).await?;
    Ok(created_response("Bike wash location created successfully", location))
}

#[utoipa::path(
    put,
    path = "/api/admin/bike-wash/{id}",
    params(("id" = Uuid, Path, description = "Location ID")),
    request_body = BikeWashInput,
    responses(
        (status = 200, description = "Location updated", body = ApiResponse<bike_wash_location::Model>),
        (status = 404, description = "Location not found", body = ErrorResponse)
    ),
    tag = "bike-wash"
)]
pub async fn update_location(
    State(state): State<AppState>,
    ApiPath(location_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<BikeWashInput>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let location = state.services.bike_wash.update(location_id, payload).await?;
    Ok(success_response("Bike wash location updated successfully", location))
}

#[utoipa::path(
    delete,
    path = "/api/admin/bike-wash/{id}",
    params(("id" = Uuid, Path, description = "Location ID")),
    responses(
        (status = 200, description = "Location deleted"),
        (status = 404, description = "Location not found", body = ErrorResponse)
    ),
    tag = "bike-wash"
)]
pub async fn delete_location(
    State(state): State<AppState>,
    ApiPath(location_id): ApiPath<Uuid>,
) -> Result<Response, ServiceError> {
    state.services.bike_wash.delete(location_id).await?;
    Ok(message_response("Bike wash location deleted successfully"))
}

pub fn public_routes() -> Router<AppState> {
    Router::new().route("/bike-wash", get(list_public_locations))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/bike-wash", get(list_locations).post(create_location))
        .route("/bike-wash/:id", put(update_location).delete(delete_location))
}

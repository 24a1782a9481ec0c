use axum::{extract::State, response::Response, routing::{get, put}, Router};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use super::common::{
    created_response, message_response, success_response, validate_input, ApiJson, ApiPath,
    ApiQuery,
};
use crate::entities::public_info;
use crate::errors::{ErrorResponse, ServiceError};
use crate::services::public_info::PublicInfoInput;
use crate::{ApiResponse, AppState};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PublicInfoQuery {
    pub category: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/public-info",
    params(PublicInfoQuery),
    responses(
        (status = 200, description = "Published entries by sortOrder", body = ApiResponse<Vec<public_info::Model>>)
    ),
    tag = "storefront"
)]
pub async fn list_published(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PublicInfoQuery>,
) -> Result<Response, ServiceError> {
    let entries = state.services.public_info.list_published(query.category).await?;
    Ok(success_response("Public info retrieved successfully", entries))
}

#[utoipa::path(
    get,
    path = "/api/admin/public-info",
    responses(
        (status = 200, description = "All entries", body = ApiResponse<Vec<public_info::Model>>)
    ),
    tag = "public-info"
)]
pub async fn list_entries(State(state): State<AppState>) -> Result<Response, ServiceError> {
    let entries = state.services.public_info.list_all().await?;
    Ok(success_response("Public info retrieved successfully", entries))
}

#[utoipa::path(
    post,
    path = "/api/admin/public-info",
    request_body = PublicInfoInput,
    responses(
        (status = 201, description = "Entry created", body = ApiResponse<public_info::Model>),
        (status = 400, description = "Invalid entry", body = ErrorResponse)
    ),
    tag = "public-info"
)]
pub async fn create_entry(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<PublicInfoInput>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let entry = state.services.public_info.create(payload).await?;
    Ok(created_response("Public info created successfully", entry))
}

#[utoipa::path(
    put,
    path = "/api/admin/public-info/{id}",
    params(("id" = Uuid, Path, description = "Entry ID")),
    request_body = PublicInfoInput,
    responses(
        (status = 200, description = "Entry updated", body = ApiResponse<public_info::Model>),
        (status = 404, description = "Entry not found", body = ErrorResponse)
    ),
    tag = "public-info"
)]
pub async fn update_entry(
    State(state): State<AppState>,
    ApiPath(entry_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<PublicInfoInput>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let entry = state.services.public_info.update(entry_id, payload).await?;
    Ok(success_response("Public info updated successfully", entry))
}

#[utoipa::path(
    delete,
    path = "/api/admin/public-info/{id}",
    params(("id" = Uuid, Path, description = "Entry ID")),
    responses(
        (status = 200, description = "Entry deleted"),
        (status = 404, description = "Entry not found", body = ErrorResponse)
    ),
    tag = "public-info"
)]
pub async fn delete_entry(
    State(state): State<AppState>,
    ApiPath(entry_id): ApiPath<Uuid>,
) -> Result<Response, ServiceError> {
    state.services.public_info.delete(entry_id).await?;
    Ok(message_response("Public info deleted successfully"))
}

pub fn public_routes() -> Router<AppState> {
    Router::new().route("/public-info", get(list_published))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/public-info", get(list_entries).post(create_entry))
        .route("/public-info/:id", put(update_entry).delete(delete_entry))
}

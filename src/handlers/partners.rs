use axum::{extract::State, response::Response, routing::get, Router};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use super::common::{
    created_response, resolve_paging, success_response, validate_input, ApiJson, ApiPath, ApiQuery,
    PaginatedResponse,
};
use crate::entities::partner;
use crate::errors::{ErrorResponse, ServiceError};
use crate::services::partners::{PartnerAnalyticsReport, PartnerFilter, PartnerInput};
use crate::{ApiResponse, AppState};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PartnerQuery {
    pub is_active: Option<bool>,
    /// Matches name or email
    pub search: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/api/admin/partners",
    params(PartnerQuery),
    responses(
        (status = 200, description = "Partners page", body = ApiResponse<PaginatedResponse<partner::Model>>)
    ),
    tag = "partners"
)]
pub async fn list_partners(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PartnerQuery>,
) -> Result<Response, ServiceError> {
    let (page, limit) = resolve_paging(query.page, query.limit, &state.config);
    let filter = PartnerFilter {
        is_active: query.is_active,
        search: query.search,
    };

    let partners = state.services.partners.list(filter, page, limit).await?;
    Ok(success_response(
        "Partners retrieved successfully",
        PaginatedResponse::from_page(partners, page, limit),
    ))
}

#[utoipa::path(
    post,
    path = "/api/admin/partners",
    request_body = PartnerInput,
    responses(
        (status = 201, description = "Partner created", body = ApiResponse<partner::Model>),
        (status = 400, description = "Invalid partner", body = ErrorResponse),
        (status = 409, description = "Email already in use", body = ErrorResponse)
    ),
    tag = "partners"
)]
pub async fn create_partner(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<PartnerInput>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let partner = state.services.partners.create(payload).await?;
    Ok(created_response("Partner created successfully", partner))
}

#[utoipa::path(
    get,
    path = "/api/admin/partners/{id}",
    params(("id" = Uuid, Path, description = "Partner ID")),
    responses(
        (status = 200, description = "Partner found", body = ApiResponse<partner::Model>),
        (status = 404, description = "Partner not found", body = ErrorResponse)
    ),
    tag = "partners"
)]
pub async fn get_partner(
    State(state): State<AppState>,
    ApiPath(partner_id): ApiPath<Uuid>,
) -> Result<Response, ServiceError> {
    let partner = state.services.partners.get(partner_id).await?;
    Ok(success_response("Partner retrieved successfully", partner))
}

#[utoipa::path(
    put,
    path = "/api/admin/partners/{id}",
    params(("id" = Uuid, Path, description = "Partner ID")),
    request_body = PartnerInput,
    responses(
        (status = 200, description = "Partner updated", body = ApiResponse<partner::Model>),
        (status = 404, description = "Partner not found", body = ErrorResponse),
        (status = 409, description = "Email already in use", body = ErrorResponse)
    ),
    tag = "partners"
)]
pub async fn update_partner(
    State(state): State<AppState>,
    ApiPath(partner_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<PartnerInput>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let partner = state.services.partners.update(partner_id, payload).await?;
    Ok(success_response("Partner updated successfully", partner))
}

#[utoipa::path(
    delete,
    path = "/api/admin/partners/{id}",
    params(("id" = Uuid, Path, description = "Partner ID")),
    responses(
        (status = 200, description = "Partner deactivated", body = ApiResponse<partner::Model>),
        (status = 404, description = "Partner not found", body = ErrorResponse)
    ),
    tag = "partners"
)]
pub async fn delete_partner(
    State(state): State<AppState>,
    ApiPath(partner_id): ApiPath<Uuid>,
) -> Result<Response, ServiceError> {
    let partner = state.services.partners.deactivate(partner_id).await?;
    Ok(success_response("Partner deactivated successfully", partner))
}

#[utoipa::path(
    get,
    path = "/api/admin/partners/{id}/analytics",
    params(("id" = Uuid, Path, description = "Partner ID")),
    responses(
        (status = 200, description = "Share and earnings per bike", body = ApiResponse<PartnerAnalyticsReport>),
        (status = 404, description = "Partner not found", body = ErrorResponse)
    ),
    tag = "partners"
)]
pub async fn partner_analytics(
    State(state): State<AppState>,
    ApiPath(partner_id): ApiPath<Uuid>,
) -> Result<Response, ServiceError> {
    let report = state.services.partners.analytics(partner_id).await?;
    Ok(success_response("Partner analytics retrieved successfully", report))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/partners", get(list_partners).post(create_partner))
        .route(
            "/partners/:id",
            get(get_partner).put(update_partner).delete(delete_partner),
        )
        .route("/partners/:id/analytics", get(partner_analytics))
}

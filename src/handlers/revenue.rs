use axum::{extract::State, response::Response, routing::get, Router};
use serde::Deserialize;
use utoipa::IntoParams;

use super::common::{success_response, ApiQuery};
use crate::errors::{ErrorResponse, ServiceError};
use crate::finance::MonthlyRevenue;
use crate::{ApiResponse, AppState};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RevenueQuery {
    /// Calendar year, defaults to the current local year
    pub year: Option<i32>,
}

#[utoipa::path(
    get,
    path = "/api/admin/revenue",
    params(RevenueQuery),
    responses(
        (status = 200, description = "Revenue per month over confirmed orders", body = ApiResponse<MonthlyRevenue>),
        (status = 400, description = "Invalid year", body = ErrorResponse)
    ),
    tag = "revenue"
)]
pub async fn monthly_revenue(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<RevenueQuery>,
) -> Result<Response, ServiceError> {
    if let Some(year) = query.year {
        if !(1900..=9999).contains(&year) {
            return Err(ServiceError::BadRequest(
                "year must be a four-digit year".to_string(),
            ));
        }
    }

    let revenue = state.services.revenue.monthly(query.year).await?;
    Ok(success_response("Revenue retrieved successfully", revenue))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/revenue", get(monthly_revenue))
}

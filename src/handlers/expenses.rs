use axum::{extract::State, response::Response, routing::get, Router};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use super::common::{
    created_response, message_response, resolve_paging, success_response, validate_input, ApiJson,
    ApiPath, ApiQuery, PaginatedResponse,
};
use crate::errors::{ErrorResponse, ServiceError};
use crate::services::expenses::{ExpenseDetail, ExpenseInput};
use crate::{ApiResponse, AppState};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ExpenseQuery {
    pub bike_id: Option<Uuid>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/api/admin/expenses",
    params(ExpenseQuery),
    responses(
        (status = 200, description = "Expenses page, newest first", body = ApiResponse<PaginatedResponse<ExpenseDetail>>)
    ),
    tag = "expenses"
)]
pub async fn list_expenses(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ExpenseQuery>,
) -> Result<Response, ServiceError> {
    let (page, limit) = resolve_paging(query.page, query.limit, &state.config);
    let expenses = state.services.expenses.list(query.bike_id, page, limit).await?;
    Ok(success_response(
        "Expenses retrieved successfully",
        PaginatedResponse::from_page(expenses, page, limit),
    ))
}

#[utoipa::path(
    post,
    path = "/api/admin/expenses",
    request_body = ExpenseInput,
    responses(
        (status = 201, description = "Expense recorded", body = ApiResponse<ExpenseDetail>),
        (status = 400, description = "Invalid expense or partner holds no share", body = ErrorResponse),
        (status = 404, description = "Bike or partner not found", body = ErrorResponse)
    ),
    tag = "expenses"
)]
pub async fn create_expense(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ExpenseInput>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let expense = state.services.expenses.create(payload).await?;
    Ok(created_response("Expense created successfully", expense))
}

#[utoipa::path(
    get,
    path = "/api/admin/expenses/{id}",
    params(("id" = Uuid, Path, description = "Expense ID")),
    responses(
        (status = 200, description = "Expense found", body = ApiResponse<ExpenseDetail>),
        (status = 404, description = "Expense not found", body = ErrorResponse)
    ),
    tag = "expenses"
)]
pub async fn get_expense(
    State(state): State<AppState>,
    ApiPath(expense_id): ApiPath<Uuid>,
) -> Result<Response, ServiceError> {
    let expense = state.services.expenses.get(expense_id).await?;
    Ok(success_response("Expense retrieved successfully", expense))
}

#[utoipa::path(
    put,
    path = "/api/admin/expenses/{id}",
    params(("id" = Uuid, Path, description = "Expense ID")),
    request_body = ExpenseInput,
    responses(
        (status = 200, description = "Expense updated", body = ApiResponse<ExpenseDetail>),
        (status = 400, description = "Invalid expense", body = ErrorResponse),
        (status = 404, description = "Expense, bike or partner not found", body = ErrorResponse)
    ),
    tag = "expenses"
)]
pub async fn update_expense(
    State(state): State<AppState>,
    ApiPath(expense_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<ExpenseInput>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let expense = state.services.expenses.update(expense_id, payload).await?;
    Ok(success_response("Expense updated successfully", expense))
}

#[utoipa::path(
    delete,
    path = "/api/admin/expenses/{id}",
    params(("id" = Uuid, Path, description = "Expense ID")),
    responses(
        (status = 200, description = "Expense deleted and price adjustment reversed"),
        (status = 404, description = "Expense not found", body = ErrorResponse)
    ),
    tag = "expenses"
)]
pub async fn delete_expense(
    State(state): State<AppState>,
    ApiPath(expense_id): ApiPath<Uuid>,
) -> Result<Response, ServiceError> {
    state.services.expenses.delete(expense_id).await?;
    Ok(message_response("Expense deleted successfully"))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", get(list_expenses).post(create_expense))
        .route(
            "/expenses/:id",
            get(get_expense).put(update_expense).delete(delete_expense),
        )
}

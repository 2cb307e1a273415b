//! Handlers for the `/customers` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use echo_core::customer::{validate_customer_name, validate_revenue};
use echo_core::error::CoreError;
use echo_core::types::DbId;
use echo_db::models::customer::{
    CreateCustomer, Customer, CustomerDetail, CustomerWithRequestCount, UpdateCustomer,
};
use echo_db::repositories::CustomerRepo;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::response::MessageResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::not_found("Customer", id))
}

/// GET /api/customers
pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> AppResult<Json<Vec<CustomerWithRequestCount>>> {
    let customers = CustomerRepo::list_with_request_counts(&state.pool).await?;
    Ok(Json(customers))
}

/// GET /api/customers/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<CustomerDetail>> {
    let detail = CustomerRepo::find_detail(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(detail))
}

/// POST /api/customers
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(input): AppJson<CreateCustomer>,
) -> AppResult<(StatusCode, Json<Customer>)> {
    validate_customer_name(&input.name)?;
    validate_revenue(input.revenue)?;

    let customer = CustomerRepo::create(&state.pool, auth.user_id, &input).await?;

    tracing::info!(customer_id = customer.id, user_id = auth.user_id, "Customer created");

    Ok((StatusCode::CREATED, Json(customer)))
}

/// PUT /api/customers/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpdateCustomer>,
) -> AppResult<Json<Customer>> {
    if let Some(name) = &input.name {
        validate_customer_name(name)?;
    }
    validate_revenue(input.revenue)?;

    let customer = CustomerRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(customer_id = id, user_id = auth.user_id, "Customer updated");

    Ok(Json(customer))
}

/// DELETE /api/customers/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<MessageResponse>> {
    if !CustomerRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }

    tracing::info!(customer_id = id, user_id = auth.user_id, "Customer deleted");

    Ok(Json(MessageResponse::new("Customer removed")))
}

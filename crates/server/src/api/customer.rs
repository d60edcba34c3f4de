use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use reach_core::audience::FilterParams;
use reach_core::domain::customer::Customer;
use reach_core::domain::now;
use reach_core::validation::{CustomerInput, ValidationErrors};

use super::{correlation_id, malformed_query, require_owner, ApiError, ApiState};

pub const DEFAULT_RECENT_LIMIT: u32 = 10;
pub const MAX_RECENT_LIMIT: u32 = 100;

#[derive(Debug, Serialize)]
pub struct CustomerCreatedResponse {
    pub success: bool,
    pub status: String,
    pub customer: Customer,
}

#[derive(Debug, Serialize)]
pub struct CustomersFoundResponse {
    pub success: bool,
    pub status: String,
    pub count: usize,
    pub data: Vec<Customer>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OwnerQuery {
    pub uid: Option<String>,
    pub limit: Option<String>,
}

fn malformed_body(rejection: JsonRejection) -> ValidationErrors {
    ValidationErrors::single(
        "body",
        format!("Request body must be a JSON object: {}", rejection.body_text()),
    )
}

pub async fn add_customer(
    State(state): State<ApiState>,
    payload: Result<Json<CustomerInput>, JsonRejection>,
) -> Result<(StatusCode, Json<CustomerCreatedResponse>), ApiError> {
    let correlation_id = correlation_id();

    let Json(input) = payload
        .map_err(|rejection| ApiError::validation(malformed_body(rejection), &correlation_id))?;
    let new_customer =
        input.validate(now()).map_err(|errors| ApiError::validation(errors, &correlation_id))?;

    let customer = state
        .customers
        .add_customer(new_customer)
        .await
        .map_err(|error| ApiError::from_application(error, &correlation_id))?;

    info!(
        event_name = "api.customer.created",
        correlation_id = %correlation_id,
        customer_id = %customer.id.0,
        "customer created via api"
    );

    Ok((
        StatusCode::CREATED,
        Json(CustomerCreatedResponse {
            success: true,
            status: "Customer created successfully".to_string(),
            customer,
        }),
    ))
}

pub async fn filter_customers(
    State(state): State<ApiState>,
    params: Result<Query<FilterParams>, QueryRejection>,
) -> Result<Json<CustomersFoundResponse>, ApiError> {
    let correlation_id = correlation_id();

    let Query(params) = params
        .map_err(|rejection| ApiError::validation(malformed_query(rejection), &correlation_id))?;
    let (owner, filter) =
        params.parse().map_err(|errors| ApiError::validation(errors, &correlation_id))?;

    let audience = state
        .segmentation
        .segment_filter(&owner, &filter)
        .await
        .map_err(|error| ApiError::from_application(error, &correlation_id))?;

    Ok(Json(CustomersFoundResponse {
        success: true,
        status: format!("Customers found: {}", audience.count),
        count: audience.count,
        data: audience.customers,
    }))
}

pub async fn list_customers(
    State(state): State<ApiState>,
    query: Result<Query<OwnerQuery>, QueryRejection>,
) -> Result<Json<CustomersFoundResponse>, ApiError> {
    let correlation_id = correlation_id();
    let Query(query) = query
        .map_err(|rejection| ApiError::validation(malformed_query(rejection), &correlation_id))?;
    let owner = require_owner(query.uid.as_deref())
        .map_err(|errors| ApiError::validation(errors, &correlation_id))?;

    let customers = state
        .customers
        .list_customers(&owner)
        .await
        .map_err(|error| ApiError::from_application(error, &correlation_id))?;

    Ok(Json(CustomersFoundResponse {
        success: true,
        status: format!("Customers found: {}", customers.len()),
        count: customers.len(),
        data: customers,
    }))
}

pub async fn recent_visitors(
    State(state): State<ApiState>,
    query: Result<Query<OwnerQuery>, QueryRejection>,
) -> Result<Json<CustomersFoundResponse>, ApiError> {
    let correlation_id = correlation_id();
    let Query(query) = query
        .map_err(|rejection| ApiError::validation(malformed_query(rejection), &correlation_id))?;

    let mut errors = ValidationErrors::default();
    let owner = match require_owner(query.uid.as_deref()) {
        Ok(owner) => Some(owner),
        Err(owner_errors) => {
            errors.absorb(owner_errors);
            None
        }
    };
    let limit = match query.limit.as_deref() {
        None => Some(DEFAULT_RECENT_LIMIT),
        Some(raw) => match raw.trim().parse::<u32>() {
            Ok(limit) if limit > 0 => Some(limit.min(MAX_RECENT_LIMIT)),
            _ => {
                errors.push("limit", "limit must be a positive integer");
                None
            }
        },
    };

    let (Some(owner), Some(limit)) = (owner, limit) else {
        return Err(ApiError::validation(errors, &correlation_id));
    };

    let customers = state
        .customers
        .recent_visitors(&owner, limit)
        .await
        .map_err(|error| ApiError::from_application(error, &correlation_id))?;

    Ok(Json(CustomersFoundResponse {
        success: true,
        status: format!("Customers found: {}", customers.len()),
        count: customers.len(),
        data: customers,
    }))
}

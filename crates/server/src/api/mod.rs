//! JSON API consumed by the CRM frontend.
//!
//! - `POST /api/customer/addcustomer`  create a customer
//! - `GET  /api/customer/filter`       segment an owner's customers
//! - `GET  /api/customer/list`         all customers of an owner, oldest first
//! - `GET  /api/customer/recent`       most recent visitors of an owner
//! - `POST /api/campaign/addcampaign`  record a campaign send
//! - `GET  /api/campaign/viewcampaign` campaign history of an owner

pub mod campaign;
pub mod customer;

use axum::{
    extract::rejection::QueryRejection,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};
use uuid::Uuid;

use reach_core::config::CorsConfig;
use reach_core::domain::owner::OwnerId;
use reach_core::errors::{ApplicationError, InterfaceError};
use reach_core::validation::{FieldError, ValidationErrors};
use reach_db::{CampaignRecorder, CustomerRegistry, RecordStore, SegmentationService};

use crate::health;

#[derive(Clone)]
pub struct ApiState {
    pub customers: CustomerRegistry,
    pub segmentation: SegmentationService,
    pub campaigns: CampaignRecorder,
}

impl ApiState {
    pub fn from_store(store: &RecordStore) -> Self {
        let customers = store.customers();
        Self {
            customers: CustomerRegistry::new(customers.clone()),
            segmentation: SegmentationService::new(customers),
            campaigns: CampaignRecorder::new(store.campaigns()),
        }
    }
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/customer/addcustomer", post(customer::add_customer))
        .route("/api/customer/filter", get(customer::filter_customers))
        .route("/api/customer/list", get(customer::list_customers))
        .route("/api/customer/recent", get(customer::recent_visitors))
        .route("/api/campaign/addcampaign", post(campaign::add_campaign))
        .route("/api/campaign/viewcampaign", get(campaign::view_campaigns))
        .with_state(state)
}

/// Full application router: API, health check, CORS and request tracing.
pub fn app_router(store: &RecordStore, cors: &CorsConfig) -> Router {
    router(ApiState::from_store(store))
        .merge(health::router(store.pool().clone()))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(cors))
}

fn build_cors_layer(cors: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if cors.allowed_origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(tower_http::cors::Any);
    }

    let origins: Vec<HeaderValue> =
        cors.allowed_origins.iter().filter_map(|origin| origin.parse().ok()).collect();
    layer.allow_origin(origins).allow_credentials(cors.allow_credentials)
}

pub fn correlation_id() -> String {
    Uuid::new_v4().to_string()
}

pub(crate) fn require_owner(raw: Option<&str>) -> Result<OwnerId, ValidationErrors> {
    raw.and_then(|value| OwnerId::parse(value).ok())
        .ok_or_else(|| ValidationErrors::single("uid", "Please sign in"))
}

/// A query string that does not fit the handler's parameter struct, such as a
/// repeated `uid`, is reported like any other field error.
pub(crate) fn malformed_query(rejection: QueryRejection) -> ValidationErrors {
    ValidationErrors::single("query", rejection.body_text())
}

#[derive(Debug, Serialize)]
struct ValidationBody {
    success: bool,
    errors: Vec<FieldError>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

/// Handler error carrying the request's correlation id.
#[derive(Debug)]
pub struct ApiError(pub InterfaceError);

impl ApiError {
    pub fn from_application(error: ApplicationError, correlation_id: &str) -> Self {
        Self(error.into_interface(correlation_id))
    }

    pub fn validation(errors: ValidationErrors, correlation_id: &str) -> Self {
        Self::from_application(errors.into(), correlation_id)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let correlation_id = self.0.correlation_id().to_string();
        let user_message = self.0.user_message();

        let mut response = match self.0 {
            InterfaceError::Validation { errors, .. } => {
                warn!(
                    event_name = "api.request.invalid",
                    correlation_id = %correlation_id,
                    error_count = errors.len(),
                    "request rejected by validation"
                );
                (status, Json(ValidationBody { success: false, errors })).into_response()
            }
            InterfaceError::Conflict { .. } => {
                let body = ErrorBody { success: false, error: user_message.to_string() };
                (status, Json(body)).into_response()
            }
            InterfaceError::Internal { message, .. } => {
                error!(
                    event_name = "api.request.failed",
                    correlation_id = %correlation_id,
                    error = %message,
                    "request failed with an internal error"
                );
                let body = ErrorBody { success: false, error: user_message.to_string() };
                (status, Json(body)).into_response()
            }
        };

        if let Ok(value) = HeaderValue::from_str(&correlation_id) {
            response.headers_mut().insert("x-correlation-id", value);
        }
        response
    }
}

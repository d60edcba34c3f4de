use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use reach_core::domain::campaign::{Campaign, SortOrder};
use reach_core::validation::{CampaignInput, ValidationErrors};

use super::{correlation_id, malformed_query, require_owner, ApiError, ApiState};

#[derive(Debug, Serialize)]
pub struct CampaignCreatedResponse {
    pub success: bool,
    pub status: String,
    pub campaign: Campaign,
}

#[derive(Debug, Serialize)]
pub struct CampaignHistoryResponse {
    pub success: bool,
    pub status: String,
    pub campaigns: Vec<Campaign>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub uid: Option<String>,
    pub order: Option<String>,
}

pub async fn add_campaign(
    State(state): State<ApiState>,
    payload: Result<Json<CampaignInput>, JsonRejection>,
) -> Result<(StatusCode, Json<CampaignCreatedResponse>), ApiError> {
    let correlation_id = correlation_id();

    let Json(input) = payload.map_err(|rejection| {
        let errors = ValidationErrors::single(
            "body",
            format!("Request body must be a JSON object: {}", rejection.body_text()),
        );
        ApiError::validation(errors, &correlation_id)
    })?;
    let draft = input.into_draft().map_err(|errors| ApiError::validation(errors, &correlation_id))?;

    let campaign = state
        .campaigns
        .record_campaign(draft)
        .await
        .map_err(|error| ApiError::from_application(error, &correlation_id))?;

    Ok((
        StatusCode::CREATED,
        Json(CampaignCreatedResponse {
            success: true,
            status: "Campaign created successfully!".to_string(),
            campaign,
        }),
    ))
}

pub async fn view_campaigns(
    State(state): State<ApiState>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<CampaignHistoryResponse>, ApiError> {
    let correlation_id = correlation_id();
    let Query(query) = query
        .map_err(|rejection| ApiError::validation(malformed_query(rejection), &correlation_id))?;
    let owner = require_owner(query.uid.as_deref())
        .map_err(|errors| ApiError::validation(errors, &correlation_id))?;
    let order = SortOrder::from_param(query.order.as_deref());

    let campaigns = state
        .campaigns
        .list_campaigns(&owner, order)
        .await
        .map_err(|error| ApiError::from_application(error, &correlation_id))?;

    Ok(Json(CampaignHistoryResponse {
        success: true,
        status: "Fetched previous campaigns".to_string(),
        campaigns,
    }))
}

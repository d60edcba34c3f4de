use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::{SecondsFormat, Utc};
use reach_db::DbPool;
use serde::Serialize;
use tracing::warn;

#[derive(Clone)]
pub struct HealthState {
    db_pool: DbPool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Readiness {
    Ready,
    Degraded,
}

/// Outcome of a round trip to the record store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StoreCheck {
    pub status: Readiness,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: Readiness,
    pub record_store: StoreCheck,
    pub checked_at: String,
}

pub fn router(db_pool: DbPool) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { db_pool })
}

/// `200` while the record store answers, `503` once it does not.
pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let record_store = check_store(&state.db_pool).await;

    if record_store.status == Readiness::Degraded {
        warn!(
            event_name = "system.health.degraded",
            detail = %record_store.detail,
            "record store did not answer the health check"
        );
    }

    let status_code = match record_store.status {
        Readiness::Ready => StatusCode::OK,
        Readiness::Degraded => StatusCode::SERVICE_UNAVAILABLE,
    };
    let payload = HealthResponse {
        status: record_store.status,
        record_store,
        checked_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    };

    (status_code, Json(payload))
}

async fn check_store(pool: &DbPool) -> StoreCheck {
    match sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM customer").fetch_one(pool).await {
        Ok(customers) => StoreCheck {
            status: Readiness::Ready,
            detail: format!("record store answered ({customers} customers)"),
        },
        Err(error) => StoreCheck {
            status: Readiness::Degraded,
            detail: format!("record store query failed: {error}"),
        },
    }
}

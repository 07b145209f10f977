use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    analytics_base_url: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub analytics: HealthCheck,
    pub checked_at: String,
}

pub fn router(analytics_base_url: String) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { analytics_base_url })
}

/// Liveness only; the analytics API is not contacted so probes never spend quota.
pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let payload = HealthResponse {
        status: "ready",
        service: HealthCheck {
            status: "ready",
            detail: "slackpanel-server accepting slash commands".to_string(),
        },
        analytics: HealthCheck {
            status: "configured",
            detail: format!("queries are sent to {}", state.analytics_base_url),
        },
        checked_at: Utc::now().to_rfc3339(),
    };

    (StatusCode::OK, Json(payload))
}

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "healthy" or "unhealthy"
    pub status: String,
    pub timestamp: String,
    pub version: String,
    /// Seconds since startup
    pub uptime: u64,
    pub checks: BTreeMap<String, String>,
}

/// Probes every registered dependency; any failure turns the response into a 503.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let probes = state.checks.iter().map(|check| async move {
        let status = if check.is_healthy().await {
            "healthy"
        } else {
            "unhealthy"
        };
        (check.name().to_string(), status.to_string())
    });
    let checks: BTreeMap<String, String> = join_all(probes).await.into_iter().collect();

    let healthy = checks.values().all(|status| status == "healthy");
    let code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = HealthResponse {
        status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: state.started_at.elapsed().as_secs(),
        checks,
    };

    (code, Json(response))
}

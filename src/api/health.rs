use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::time::Instant;

use crate::domain::Variable;
use crate::state::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    timestamp: chrono::DateTime<chrono::Utc>,
    checks: HealthChecks,
}

/// Individual health checks
#[derive(Debug, Serialize)]
pub struct HealthChecks {
    models: ComponentHealth,
}

/// Health status of a component
#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ComponentHealth {
    fn healthy(latency_ms: u64) -> Self {
        Self {
            status: "healthy".to_string(),
            latency_ms: Some(latency_ms),
            error: None,
        }
    }

    fn degraded(latency_ms: u64, error: String) -> Self {
        Self {
            status: "degraded".to_string(),
            latency_ms: Some(latency_ms),
            error: Some(error),
        }
    }

    fn unhealthy(error: String) -> Self {
        Self {
            status: "unhealthy".to_string(),
            latency_ms: None,
            error: Some(error),
        }
    }
}

fn check_models(missing: &[Variable], latency_ms: u64) -> ComponentHealth {
    let total = Variable::catalog().count();
    match missing.len() {
        0 => ComponentHealth::healthy(latency_ms),
        n if n == total => ComponentHealth::unhealthy("no model artifacts found".to_string()),
        _ => {
            let names: Vec<&str> = missing.iter().map(|v| v.id()).collect();
            ComponentHealth::degraded(latency_ms, format!("missing artifacts: {}", names.join(", ")))
        }
    }
}

pub async fn healthz() -> impl IntoResponse {
    StatusCode::OK
}

/// GET /health - Health check endpoint
///
/// A missing artifact only disables its own variable, so partial availability
/// is reported as degraded but still answers 200.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();
    let missing = state.runner.missing_artifacts().await;
    let models = check_models(&missing, start.elapsed().as_millis() as u64);

    let status_code = if models.status == "unhealthy" {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    tracing::debug!(missing = missing.len(), status = %models.status, "Health check completed");

    let response = HealthResponse {
        status: models.status.clone(),
        timestamp: chrono::Utc::now(),
        checks: HealthChecks { models },
    };

    (status_code, Json(response))
}

/// GET /health/ready - Ready once at least one artifact can be served
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let missing = state.runner.missing_artifacts().await;
    if missing.len() < Variable::catalog().count() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /health/live - Liveness probe
pub async fn liveness_check() -> impl IntoResponse {
    StatusCode::OK
}

pub mod dashboard;
pub mod error;
pub mod forecast;
pub mod health;
pub mod response;

use axum::{http::StatusCode, routing::get, Router};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::{config::Config, state::AppState};

pub fn router(state: AppState, cfg: &Config) -> Router {
    let mut router = Router::new()
        .route("/", get(dashboard::dashboard))
        .route("/healthz", get(health::healthz))
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/health/live", get(health::liveness_check))
        .nest("/api/v1", v1_router())
        .with_state(state);

    if cfg.server.enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods([axum::http::Method::GET]);
        router = router.layer(cors);
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    Duration::from_secs(cfg.server.request_timeout_secs),
                )),
        )
        .layer(TraceLayer::new_for_http())
}

fn v1_router() -> Router<AppState> {
    Router::new()
        .route("/variables", get(forecast::list_variables))
        .route("/forecast/:variable", get(forecast::get_forecast))
        .route("/forecast/:variable/csv", get(forecast::download_forecast_csv))
        .route("/forecast/:variable/chart.svg", get(forecast::get_forecast_chart))
}

//! Prometheus scrape endpoint.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Router};
use std::sync::Arc;
use surfsup_telemetry::Metrics;

async fn metrics_handler(State(metrics): State<Arc<Metrics>>) -> Result<impl IntoResponse, StatusCode> {
    match metrics.gather() {
        Ok(body) => Ok((StatusCode::OK, body)),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// Router serving `GET /metrics`.
pub fn metrics_router(metrics: Metrics) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(Arc::new(metrics))
}

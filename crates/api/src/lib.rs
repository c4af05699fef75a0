//! SurfsUp climate query service.
//!
//! Read-only JSON endpoints over the Hawaii station and measurement tables.
//! Every data route runs one logical query on a connection held only for
//! the duration of the request.

use axum::{routing::get, Router};
use std::sync::Arc;
use surfsup_db::DatasetSummary;
use surfsup_telemetry::Metrics;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub mod error;
pub mod routes;
pub mod sqlite_store;
pub mod store;

pub use error::{ApiError, ApiResult};
pub use routes::metrics::metrics_router;
pub use sqlite_store::SqliteClimateStore;
pub use store::{ClimateStore, StoreError, StoreResult};

/// Application state shared across handlers.
pub struct AppState {
    /// Query backend
    pub store: Arc<dyn ClimateStore>,
    /// Metrics collector
    pub metrics: Metrics,
    /// Dataset extent, read once at startup for the index page; `None` when
    /// the store held no observations
    pub summary: Option<DatasetSummary>,
}

impl AppState {
    /// Create new application state.
    pub fn new(store: Arc<dyn ClimateStore>, metrics: Metrics, summary: Option<DatasetSummary>) -> Self {
        Self {
            store,
            metrics,
            summary,
        }
    }
}

/// Create the application router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::index::welcome))
        .route("/api/v1.0/precipitation", get(routes::climate::precipitation))
        .route("/api/v1.0/stations", get(routes::climate::stations))
        .route("/api/v1.0/tobs", get(routes::climate::tobs))
        .route("/api/v1.0/:start", get(routes::climate::temperature_stats))
        .route("/api/v1.0/:start/:end", get(routes::climate::temperature_stats))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve a router on it until Ctrl-C.
pub async fn run_server(addr: &str, app: Router) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    serve(listener, app).await
}

/// Serve a router on an already bound listener until Ctrl-C.
pub async fn serve(listener: TcpListener, app: Router) -> std::io::Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!("Failed to install Ctrl-C handler: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

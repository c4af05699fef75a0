//! Climate data routes.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use surfsup_db::Station;

use crate::error::ApiResult;
use crate::store::{PrecipitationReading, TemperatureReading, TemperatureStats};
use crate::AppState;

/// Path segments of the temperature statistics routes.
#[derive(Debug, Deserialize)]
pub struct DateRange {
    pub start: String,
    #[serde(default)]
    pub end: Option<String>,
}

/// Precipitation for the last 12 months of the dataset.
pub async fn precipitation(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<PrecipitationReading>>> {
    state.metrics.inc_http_requests("precipitation");
    Ok(Json(state.store.recent_precipitation().await?))
}

/// All registered stations.
pub async fn stations(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Station>>> {
    state.metrics.inc_http_requests("stations");
    Ok(Json(state.store.stations().await?))
}

/// Last 12 months of temperatures at the most active station.
pub async fn tobs(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<TemperatureReading>>> {
    state.metrics.inc_http_requests("tobs");
    Ok(Json(state.store.most_active_station_temperatures().await?))
}

/// TMIN/TAVG/TMAX for one date, or for an inclusive date range.
pub async fn temperature_stats(
    State(state): State<Arc<AppState>>,
    Path(range): Path<DateRange>,
) -> ApiResult<Json<TemperatureStats>> {
    state.metrics.inc_http_requests("temperature_stats");
    let stats = state
        .store
        .temperature_stats(&range.start, range.end.as_deref())
        .await?;
    Ok(Json(stats))
}

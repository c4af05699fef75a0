//! Store interface for the climate query service.
//!
//! Handlers depend on the [`ClimateStore`] trait only, so the HTTP layer is
//! independent of the SQL engine behind it.

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use serde::Serialize;
use sqlx::FromRow;
use surfsup_db::{DbError, Station};

/// Length of the "last 12 months" window, counted back from the newest observation.
pub const LOOKBACK_DAYS: u64 = 366;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Error type for store queries.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] DbError),
    #[error("Dataset contains no observations")]
    EmptyDataset,
    #[error("Invalid stored date: {0}")]
    InvalidDate(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Database(DbError::Sqlx(e))
    }
}

/// Result type for store queries.
pub type StoreResult<T> = Result<T, StoreError>;

/// One precipitation reading in the lookback window.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct PrecipitationReading {
    pub date: String,
    pub prcp: Option<f64>,
}

/// One temperature observation in the lookback window.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct TemperatureReading {
    pub date: String,
    pub tobs: f64,
}

/// Minimum, average and maximum temperature over a set of observations.
///
/// All fields are `None` when no observation matched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow)]
pub struct TemperatureStats {
    #[serde(rename = "TMIN")]
    pub tmin: Option<f64>,
    #[serde(rename = "TAVG")]
    pub tavg: Option<f64>,
    #[serde(rename = "TMAX")]
    pub tmax: Option<f64>,
}

/// Read-only queries over stations and observations.
///
/// Each method is one logical query and holds a single connection for its
/// whole duration.
#[async_trait]
pub trait ClimateStore: Send + Sync {
    /// Precipitation for every observation in the lookback window.
    async fn recent_precipitation(&self) -> StoreResult<Vec<PrecipitationReading>>;

    /// Every registered station.
    async fn stations(&self) -> StoreResult<Vec<Station>>;

    /// Temperatures in the lookback window for the station with the most
    /// observations overall. Ties go to the lowest station identifier.
    async fn most_active_station_temperatures(&self) -> StoreResult<Vec<TemperatureReading>>;

    /// Temperature statistics for `start` alone, or for `start..=end`.
    ///
    /// Dates are compared as strings against the stored `YYYY-MM-DD` values.
    async fn temperature_stats(&self, start: &str, end: Option<&str>) -> StoreResult<TemperatureStats>;
}

/// First date of the lookback window ending at `latest`, inclusive.
pub fn lookback_cutoff(latest: &str) -> StoreResult<String> {
    let date = NaiveDate::parse_from_str(latest, DATE_FORMAT)
        .map_err(|_| StoreError::InvalidDate(latest.to_string()))?;
    let cutoff = date
        .checked_sub_days(Days::new(LOOKBACK_DAYS))
        .ok_or_else(|| StoreError::InvalidDate(latest.to_string()))?;
    Ok(cutoff.format(DATE_FORMAT).to_string())
}

//! Database models and types.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Columns a table must expose for the service to query it.
#[derive(Debug, Clone, Copy)]
pub struct TableSpec {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

/// Weather station from the `station` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Station {
    pub station: String,
    pub name: String,
}

impl Station {
    pub const TABLE: TableSpec = TableSpec {
        name: "station",
        columns: &["station", "name"],
    };
}

/// Daily reading from the `measurement` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Observation {
    pub station: String,
    /// ISO `YYYY-MM-DD`, stored as text.
    pub date: String,
    pub prcp: Option<f64>,
    pub tobs: f64,
}

impl Observation {
    pub const TABLE: TableSpec = TableSpec {
        name: "measurement",
        columns: &["station", "date", "prcp", "tobs"],
    };
}

/// Tables checked at startup.
pub const REQUIRED_TABLES: [TableSpec; 2] = [Station::TABLE, Observation::TABLE];

/// Overall extent of the dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub first_date: String,
    pub last_date: String,
    pub station_count: i64,
    pub observation_count: i64,
}

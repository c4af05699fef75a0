//! SQLite implementation of the climate store.

use crate::store::{
    lookback_cutoff, ClimateStore, PrecipitationReading, StoreError, StoreResult,
    TemperatureReading, TemperatureStats,
};
use async_trait::async_trait;
use sqlx::SqliteConnection;
use std::future::Future;
use surfsup_db::{DbPool, Station};
use surfsup_telemetry::Metrics;
use tokio::time::Instant;
use tracing::{debug, error};

/// Climate store backed by the read-only SQLite pool.
#[derive(Clone)]
pub struct SqliteClimateStore {
    db: DbPool,
    metrics: Metrics,
}

impl SqliteClimateStore {
    /// Create a new store.
    ///
    /// # Arguments
    /// * `db` - Database pool
    /// * `metrics` - Metrics collector
    pub fn new(db: DbPool, metrics: Metrics) -> Self {
        Self { db, metrics }
    }

    async fn timed<T, F>(&self, operation: &'static str, query: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        let start = Instant::now();
        let result = query.await;
        self.metrics
            .observe_query_latency(operation, start.elapsed().as_secs_f64());

        if let Err(e) = &result {
            self.metrics.inc_query_errors(operation);
            error!(operation, error = %e, "Store query failed");
        }
        result
    }
}

async fn latest_date(conn: &mut SqliteConnection) -> StoreResult<String> {
    let latest: Option<String> = sqlx::query_scalar("SELECT MAX(date) FROM measurement")
        .fetch_one(&mut *conn)
        .await?;
    latest.ok_or(StoreError::EmptyDataset)
}

async fn most_active_station(conn: &mut SqliteConnection) -> StoreResult<String> {
    let station: Option<String> = sqlx::query_scalar(
        r#"
        SELECT station
        FROM measurement
        GROUP BY station
        ORDER BY COUNT(*) DESC, station ASC
        LIMIT 1
        "#,
    )
    .fetch_optional(&mut *conn)
    .await?;
    station.ok_or(StoreError::EmptyDataset)
}

// Readings are cast to REAL in every select: a column declared INTEGER
// (or MIN/MAX over one) would otherwise not decode as f64.
#[async_trait]
impl ClimateStore for SqliteClimateStore {
    async fn recent_precipitation(&self) -> StoreResult<Vec<PrecipitationReading>> {
        self.timed("precipitation", async {
            let mut conn = self.db.acquire().await?;

            let latest = latest_date(&mut conn).await?;
            let cutoff = lookback_cutoff(&latest)?;
            debug!(%latest, %cutoff, "Selecting precipitation");

            let rows = sqlx::query_as::<_, PrecipitationReading>(
                r#"
                SELECT date, CAST(prcp AS REAL) AS prcp
                FROM measurement
                WHERE date >= ?
                ORDER BY date ASC, station ASC
                "#,
            )
            .bind(&cutoff)
            .fetch_all(&mut *conn)
            .await?;
            Ok::<_, StoreError>(rows)
        })
        .await
    }

    async fn stations(&self) -> StoreResult<Vec<Station>> {
        self.timed("stations", async {
            let mut conn = self.db.acquire().await?;
            let rows = sqlx::query_as::<_, Station>(
                "SELECT station, name FROM station ORDER BY station ASC",
            )
            .fetch_all(&mut *conn)
            .await?;
            Ok::<_, StoreError>(rows)
        })
        .await
    }

    async fn most_active_station_temperatures(&self) -> StoreResult<Vec<TemperatureReading>> {
        self.timed("tobs", async {
            let mut conn = self.db.acquire().await?;

            let latest = latest_date(&mut conn).await?;
            let cutoff = lookback_cutoff(&latest)?;
            let station = most_active_station(&mut conn).await?;
            debug!(%station, %cutoff, "Selecting temperatures for most active station");

            let rows = sqlx::query_as::<_, TemperatureReading>(
                r#"
                SELECT date, CAST(tobs AS REAL) AS tobs
                FROM measurement
                WHERE station = ? AND date >= ?
                ORDER BY date ASC
                "#,
            )
            .bind(&station)
            .bind(&cutoff)
            .fetch_all(&mut *conn)
            .await?;
            Ok::<_, StoreError>(rows)
        })
        .await
    }

    async fn temperature_stats(&self, start: &str, end: Option<&str>) -> StoreResult<TemperatureStats> {
        self.timed("temperature_stats", async {
            let mut conn = self.db.acquire().await?;

            let query = match end {
                None => sqlx::query_as::<_, TemperatureStats>(
                    r#"
                    SELECT CAST(MIN(tobs) AS REAL) AS tmin,
                           AVG(tobs) AS tavg,
                           CAST(MAX(tobs) AS REAL) AS tmax
                    FROM measurement
                    WHERE date = ?
                    "#,
                )
                .bind(start),
                Some(end) => sqlx::query_as::<_, TemperatureStats>(
                    r#"
                    SELECT CAST(MIN(tobs) AS REAL) AS tmin,
                           AVG(tobs) AS tavg,
                           CAST(MAX(tobs) AS REAL) AS tmax
                    FROM measurement
                    WHERE date >= ? AND date <= ?
                    "#,
                )
                .bind(start)
                .bind(end),
            };

            Ok::<_, StoreError>(query.fetch_one(&mut *conn).await?)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use surfsup_db::fixtures::{self, observation, station};
    use surfsup_db::Observation;

    async fn store_with(observations: &[Observation]) -> (tempfile::TempDir, SqliteClimateStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hawaii.sqlite");
        fixtures::create_database(
            &path,
            &[
                station("USC00519397", "WAIKIKI 717.2, HI US"),
                station("USC00513117", "KANEOHE 838.1, HI US"),
                station("USC00519281", "WAIHEE 837.5, HI US"),
            ],
            observations,
        )
        .await
        .unwrap();

        let db = DbPool::new(path.to_str().unwrap()).await.unwrap();
        (dir, SqliteClimateStore::new(db, Metrics::new().unwrap()))
    }

    #[tokio::test]
    async fn test_precipitation_window_includes_cutoff_and_nulls() {
        let (_dir, store) = store_with(&[
            observation("USC00519397", "2016-08-21", Some(0.5), 75.0),
            observation("USC00519397", "2016-08-22", Some(0.1), 76.0),
            observation("USC00513117", "2017-08-23", None, 81.0),
            observation("USC00519397", "2017-08-23", Some(0.0), 82.0),
        ])
        .await;

        let rows = store.recent_precipitation().await.unwrap();
        assert_eq!(
            rows,
            vec![
                PrecipitationReading { date: "2016-08-22".into(), prcp: Some(0.1) },
                PrecipitationReading { date: "2017-08-23".into(), prcp: None },
                PrecipitationReading { date: "2017-08-23".into(), prcp: Some(0.0) },
            ]
        );
    }

    #[tokio::test]
    async fn test_most_active_station_tie_goes_to_lowest_id() {
        let (_dir, store) = store_with(&[
            observation("USC00519397", "2017-08-20", None, 70.0),
            observation("USC00519397", "2017-08-21", None, 71.0),
            observation("USC00513117", "2017-08-22", None, 72.0),
            observation("USC00513117", "2017-08-23", None, 73.0),
        ])
        .await;

        let rows = store.most_active_station_temperatures().await.unwrap();
        assert_eq!(
            rows,
            vec![
                TemperatureReading { date: "2017-08-22".into(), tobs: 72.0 },
                TemperatureReading { date: "2017-08-23".into(), tobs: 73.0 },
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_dataset_is_an_error() {
        let (_dir, store) = store_with(&[]).await;
        assert!(matches!(store.recent_precipitation().await, Err(StoreError::EmptyDataset)));
        assert!(matches!(
            store.most_active_station_temperatures().await,
            Err(StoreError::EmptyDataset)
        ));
        // Aggregates over nothing are still a valid answer.
        assert_eq!(
            store.temperature_stats("2017-08-23", None).await.unwrap(),
            TemperatureStats::default()
        );
    }

    #[tokio::test]
    async fn test_stations_are_sorted_and_unique() {
        let (_dir, store) = store_with(&[]).await;
        let codes: Vec<String> = store
            .stations()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.station)
            .collect();
        assert_eq!(codes, vec!["USC00513117", "USC00519281", "USC00519397"]);
    }

    #[tokio::test]
    async fn test_failed_queries_are_counted() {
        let (_dir, store) = store_with(&[]).await;
        let _ = store.recent_precipitation().await;

        let text = store.metrics.gather().unwrap();
        assert!(text.contains("surfsup_query_errors_total{operation=\"precipitation\"} 1"));
    }

    #[tokio::test]
    async fn test_integer_readings_decode_as_real() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("integer.sqlite");
        fixtures::create_database_from_sql(
            &path,
            &[
                fixtures::STATION_DDL,
                "CREATE TABLE measurement (id INTEGER PRIMARY KEY, station TEXT, date TEXT, prcp INTEGER, tobs INTEGER)",
                "INSERT INTO station (station, name) VALUES ('USC00519281', 'WAIHEE 837.5, HI US')",
                "INSERT INTO measurement (station, date, prcp, tobs) VALUES ('USC00519281', '2017-08-22', 1, 77)",
                "INSERT INTO measurement (station, date, prcp, tobs) VALUES ('USC00519281', '2017-08-23', NULL, 78)",
            ],
        )
        .await
        .unwrap();

        let db = DbPool::new(path.to_str().unwrap()).await.unwrap();
        db.validate_schema().await.unwrap();
        let store = SqliteClimateStore::new(db, Metrics::new().unwrap());

        assert_eq!(
            store.most_active_station_temperatures().await.unwrap(),
            vec![
                TemperatureReading { date: "2017-08-22".into(), tobs: 77.0 },
                TemperatureReading { date: "2017-08-23".into(), tobs: 78.0 },
            ]
        );
        assert_eq!(
            store.recent_precipitation().await.unwrap(),
            vec![
                PrecipitationReading { date: "2017-08-22".into(), prcp: Some(1.0) },
                PrecipitationReading { date: "2017-08-23".into(), prcp: None },
            ]
        );
        assert_eq!(
            store.temperature_stats("2017-08-22", Some("2017-08-23")).await.unwrap(),
            TemperatureStats { tmin: Some(77.0), tavg: Some(77.5), tmax: Some(78.0) }
        );
    }
}

//! Database connection pool management.

use crate::error::{DbError, DbResult};
use crate::models::DatasetSummary;
use crate::schema;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{Row, Sqlite};
use std::str::FromStr;
use tracing::{debug, info};

/// Default number of pooled connections.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Read-only database connection pool wrapper.
///
/// Cloning is cheap; all clones share the same underlying pool.
#[derive(Clone)]
pub struct DbPool {
    pool: SqlitePool,
}

impl DbPool {
    /// Open a read-only pool over an existing SQLite database file.
    ///
    /// # Arguments
    /// * `db_path` - Path to the SQLite database file
    pub async fn new(db_path: &str) -> DbResult<Self> {
        Self::with_max_connections(db_path, DEFAULT_MAX_CONNECTIONS).await
    }

    /// Open a read-only pool with an explicit connection limit.
    ///
    /// # Arguments
    /// * `db_path` - Path to the SQLite database file
    /// * `max_connections` - Upper bound on concurrently open connections
    pub async fn with_max_connections(db_path: &str, max_connections: u32) -> DbResult<Self> {
        let options = SqliteConnectOptions::from_str(db_path)?
            .create_if_missing(false)
            .read_only(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?;

        info!(db_path, max_connections, "Connected to database");

        Ok(Self { pool })
    }

    /// Get a reference to the underlying SQLite pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Acquire a connection for the duration of one request.
    ///
    /// The connection returns to the pool when the guard is dropped.
    pub async fn acquire(&self) -> DbResult<PoolConnection<Sqlite>> {
        Ok(self.pool.acquire().await?)
    }

    /// Check that the store exposes the tables and columns the service reads.
    pub async fn validate_schema(&self) -> DbResult<()> {
        info!("Validating database schema");
        schema::validate(&self.pool).await?;
        info!("Database schema validated");
        Ok(())
    }

    /// Summarise the dataset's date range and row counts.
    pub async fn dataset_summary(&self) -> DbResult<DatasetSummary> {
        let row = sqlx::query(
            r#"
            SELECT
                (SELECT MIN(date) FROM measurement) AS first_date,
                (SELECT MAX(date) FROM measurement) AS last_date,
                (SELECT COUNT(*) FROM station) AS station_count,
                (SELECT COUNT(*) FROM measurement) AS observation_count
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let first_date: Option<String> = row.try_get("first_date")?;
        let last_date: Option<String> = row.try_get("last_date")?;
        let (Some(first_date), Some(last_date)) = (first_date, last_date) else {
            return Err(DbError::EmptyDataset);
        };

        let summary = DatasetSummary {
            first_date,
            last_date,
            station_count: row.try_get("station_count")?,
            observation_count: row.try_get("observation_count")?,
        };
        debug!(?summary, "Loaded dataset summary");
        Ok(summary)
    }

    /// Close all pooled connections.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

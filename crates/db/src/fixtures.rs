//! Helpers for building small climate databases in tests.

use crate::error::DbResult;
use crate::models::{Observation, Station};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::Path;

/// `station` table as shipped in the Hawaii dataset.
pub const STATION_DDL: &str = "CREATE TABLE station (
    id INTEGER NOT NULL,
    station TEXT,
    name TEXT,
    latitude FLOAT,
    longitude FLOAT,
    elevation FLOAT,
    PRIMARY KEY (id)
)";

/// `measurement` table as shipped in the Hawaii dataset.
pub const MEASUREMENT_DDL: &str = "CREATE TABLE measurement (
    id INTEGER NOT NULL,
    station TEXT,
    date TEXT,
    prcp FLOAT,
    tobs FLOAT,
    PRIMARY KEY (id)
)";

pub fn station(code: &str, name: &str) -> Station {
    Station {
        station: code.to_string(),
        name: name.to_string(),
    }
}

pub fn observation(station: &str, date: &str, prcp: Option<f64>, tobs: f64) -> Observation {
    Observation {
        station: station.to_string(),
        date: date.to_string(),
        prcp,
        tobs,
    }
}

/// Create a database file and run the given statements against it.
pub async fn create_database_from_sql(path: &Path, statements: &[&str]) -> DbResult<()> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    for statement in statements {
        sqlx::query(statement).execute(&pool).await?;
    }

    pool.close().await;
    Ok(())
}

/// Create a database with the Hawaii schema seeded with the given rows.
pub async fn create_database(
    path: &Path,
    stations: &[Station],
    observations: &[Observation],
) -> DbResult<()> {
    create_database_from_sql(path, &[STATION_DDL, MEASUREMENT_DDL]).await?;

    let options = SqliteConnectOptions::new().filename(path);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    let mut tx = pool.begin().await?;
    for s in stations {
        sqlx::query("INSERT INTO station (station, name) VALUES (?, ?)")
            .bind(&s.station)
            .bind(&s.name)
            .execute(&mut *tx)
            .await?;
    }
    for o in observations {
        sqlx::query("INSERT INTO measurement (station, date, prcp, tobs) VALUES (?, ?, ?, ?)")
            .bind(&o.station)
            .bind(&o.date)
            .bind(o.prcp)
            .bind(o.tobs)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    pool.close().await;
    Ok(())
}

//! Startup validation of the externally maintained schema.

use crate::error::{DbError, DbResult};
use crate::models::{TableSpec, REQUIRED_TABLES};
use sqlx::SqlitePool;
use tracing::debug;

/// Verify every required table exists with its required columns.
pub async fn validate(pool: &SqlitePool) -> DbResult<()> {
    for spec in REQUIRED_TABLES {
        check_table(pool, &spec).await?;
    }
    Ok(())
}

async fn check_table(pool: &SqlitePool, spec: &TableSpec) -> DbResult<()> {
    let columns: Vec<String> = sqlx::query_scalar("SELECT name FROM pragma_table_info(?)")
        .bind(spec.name)
        .fetch_all(pool)
        .await?;

    if columns.is_empty() {
        return Err(DbError::MissingTable(spec.name.to_string()));
    }

    let missing = missing_columns(spec, &columns);
    if !missing.is_empty() {
        return Err(DbError::MissingColumns {
            table: spec.name.to_string(),
            columns: missing,
        });
    }

    debug!(table = spec.name, ?columns, "Table matches expected shape");
    Ok(())
}

// SQLite column names are case-insensitive.
fn missing_columns(spec: &TableSpec, present: &[String]) -> Vec<String> {
    spec.columns
        .iter()
        .filter(|required| !present.iter().any(|c| c.eq_ignore_ascii_case(required)))
        .map(|c| c.to_string())
        .collect()
}

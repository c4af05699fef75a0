//! Database error types.

/// Error type for database access and schema validation.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Table `{0}` not found in database")]
    MissingTable(String),
    #[error("Table `{table}` is missing required columns: {}", columns.join(", "))]
    MissingColumns { table: String, columns: Vec<String> },
    #[error("Dataset contains no observations")]
    EmptyDataset,
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

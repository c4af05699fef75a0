//! Database layer for the SurfsUp climate query service.
//!
//! Provides read-only SQLite access, explicit entity declarations and
//! startup validation of the externally maintained schema.

pub mod error;
pub mod models;
pub mod pool;
pub mod schema;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub use error::{DbError, DbResult};
pub use models::{DatasetSummary, Observation, Station};
pub use pool::DbPool;

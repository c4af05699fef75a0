//! Observability for the SurfsUp climate query service.

pub mod metrics;
pub mod logging;

pub use metrics::Metrics;
pub use logging::{init_logging, LogFormat};

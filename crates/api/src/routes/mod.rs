pub mod climate;
pub mod index;
pub mod metrics;

//! Prometheus metrics for the SurfsUp climate query service.

use prometheus::{
    HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry,
    Encoder, TextEncoder,
};

/// Metrics collector for the query service.
///
/// Collectors live in a private registry so several instances can coexist
/// in one process.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    http_requests: IntCounterVec,
    query_errors: IntCounterVec,
    query_latency: HistogramVec,
}

impl Metrics {
    /// Create a new metrics instance.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let http_requests = IntCounterVec::new(
            Opts::new(
                "surfsup_http_requests_total",
                "Total number of HTTP requests handled, by route",
            ),
            &["route"],
        )?;

        let query_errors = IntCounterVec::new(
            Opts::new(
                "surfsup_query_errors_total",
                "Total number of failed store queries, by operation",
            ),
            &["operation"],
        )?;

        let query_latency = HistogramVec::new(
            HistogramOpts::new(
                "surfsup_query_latency_seconds",
                "Store query latency in seconds",
            ),
            &["operation"],
        )?;

        registry.register(Box::new(http_requests.clone()))?;
        registry.register(Box::new(query_errors.clone()))?;
        registry.register(Box::new(query_latency.clone()))?;

        Ok(Self {
            registry,
            http_requests,
            query_errors,
            query_latency,
        })
    }

    /// Increment the request counter for a route.
    pub fn inc_http_requests(&self, route: &str) {
        self.http_requests.with_label_values(&[route]).inc();
    }

    /// Increment the failed query counter.
    pub fn inc_query_errors(&self, operation: &str) {
        self.query_errors.with_label_values(&[operation]).inc();
    }

    /// Record store query latency.
    pub fn observe_query_latency(&self, operation: &str, duration_secs: f64) {
        self.query_latency.with_label_values(&[operation]).observe(duration_secs);
    }

    /// Get Prometheus metrics as a string.
    pub fn gather(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

//! Prometheus metrics for request latency and store activity.

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::debug;

// === Metric Name Constants ===

/// HTTP request latency metric name.
pub const METRIC_HTTP_REQUEST_LATENCY: &str = "http_request_latency_ms";
/// Users created counter metric name.
pub const METRIC_USERS_CREATED: &str = "users_created_total";
/// Habits created counter metric name.
pub const METRIC_HABITS_CREATED: &str = "habits_created_total";
/// Habits deleted counter metric name.
pub const METRIC_HABITS_DELETED: &str = "habits_deleted_total";
/// Rejected requests counter metric name.
pub const METRIC_REQUESTS_REJECTED: &str = "requests_rejected_total";

/// Install the global Prometheus recorder and register metric descriptions.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    init_metrics();
    Ok(handle)
}

/// Initialize all metric descriptions.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_HTTP_REQUEST_LATENCY,
        "HTTP request handling latency in milliseconds"
    );

    describe_counter!(METRIC_USERS_CREATED, "Total number of users created");
    describe_counter!(METRIC_HABITS_CREATED, "Total number of habits created");
    describe_counter!(METRIC_HABITS_DELETED, "Total number of habits deleted");
    describe_counter!(
        METRIC_REQUESTS_REJECTED,
        "Total number of requests answered with an error body"
    );

    debug!("Metrics initialized");
}

/// Record HTTP request latency.
pub fn record_http_latency(start: Instant, endpoint: &'static str) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_HTTP_REQUEST_LATENCY, "endpoint" => endpoint).record(latency_ms);
}

/// Increment users created counter.
pub fn inc_users_created() {
    counter!(METRIC_USERS_CREATED).increment(1);
}

/// Increment habits created counter.
pub fn inc_habits_created() {
    counter!(METRIC_HABITS_CREATED).increment(1);
}

/// Increment habits deleted counter.
pub fn inc_habits_deleted() {
    counter!(METRIC_HABITS_DELETED).increment(1);
}

/// Increment rejected requests counter.
pub fn inc_requests_rejected(reason: &'static str) {
    counter!(METRIC_REQUESTS_REJECTED, "reason" => reason).increment(1);
}

/// RAII guard for timing a handler.
/// Records latency under its endpoint label when dropped.
pub struct LatencyTimer {
    start: Instant,
    endpoint: &'static str,
}

impl LatencyTimer {
    /// Create a new latency timer for the given endpoint.
    pub fn new(endpoint: &'static str) -> Self {
        Self {
            start: Instant::now(),
            endpoint,
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        debug!(endpoint = self.endpoint, latency_ms = self.elapsed_ms(), "request handled");
        record_http_latency(self.start, self.endpoint);
    }
}

/// Create a latency timer for an endpoint.
pub fn timer_endpoint(endpoint: &'static str) -> LatencyTimer {
    LatencyTimer::new(endpoint)
}

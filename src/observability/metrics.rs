//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status
//! - `gateway_request_duration_seconds` (histogram): latency by method
//! - `gateway_auth_failures_total` (counter): requests without a token
//! - `gateway_faults_total` (counter): 500s by fault kind

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, start_time: Instant) {
    metrics::counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("gateway_request_duration_seconds", "method" => method.to_string())
        .record(start_time.elapsed().as_secs_f64());
}

pub fn record_auth_failure() {
    metrics::counter!("gateway_auth_failures_total").increment(1);
}

pub fn record_fault(kind: &'static str) {
    metrics::counter!("gateway_faults_total", "kind" => kind).increment(1);
}

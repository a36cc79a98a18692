//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gpt0_origin_requests_total` (counter): origin fetches served
//! - `gpt0_proxy_requests_total` (counter): proxy outcomes by `outcome` label
//! - `gpt0_proxy_upstream_duration_seconds` (histogram): origin round-trip latency
//! - `gpt0_quota_remaining_bytes` (gauge): remaining bandwidth budget
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_origin_fetch() {
    counter!("gpt0_origin_requests_total").increment(1);
}

pub fn record_proxy_outcome(outcome: &'static str) {
    counter!("gpt0_proxy_requests_total", "outcome" => outcome).increment(1);
}

pub fn record_upstream_latency(start: Instant) {
    histogram!("gpt0_proxy_upstream_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_quota_remaining(remaining_bytes: u64) {
    gauge!("gpt0_quota_remaining_bytes").set(remaining_bytes as f64);
}

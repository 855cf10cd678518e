//! Metrics collection and exposition.
//!
//! # Metrics
//! - `faucet_requests_total` (counter): HTTP requests by status
//! - `faucet_request_duration_seconds` (histogram): latency by status
//! - `faucet_admissions_total` (counter): pipeline outcomes
//! - `faucet_rate_limited_total` (counter): rejections by dimension
//! - `faucet_transfers_total` (counter): transfer results
//!
//! # Design Decisions
//! - Low-overhead updates (atomic operations behind the metrics facade)
//! - Prometheus exposition on a dedicated listener, separate from traffic

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            describe_counter!("faucet_requests_total", "Total HTTP requests by status");
            describe_histogram!(
                "faucet_request_duration_seconds",
                "Request latency in seconds"
            );
            describe_counter!("faucet_admissions_total", "Admission pipeline outcomes");
            describe_counter!(
                "faucet_rate_limited_total",
                "Rate-limit rejections by identity dimension"
            );
            describe_counter!("faucet_transfers_total", "Transfer executor results");
            tracing::info!(address = %addr, "Metrics exporter listening");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to install metrics exporter");
        }
    }
}

/// Count an HTTP request and record its latency.
pub fn record_request(status: u16, start: Instant) {
    let status = status.to_string();
    counter!("faucet_requests_total", "status" => status.clone()).increment(1);
    histogram!("faucet_request_duration_seconds", "status" => status)
        .record(start.elapsed().as_secs_f64());
}

/// Count one admission pipeline outcome.
pub fn record_admission(outcome: &'static str) {
    counter!("faucet_admissions_total", "outcome" => outcome).increment(1);
}

/// Count a rate-limit rejection for one identity dimension.
pub fn record_rate_limited(dimension: &'static str) {
    counter!("faucet_rate_limited_total", "dimension" => dimension).increment(1);
}

/// Count a transfer executor result.
pub fn record_transfer(success: bool) {
    let result = if success { "success" } else { "failure" };
    counter!("faucet_transfers_total", "result" => result).increment(1);
}

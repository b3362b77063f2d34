//! Metrics collection and exposition.
//!
//! # Metrics
//! - `form_config_http_requests_total` (counter): by method, route, status
//! - `form_config_http_request_duration_seconds` (histogram): by method, route
//! - `form_config_store_operations_total` (counter): by backend, operation, outcome
//! - `form_config_cache_lookups_total` (counter): by result (hit, miss)
//! - `form_config_cache_loads_total` (counter): by outcome
//! - `form_config_cache_invalidations_total` (counter)

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    counter!(
        "form_config_http_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "form_config_http_request_duration_seconds",
        "method" => method.to_string(),
        "route" => route.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_store_op(backend: &'static str, op: &'static str, ok: bool) {
    counter!(
        "form_config_store_operations_total",
        "backend" => backend,
        "operation" => op,
        "outcome" => if ok { "ok" } else { "error" }
    )
    .increment(1);
}

pub fn record_cache_lookup(hit: bool) {
    counter!(
        "form_config_cache_lookups_total",
        "result" => if hit { "hit" } else { "miss" }
    )
    .increment(1);
}

pub fn record_cache_load(ok: bool) {
    counter!(
        "form_config_cache_loads_total",
        "outcome" => if ok { "ok" } else { "error" }
    )
    .increment(1);
}

pub fn record_cache_invalidation() {
    counter!("form_config_cache_invalidations_total").increment(1);
}

//! Metrics collection and exposition.
//!
//! # Metrics
//! - `lookup_requests_total` (counter): requests by method, route, status
//! - `lookup_request_duration_seconds` (histogram): latency by method, route
//! - `lookup_dependency_up` (gauge): 1=reachable, 0=unreachable
//! - `lookup_ready` (gauge): 1 while the readiness probe passes the lifecycle gate
//!
//! Recording goes through the `metrics` facade and is a no-op until an
//! exporter is installed. Tests capture values with a local debugging
//! recorder instead.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed request.
pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    let elapsed = start.elapsed().as_secs_f64();

    metrics::counter!(
        "lookup_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    metrics::histogram!(
        "lookup_request_duration_seconds",
        "method" => method.to_string(),
        "route" => route.to_string()
    )
    .record(elapsed);
}

/// Record the reachability of a dependency.
pub fn record_dependency_health(name: &str, up: bool) {
    metrics::gauge!("lookup_dependency_up", "dependency" => name.to_string())
        .set(if up { 1.0 } else { 0.0 });
}

/// Record the lifecycle readiness flag.
pub fn record_ready(ready: bool) {
    metrics::gauge!("lookup_ready").set(if ready { 1.0 } else { 0.0 });
}

/// Middleware recording per-request counters and latency.
///
/// Routes are labelled by their matched pattern (`/{id}`), never by the raw
/// path, to keep label cardinality bounded.
pub async fn track_requests(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;
    record_request(&method, response.status().as_u16(), &route, start);
    response
}

//! Prometheus metrics
//!
//! Request counters and latency histograms are recorded by
//! [`track_requests`]; `/metrics` renders them through the recorder handle.

use std::time::Instant;

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";
pub const APP_INFO: &str = "app_info";
pub const DATABASE_CONNECTIONS: &str = "database_connections";
pub const REDIS_CONNECTIONS: &str = "redis_connections";

const DURATION_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// Install the global recorder. Call once per process.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = builder()?.install_recorder()?;
    describe();
    Ok(handle)
}

/// A recorder handle that is not installed globally.
///
/// Renders nothing recorded through the `metrics` macros; used where a
/// router is built more than once in one process.
pub fn detached_handle() -> Result<PrometheusHandle, BuildError> {
    Ok(builder()?.build_recorder().handle())
}

fn builder() -> Result<PrometheusBuilder, BuildError> {
    PrometheusBuilder::new().set_buckets_for_metric(
        Matcher::Full(HTTP_REQUEST_DURATION_SECONDS.to_string()),
        DURATION_BUCKETS,
    )
}

fn describe() {
    metrics::describe_counter!(HTTP_REQUESTS_TOTAL, "Total HTTP requests");
    metrics::describe_histogram!(
        HTTP_REQUEST_DURATION_SECONDS,
        metrics::Unit::Seconds,
        "HTTP request latency"
    );
    metrics::describe_gauge!(APP_INFO, "Application info");
    metrics::describe_gauge!(DATABASE_CONNECTIONS, "Database reachable (1) or not (0)");
    metrics::describe_gauge!(REDIS_CONNECTIONS, "Cache reachable (1) or not (0)");

    metrics::gauge!(APP_INFO, "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

/// Middleware recording request count and latency per route template.
pub async fn track_requests(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());

    let response = next.run(request).await;

    let status = response.status().as_u16().to_string();
    metrics::counter!(
        HTTP_REQUESTS_TOTAL,
        "method" => method.clone(),
        "endpoint" => endpoint.clone(),
        "status" => status
    )
    .increment(1);
    metrics::histogram!(
        HTTP_REQUEST_DURATION_SECONDS,
        "method" => method,
        "endpoint" => endpoint
    )
    .record(start.elapsed().as_secs_f64());

    response
}

/// Record the outcome of a dependency probe.
pub fn set_connection_gauge(name: &'static str, connected: bool) {
    metrics::gauge!(name).set(if connected { 1.0 } else { 0.0 });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detached_handle_renders() {
        let handle = detached_handle().unwrap();
        // Nothing recorded through this handle yet
        assert!(!handle.render().contains(HTTP_REQUESTS_TOTAL));
    }
}

//! Metrics collection
//!
//! Prometheus metrics for HTTP traffic, API operations, the geocoder and the
//! database pool.

use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, register_int_gauge, register_int_gauge_vec,
    HistogramVec, IntCounterVec, IntGauge, IntGaugeVec,
};

lazy_static! {
    // HTTP Request Metrics

    /// Total HTTP requests by method, path, and status
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "internhub_http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .expect("Failed to register HTTP_REQUESTS_TOTAL");

    /// HTTP request duration in seconds
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "internhub_http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("Failed to register HTTP_REQUEST_DURATION_SECONDS");

    pub static ref HTTP_REQUESTS_IN_FLIGHT: IntGaugeVec = register_int_gauge_vec!(
        "internhub_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
        &["method", "path"]
    )
    .expect("Failed to register HTTP_REQUESTS_IN_FLIGHT");

    // API Operation Metrics

    /// Operations by resource (`internships`, `companies`) and operation
    pub static ref API_OPERATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "internhub_api_operations_total",
        "Total number of API operations",
        &["resource", "operation", "status"]
    )
    .expect("Failed to register API_OPERATIONS_TOTAL");

    pub static ref API_OPERATION_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "internhub_api_operation_duration_seconds",
        "API operation duration in seconds",
        &["resource", "operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("Failed to register API_OPERATION_DURATION_SECONDS");

    /// Rows returned by list and radius queries
    pub static ref QUERY_RESULTS: HistogramVec = register_histogram_vec!(
        "internhub_query_results",
        "Number of documents returned by a query",
        &["resource"],
        vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0]
    )
    .expect("Failed to register QUERY_RESULTS");

    // Geocoder Metrics

    /// Geocoder lookups by outcome (`cache_hit`, `match`, `no_match`, `error`)
    pub static ref GEOCODER_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "internhub_geocoder_requests_total",
        "Total number of geocoder lookups",
        &["outcome"]
    )
    .expect("Failed to register GEOCODER_REQUESTS_TOTAL");

    // Database Metrics

    pub static ref DB_CONNECTIONS_ACTIVE: IntGauge = register_int_gauge!(
        "internhub_db_connections_active",
        "Number of active database connections"
    )
    .expect("Failed to register DB_CONNECTIONS_ACTIVE");

    pub static ref DB_CONNECTIONS_IDLE: IntGauge = register_int_gauge!(
        "internhub_db_connections_idle",
        "Number of idle database connections"
    )
    .expect("Failed to register DB_CONNECTIONS_IDLE");
}

const RESOURCES: [&str; 2] = ["internships", "companies"];

/// Label for paths outside the API surface.
pub const UNMATCHED_PATH: &str = "/unmatched";

/// Map a request path onto a fixed set of route labels.
///
/// `{base}/internships/<uuid>` → `{base}/internships/{id}`,
/// `{base}/internships/radius/Haifa/10/km` →
/// `{base}/internships/radius/{address}/{distance}/{unit}`. `/`, `/health` and
/// `/metrics` keep their path; everything else is [`UNMATCHED_PATH`].
pub fn sanitize_path(base_path: &str, path: &str) -> String {
    if matches!(path, "/" | "/health" | "/metrics") {
        return path.to_string();
    }

    let base = base_path.trim_end_matches('/');
    let Some(rest) = path.strip_prefix(base).and_then(|r| r.strip_prefix('/')) else {
        return UNMATCHED_PATH.to_string();
    };

    let mut segments = rest.split('/');
    let Some(resource) = segments
        .next()
        .and_then(|s| RESOURCES.iter().find(|r| **r == s))
    else {
        return UNMATCHED_PATH.to_string();
    };

    let tail: Vec<&str> = segments.filter(|s| !s.is_empty()).collect();
    let suffix = match tail.as_slice() {
        [] => "",
        ["radius", _, _, _] => "/radius/{address}/{distance}/{unit}",
        [_] => "/{id}",
        _ => return UNMATCHED_PATH.to_string(),
    };
    format!("{base}/{resource}{suffix}")
}

/// `internships` / `companies` when the path addresses one of them.
pub fn extract_resource(path: &str) -> Option<&'static str> {
    path.split('/')
        .find_map(|s| RESOURCES.iter().find(|r| **r == s).copied())
}

pub fn extract_operation(method: &str, path: &str) -> Option<&'static str> {
    let resource = extract_resource(path)?;
    let after: Vec<&str> = path
        .split('/')
        .skip_while(|s| *s != resource)
        .skip(1)
        .filter(|s| !s.is_empty())
        .collect();

    match (method, after.first()) {
        ("GET", None) => Some("list"),
        ("GET", Some(&"radius")) => Some("radius"),
        ("GET", Some(_)) => Some("read"),
        ("POST", None) => Some("create"),
        ("PUT", Some(_)) => Some("update"),
        ("DELETE", Some(_)) => Some("delete"),
        _ => None,
    }
}

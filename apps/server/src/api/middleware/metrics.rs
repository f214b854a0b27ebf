//! Metrics middleware - tracks HTTP request metrics

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

use crate::state::AppState;

pub async fn metrics_middleware(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    // Ids and addresses are replaced to keep label cardinality low
    let sanitized_path = crate::metrics::sanitize_path(&state.config.server.base_path, &path);

    crate::metrics::HTTP_REQUESTS_IN_FLIGHT
        .with_label_values(&[&method, &sanitized_path])
        .inc();

    let response = next.run(req).await;

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    crate::metrics::HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &sanitized_path, &status])
        .inc();
    crate::metrics::HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[&method, &sanitized_path])
        .observe(duration);

    if let (Some(resource), Some(operation)) = (
        crate::metrics::extract_resource(&path),
        crate::metrics::extract_operation(&method, &path),
    ) {
        let outcome = if response.status().is_success() {
            "success"
        } else if response.status().is_client_error() {
            "client_error"
        } else {
            "server_error"
        };

        crate::metrics::API_OPERATIONS_TOTAL
            .with_label_values(&[resource, operation, outcome])
            .inc();
        crate::metrics::API_OPERATION_DURATION_SECONDS
            .with_label_values(&[resource, operation])
            .observe(duration);
    }

    crate::metrics::HTTP_REQUESTS_IN_FLIGHT
        .with_label_values(&[&method, &sanitized_path])
        .dec();

    response
}

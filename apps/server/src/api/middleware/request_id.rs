//! Request ID middleware
//!
//! Opens the `http_request` span for each request and:
//! - assigns a server request id and returns it in `x-request-id`
//! - echoes a differing client `x-request-id` back as `x-correlation-id`
//! - logs completion with status and duration

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{Instrument, Span};
use uuid::Uuid;

use crate::state::AppState;

pub async fn request_id_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let start = Instant::now();

    let client_id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let server_id = Uuid::new_v4().to_string();

    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let span = tracing::info_span!(
        "http_request",
        http.method = %method,
        http.route = %crate::metrics::sanitize_path(&state.config.server.base_path, &path),
        api.resource = tracing::field::Empty,
        api.operation = tracing::field::Empty,
        http.response.status_code = tracing::field::Empty,
        request_id = %server_id,
    );
    if let Some(resource) = crate::metrics::extract_resource(&path) {
        span.record("api.resource", resource);
    }
    if let Some(operation) = crate::metrics::extract_operation(method.as_str(), &path) {
        span.record("api.operation", operation);
    }

    let dev = state.config.is_development();
    let mut response = async move {
        if dev {
            tracing::info!(method = %method, path = %path, "Incoming request");
        } else {
            tracing::debug!(method = %method, path = %path, "Incoming request");
        }

        let response = next.run(req).await;

        let status = response.status();
        Span::current().record("http.response.status_code", status.as_u16());
        tracing::info!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Request completed"
        );
        response
    }
    .instrument(span)
    .await;

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&server_id) {
        headers.insert("x-request-id", value);
    }
    if let Some(client_id) = client_id.filter(|c| *c != server_id) {
        if let Ok(value) = HeaderValue::from_str(&client_id) {
            headers.insert("x-correlation-id", value);
        }
    }

    response
}

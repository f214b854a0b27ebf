//! Response shape and ambient endpoints.

use axum::http::StatusCode;
use serde_json::json;

use tower::ServiceExt as _;

use crate::support::{assert_failure, assert_status, TestApp, API};

#[tokio::test]
async fn list_envelope_has_count_and_pagination() -> anyhow::Result<()> {
    let app = TestApp::new()?;

    let (status, body) = app.get(&format!("{API}/internships")).await?;
    assert_status(status, StatusCode::OK, "list");
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["count"], json!(0));
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["pagination"]["total"], json!(0));
    assert!(body.get("error").is_none());
    Ok(())
}

#[tokio::test]
async fn unknown_route_uses_failure_envelope() -> anyhow::Result<()> {
    let app = TestApp::new()?;

    let (status, body) = app.get(&format!("{API}/bootcamps")).await?;
    assert_status(status, StatusCode::NOT_FOUND, "unknown route");
    assert_failure(&body, "Route not found");
    Ok(())
}

#[tokio::test]
async fn invalid_page_is_bad_request() -> anyhow::Result<()> {
    let app = TestApp::new()?;

    let (status, body) = app.get(&format!("{API}/internships?page=0")).await?;
    assert_status(status, StatusCode::BAD_REQUEST, "page=0");
    assert_eq!(body["success"], json!(false));
    Ok(())
}

#[tokio::test]
async fn health_reports_store_status() -> anyhow::Result<()> {
    let app = TestApp::new()?;

    let (status, body) = app.get("/health").await?;
    assert_status(status, StatusCode::OK, "health");
    assert_eq!(body["status"], json!("ok"));
    Ok(())
}

#[tokio::test]
async fn metrics_are_exposed() -> anyhow::Result<()> {
    let app = TestApp::new()?;
    app.get(&format!("{API}/internships")).await?;

    let response = app
        .router
        .clone()
        .oneshot(
            axum::http::Request::builder()
                .uri("/metrics")
                .body(axum::body::Body::empty())?,
        )
        .await?;
    assert_status(response.status(), StatusCode::OK, "metrics");
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let text = String::from_utf8(bytes.to_vec())?;
    assert!(text.contains("internhub_http_requests_total"));
    Ok(())
}

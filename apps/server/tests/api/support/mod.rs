//! In-process test harness: the full router over the in-memory store.

use std::sync::Arc;

use anyhow::Context as _;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use internhub::{
    api::create_router,
    config::StoreBackend,
    db::InMemoryCompanyStore,
    geo::StaticGeocoder,
    AppState, Config,
};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt as _;

pub const JWT_SECRET: &str = "test-secret";
pub const API: &str = "/api/v1";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    token: String,
}

/// Addresses the static geocoder knows: Tel Aviv, Jaffa (~5 km away) and Jerusalem
/// (~54 km away).
pub fn geocoder() -> StaticGeocoder {
    StaticGeocoder::new()
        .with("Tel Aviv", 34.7818, 32.0853)
        .with("Jaffa", 34.7522, 32.0504)
        .with("Jerusalem", 35.2137, 31.7683)
}

impl TestApp {
    pub fn new() -> anyhow::Result<Self> {
        Self::new_with_config(|_| {})
    }

    pub fn new_with_config(configure: impl FnOnce(&mut Config)) -> anyhow::Result<Self> {
        let mut config = Config::default();
        config.database.backend = StoreBackend::Memory;
        config.auth.enabled = true;
        config.auth.jwt_secret = JWT_SECRET.to_string();
        configure(&mut config);

        let state = AppState::from_parts(
            config,
            Arc::new(InMemoryCompanyStore::new()),
            Arc::new(geocoder()),
            None,
        )
        .context("assemble AppState")?;
        let router = create_router(state.clone());

        Ok(Self {
            router,
            state,
            token: mint_token(JWT_SECRET, "publisher-1"),
        })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Anonymous request.
    pub async fn get(&self, path: &str) -> anyhow::Result<(StatusCode, Value)> {
        self.send(Method::GET, path, None, None).await
    }

    /// Request carrying the default bearer token.
    pub async fn authed(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> anyhow::Result<(StatusCode, Value)> {
        self.send(method, path, body, Some(&self.token)).await
    }

    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> anyhow::Result<(StatusCode, Value)> {
        let mut builder = Request::builder()
            .method(method)
            .uri(path)
            .header("host", "localhost");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?)),
            None => builder.body(Body::empty()),
        }
        .context("build request")?;

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .context("dispatch request")?;

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .context("read response body")?;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).context("parse response body")?
        };
        Ok((status, value))
    }

    /// Create a company and return its id.
    pub async fn create_company(&self, name: &str) -> anyhow::Result<String> {
        let (status, body) = self
            .authed(
                Method::POST,
                &format!("{API}/companies"),
                Some(json!({"companyName": name, "address": "Tel Aviv"})),
            )
            .await?;
        assert_status(status, StatusCode::CREATED, "create company");
        body["data"]["id"]
            .as_str()
            .map(str::to_string)
            .context("company id")
    }

    /// Create an internship under `company` and return its id.
    pub async fn create_internship(
        &self,
        company: &str,
        internship: Value,
    ) -> anyhow::Result<String> {
        let (status, body) = self
            .authed(
                Method::POST,
                &format!("{API}/internships"),
                Some(json!({"companyName": company, "internship": internship})),
            )
            .await?;
        assert_status(status, StatusCode::CREATED, "create internship");
        body["data"]["id"]
            .as_str()
            .map(str::to_string)
            .context("internship id")
    }
}

pub fn mint_token(secret: &str, subject: &str) -> String {
    let claims = json!({
        "sub": subject,
        "exp": chrono::Utc::now().timestamp() + 3600,
    });
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("encode test token")
}

pub fn internship(job_id: &str, title: &str) -> Value {
    json!({"jobId": job_id, "title": title})
}

pub fn assert_status(actual: StatusCode, expected: StatusCode, context: &str) {
    assert_eq!(actual, expected, "{context}: unexpected status");
}

/// `success == false` and the given error message.
pub fn assert_failure(body: &Value, message: &str) {
    assert_eq!(body["success"], json!(false), "expected failure envelope: {body}");
    assert_eq!(body["error"], json!(message), "unexpected error message: {body}");
    assert!(body.get("data").is_none(), "failure carries no data: {body}");
}

/// Ids of `data[]` in order.
pub fn data_ids(body: &Value) -> Vec<String> {
    body["data"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|i| i["id"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

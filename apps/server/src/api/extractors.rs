//! Custom Axum extractors.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Request},
    http::{header, request::Parts},
};
use serde::de::DeserializeOwned;

use crate::{query::RawParams, Error};

/// JSON request body.
///
/// Unlike `axum::Json`, failures are reported through the API envelope as
/// validation errors. A missing content type is accepted as JSON.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_lowercase();
        let media_type = content_type.split(';').next().unwrap_or("").trim();
        if !media_type.is_empty() && media_type != "application/json" && !media_type.ends_with("+json")
        {
            return Err(Error::Validation(format!(
                "Unsupported content type '{media_type}', expected application/json"
            )));
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| Error::Validation(format!("Failed to read request body: {e}")))?;

        serde_json::from_slice(&bytes)
            .map(JsonBody)
            .map_err(|e| Error::Validation(format!("Invalid JSON in request body: {e}")))
    }
}

/// Raw query-string parameters in request order, repeated keys kept.
pub struct QueryParams(pub RawParams);

#[async_trait]
impl<S> FromRequestParts<S> for QueryParams
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(QueryParams(RawParams::from_query(parts.uri.query())))
    }
}

/// Path parameters.
///
/// Wraps `axum::extract::Path` so undecodable segments are reported through the
/// API envelope instead of axum's plain-text rejection.
pub struct Path<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for Path<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        axum::extract::Path::<T>::from_request_parts(parts, state)
            .await
            .map(|axum::extract::Path(value)| Path(value))
            .map_err(|rejection| Error::InvalidQuery(rejection.body_text()))
    }
}

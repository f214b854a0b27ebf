//! Authentication primitives.
//!
//! Tokens are HS256 JWTs issued elsewhere and validated here with the shared
//! `auth.jwt_secret`. A token is read from `Authorization: Bearer <jwt>` or, when
//! that header is absent, from the configured cookie (`token` by default).
//!
//! The middleware only attaches a [`Principal`]; private handlers demand one through
//! the [`AuthenticatedPrincipal`] extractor.

use axum::{
    extract::{FromRequestParts, State},
    http::{header, request::Parts, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{config::AuthConfig, state::AppState, Error};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub subject: String,
    pub issuer: Option<String>,
    pub roles: Vec<String>,
    /// Set when authentication is disabled.
    pub anonymous: bool,
}

impl Principal {
    pub fn anonymous() -> Self {
        Self {
            subject: "anonymous".to_string(),
            issuer: None,
            roles: Vec::new(),
            anonymous: true,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default)]
    iss: Option<String>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    roles: Vec<String>,
}

#[derive(Debug, Clone)]
pub enum AuthError {
    MissingToken,
    InvalidToken(String),
    Misconfigured(String),
}

impl AuthError {
    fn diagnostics(&self) -> String {
        match self {
            Self::MissingToken => "no token provided".to_string(),
            Self::InvalidToken(msg) => format!("Invalid token: {msg}"),
            Self::Misconfigured(msg) => format!("Authentication misconfigured: {msg}"),
        }
    }
}

impl From<AuthError> for Error {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Misconfigured(_) => Error::Internal(err.diagnostics()),
            _ => Error::Unauthorized(err.diagnostics()),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let challenge = !matches!(self, Self::Misconfigured(_));
        let mut response = Error::from(self).into_response();
        if challenge {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

#[derive(Clone)]
pub struct AuthManager {
    config: Arc<AuthConfig>,
    key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for AuthManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthManager")
            .field("enabled", &self.config.enabled)
            .field("issuer", &self.config.issuer)
            .finish_non_exhaustive()
    }
}

impl AuthManager {
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        if config.enabled && config.jwt_secret.is_empty() {
            return Err(AuthError::Misconfigured(
                "auth.jwt_secret is not set".to_string(),
            ));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.leeway_seconds;
        validation.set_required_spec_claims(&["exp", "sub"]);
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }

        Ok(Self {
            config: Arc::new(config.clone()),
            key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        })
    }

    pub fn enabled(&self) -> bool {
        self.config.enabled
    }

    /// `Ok(None)` when the request carries no token.
    pub fn authenticate_headers(&self, headers: &HeaderMap) -> Result<Option<Principal>, AuthError> {
        if !self.enabled() {
            return Ok(Some(Principal::anonymous()));
        }

        let Some(token) = self.token_from_headers(headers)? else {
            return Ok(None);
        };
        self.validate(&token).map(Some)
    }

    pub fn validate(&self, token: &str) -> Result<Principal, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        let claims = data.claims;

        let mut roles = claims.roles;
        roles.extend(claims.role);
        Ok(Principal {
            subject: claims.sub,
            issuer: claims.iss,
            roles,
            anonymous: false,
        })
    }

    fn token_from_headers(&self, headers: &HeaderMap) -> Result<Option<String>, AuthError> {
        if let Some(authz) = headers.get(header::AUTHORIZATION) {
            let authz = authz.to_str().map_err(|_| {
                AuthError::InvalidToken("Authorization header is not valid UTF-8".to_string())
            })?;
            let token = authz
                .strip_prefix("Bearer ")
                .or_else(|| authz.strip_prefix("bearer "))
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .ok_or_else(|| {
                    AuthError::InvalidToken(
                        "Authorization header must be 'Bearer <token>'".to_string(),
                    )
                })?;
            return Ok(Some(token.to_string()));
        }

        Ok(cookie_value(headers, &self.config.cookie_name))
    }
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty() && *value != "none")
        .map(|(_, value)| value.to_string())
}

/// Extractor for the authenticated principal attached by middleware.
///
/// Use `Option<AuthenticatedPrincipal>` in handlers for optional auth.
#[derive(Debug, Clone)]
pub struct AuthenticatedPrincipal(pub Principal);

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for AuthenticatedPrincipal
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(AuthenticatedPrincipal)
            .ok_or_else(|| AuthError::MissingToken.into_response())
    }
}

/// Middleware attaching `Principal` to requests that carry a valid token.
///
/// Requests without a token pass through; an invalid token is rejected here.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    if req.method() == axum::http::Method::OPTIONS {
        return next.run(req).await;
    }

    match state.auth.authenticate_headers(req.headers()) {
        Ok(Some(principal)) => {
            tracing::debug!(subject = %principal.subject, "Authenticated request");
            req.extensions_mut().insert::<Principal>(principal);
            next.run(req).await
        }
        Ok(None) => next.run(req).await,
        Err(err) => {
            tracing::debug!(reason = %err.diagnostics(), "Rejected token");
            err.into_response()
        }
    }
}

//! Error types for the internship service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::api::envelope::ApiResponse;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    NotFound(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Unsupported resource: {0}")]
    UnsupportedResource(String),

    #[error("unit is not legal: {0}")]
    InvalidUnit(String),

    #[error("Address not found: {0}")]
    AddressNotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not authorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Upstream failure: {0}")]
    Upstream(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl Error {
    /// HTTP status for this error kind.
    pub fn status(&self) -> StatusCode {
        match self {
            Error::NotFound(_) | Error::AddressNotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidQuery(_)
            | Error::UnsupportedResource(_)
            | Error::InvalidUnit(_)
            | Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::Database(_) | Error::Upstream(_) | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to hand back to a client.
    ///
    /// Collaborator failures are logged in full and reported generically.
    pub fn public_message(&self) -> String {
        match self {
            Error::Database(_) | Error::Upstream(_) | Error::Internal(_) => {
                tracing::error!("Internal error: {}", self);
                "Server Error".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        Error::Validation(errors.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        ApiResponse::failure(&self).into_response()
    }
}

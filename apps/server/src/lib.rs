//! Internship board REST service
//!
//! Companies and the internships they advertise, stored as one document per
//! company. Provides:
//! - query-string filtering, sorting, projection and paging
//! - geocoded radius search over internship positions
//! - a uniform `{success, count, data}` response envelope
//! - Postgres (JSONB) and in-memory storage backends

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod geo;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod query;
pub mod services;
pub mod state;

pub use config::Config;
pub use error::{Error, Result};
pub use state::AppState;

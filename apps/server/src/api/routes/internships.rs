//! Internship routes
//!
//! Reads are public. Writes and radius searches need an authenticated principal,
//! enforced by the handlers' extractor.

use crate::api::handlers::internships;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn internship_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/internships",
            get(internships::list_internships).post(internships::create_internship),
        )
        .route(
            "/internships/radius/:address/:distance/:unit",
            get(internships::internships_in_radius),
        )
        .route(
            "/internships/:id",
            get(internships::get_internship)
                .put(internships::update_internship)
                .delete(internships::delete_internship),
        )
}

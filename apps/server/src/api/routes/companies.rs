//! Company routes

use crate::api::handlers::companies;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn company_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/companies",
            get(companies::list_companies).post(companies::create_company),
        )
        .route(
            "/companies/:id",
            get(companies::get_company)
                .put(companies::update_company)
                .delete(companies::delete_company),
        )
}

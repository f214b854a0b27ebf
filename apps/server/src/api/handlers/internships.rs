//! Internship handlers

use axum::extract::State;
use serde_json::Value as JsonValue;

use crate::{
    api::{
        envelope::ApiResponse,
        extractors::{JsonBody, Path, QueryParams},
    },
    auth::AuthenticatedPrincipal,
    models::{CreateInternship, Internship},
    services::Listing,
    state::AppState,
    Result,
};

fn listing_response(listing: Listing) -> ApiResponse<Vec<JsonValue>> {
    crate::metrics::QUERY_RESULTS
        .with_label_values(&["internships"])
        .observe(listing.page.items.len() as f64);
    ApiResponse::page(listing.page, listing.pagination)
}

/// `GET /internships`
pub async fn list_internships(
    State(state): State<AppState>,
    QueryParams(params): QueryParams,
) -> Result<ApiResponse<Vec<JsonValue>>> {
    let listing = state.internships.list(&params).await?;
    Ok(listing_response(listing))
}

/// `GET /internships/:id`
pub async fn get_internship(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Internship>> {
    Ok(ApiResponse::ok(state.internships.get(&id).await?))
}

/// `POST /internships`
pub async fn create_internship(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    JsonBody(body): JsonBody<CreateInternship>,
) -> Result<ApiResponse<Internship>> {
    tracing::debug!(subject = %principal.subject, company = %body.company_name, "Create internship");
    Ok(ApiResponse::created(state.internships.create(body).await?))
}

/// `PUT /internships/:id`
pub async fn update_internship(
    State(state): State<AppState>,
    AuthenticatedPrincipal(_principal): AuthenticatedPrincipal,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<JsonValue>,
) -> Result<ApiResponse<Internship>> {
    Ok(ApiResponse::ok(state.internships.update(&id, &patch).await?))
}

/// `DELETE /internships/:id`
pub async fn delete_internship(
    State(state): State<AppState>,
    AuthenticatedPrincipal(_principal): AuthenticatedPrincipal,
    Path(id): Path<String>,
) -> Result<ApiResponse<JsonValue>> {
    state.internships.delete(&id).await?;
    Ok(ApiResponse::deleted())
}

/// `GET /internships/radius/:address/:distance/:unit`
pub async fn internships_in_radius(
    State(state): State<AppState>,
    AuthenticatedPrincipal(_principal): AuthenticatedPrincipal,
    Path((address, distance, unit)): Path<(String, String, String)>,
    QueryParams(params): QueryParams,
) -> Result<ApiResponse<Vec<JsonValue>>> {
    let listing = state
        .internships
        .within_radius(&address, &distance, &unit, &params)
        .await?;
    Ok(listing_response(listing))
}

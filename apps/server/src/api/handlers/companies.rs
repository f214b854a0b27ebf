//! Company handlers

use axum::extract::State;
use serde_json::Value as JsonValue;

use crate::{
    api::{
        envelope::ApiResponse,
        extractors::{JsonBody, Path, QueryParams},
    },
    auth::AuthenticatedPrincipal,
    models::{Company, NewCompany},
    state::AppState,
    Result,
};

pub async fn list_companies(
    State(state): State<AppState>,
    QueryParams(params): QueryParams,
) -> Result<ApiResponse<Vec<JsonValue>>> {
    let listing = state.companies.list(&params).await?;
    crate::metrics::QUERY_RESULTS
        .with_label_values(&["companies"])
        .observe(listing.page.items.len() as f64);
    Ok(ApiResponse::page(listing.page, listing.pagination))
}

pub async fn get_company(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Company>> {
    Ok(ApiResponse::ok(state.companies.get(&id).await?))
}

pub async fn create_company(
    State(state): State<AppState>,
    AuthenticatedPrincipal(_principal): AuthenticatedPrincipal,
    JsonBody(body): JsonBody<NewCompany>,
) -> Result<ApiResponse<Company>> {
    Ok(ApiResponse::created(state.companies.create(body).await?))
}

pub async fn update_company(
    State(state): State<AppState>,
    AuthenticatedPrincipal(_principal): AuthenticatedPrincipal,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<JsonValue>,
) -> Result<ApiResponse<Company>> {
    Ok(ApiResponse::ok(state.companies.update(&id, &patch).await?))
}

pub async fn delete_company(
    State(state): State<AppState>,
    AuthenticatedPrincipal(_principal): AuthenticatedPrincipal,
    Path(id): Path<String>,
) -> Result<ApiResponse<JsonValue>> {
    state.companies.delete(&id).await?;
    Ok(ApiResponse::deleted())
}

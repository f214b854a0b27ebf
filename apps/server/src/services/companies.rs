//! Company operations

use serde_json::Value as JsonValue;
use std::sync::Arc;
use validator::Validate;

use super::Listing;
use crate::{
    db::{locator, CompanyStore},
    models::{Company, NewCompany},
    query::{translate, QueryLimits, RawParams, ResourceKind},
    Error, Result,
};

pub struct CompanyService {
    store: Arc<dyn CompanyStore>,
    limits: QueryLimits,
}

fn not_found(id: &str) -> Error {
    Error::NotFound(format!("company id {id} doesn't exist"))
}

impl CompanyService {
    pub fn new(store: Arc<dyn CompanyStore>, limits: QueryLimits) -> Self {
        Self { store, limits }
    }

    pub async fn list(&self, params: &RawParams) -> Result<Listing> {
        let spec = translate(params, ResourceKind::Companies, &self.limits)?;
        let page = self.store.query_companies(&spec).await?;
        Ok(Listing {
            page,
            pagination: spec.pagination,
        })
    }

    pub async fn get(&self, id: &str) -> Result<Company> {
        let company_id = locator::parse_id(id).ok_or_else(|| not_found(id))?;
        self.store
            .get(company_id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn create(&self, body: NewCompany) -> Result<Company> {
        body.validate()?;
        if self.store.find_by_name(&body.company_name).await?.is_some() {
            return Err(Error::Conflict(format!(
                "Company name '{}' is already taken",
                body.company_name
            )));
        }

        let company = self.store.insert(Company::from_new(body)).await?;
        tracing::info!(company_id = %company.id, name = %company.company_name, "Created company");
        Ok(company)
    }

    pub async fn update(&self, id: &str, patch: &JsonValue) -> Result<Company> {
        let current = self.get(id).await?;
        let updated = self.store.save(current.patched(patch)?).await?;
        tracing::info!(company_id = %updated.id, revision = updated.revision, "Updated company");
        Ok(updated)
    }

    /// Removes the company together with its internships.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let company = self.get(id).await?;
        if !self.store.delete(company.id).await? {
            return Err(not_found(id));
        }
        tracing::info!(
            company_id = %company.id,
            internships = company.internships.len(),
            "Deleted company"
        );
        Ok(())
    }
}

//! In-memory company store
//!
//! Keeps companies in insertion order behind a single `RwLock`. Queries run the
//! shared evaluator in [`crate::query::eval`]. Used by tests and by
//! `database.backend = "memory"`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{locator, CompanyStore, LookupResult, QueryPage};
use crate::{
    models::Company,
    query::{eval, QuerySpec},
    Error, Result,
};

#[derive(Debug, Clone, Default)]
pub struct InMemoryCompanyStore {
    companies: Arc<RwLock<Vec<Company>>>,
}

impl InMemoryCompanyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_empty(&self) -> bool {
        self.companies.read().await.is_empty()
    }
}

fn name_taken(companies: &[Company], name: &str, except: Option<Uuid>) -> bool {
    companies
        .iter()
        .any(|c| c.company_name == name && Some(c.id) != except)
}

#[async_trait]
impl CompanyStore for InMemoryCompanyStore {
    async fn query_companies(&self, spec: &QuerySpec) -> Result<QueryPage> {
        let docs: Vec<JsonValue> = {
            let companies = self.companies.read().await;
            companies
                .iter()
                .map(serde_json::to_value)
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| Error::Internal(format!("Failed to serialize company: {e}")))?
        };
        Ok(eval::execute(docs, spec))
    }

    async fn query_internships(&self, spec: &QuerySpec) -> Result<QueryPage> {
        let docs: Vec<JsonValue> = {
            let companies = self.companies.read().await;
            companies
                .iter()
                .flat_map(Company::internship_documents)
                .collect()
        };
        Ok(eval::execute(docs, spec))
    }

    async fn get(&self, id: Uuid) -> Result<Option<Company>> {
        let companies = self.companies.read().await;
        Ok(companies.iter().find(|c| c.id == id).cloned())
    }

    async fn find_by_name(&self, company_name: &str) -> Result<Option<Company>> {
        let companies = self.companies.read().await;
        Ok(companies
            .iter()
            .find(|c| c.company_name == company_name)
            .cloned())
    }

    async fn find_owner(&self, internship_id: Uuid) -> Result<Option<LookupResult>> {
        let companies = self.companies.read().await;
        Ok(
            locator::find_owner(&companies, internship_id).map(|(company, internship)| {
                LookupResult {
                    company: company.clone(),
                    internship: internship.clone(),
                }
            }),
        )
    }

    async fn insert(&self, company: Company) -> Result<Company> {
        let mut companies = self.companies.write().await;
        if companies.iter().any(|c| c.id == company.id) {
            return Err(Error::Conflict(format!("Company {} already exists", company.id)));
        }
        if name_taken(&companies, &company.company_name, None) {
            return Err(Error::Conflict(format!(
                "Company name '{}' is already taken",
                company.company_name
            )));
        }
        companies.push(company.clone());
        Ok(company)
    }

    async fn save(&self, mut company: Company) -> Result<Company> {
        let mut companies = self.companies.write().await;
        if name_taken(&companies, &company.company_name, Some(company.id)) {
            return Err(Error::Conflict(format!(
                "Company name '{}' is already taken",
                company.company_name
            )));
        }

        let stored = companies
            .iter_mut()
            .find(|c| c.id == company.id)
            .ok_or_else(|| Error::NotFound(format!("company id {} doesn't exist", company.id)))?;
        if stored.revision != company.revision {
            return Err(Error::Conflict(format!(
                "Company {} was modified concurrently (expected revision {}, found {})",
                company.id, company.revision, stored.revision
            )));
        }

        company.revision += 1;
        *stored = company.clone();
        Ok(company)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut companies = self.companies.write().await;
        let before = companies.len();
        companies.retain(|c| c.id != id);
        Ok(companies.len() != before)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

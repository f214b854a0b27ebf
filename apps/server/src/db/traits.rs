//! Storage seam for company documents

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::{
    models::{Company, Internship},
    query::QuerySpec,
    Result,
};

/// One page of query results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryPage {
    /// Matches before pagination.
    pub total: usize,
    pub items: Vec<JsonValue>,
}

/// An internship together with the company that embeds it.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupResult {
    pub company: Company,
    pub internship: Internship,
}

/// Company persistence
///
/// Companies are stored whole: every change to an embedded internship is persisted
/// by saving its owning company. Implementations must be safe to share across
/// request handlers.
#[async_trait]
pub trait CompanyStore: Send + Sync {
    /// Query company documents.
    async fn query_companies(&self, spec: &QuerySpec) -> Result<QueryPage>;

    /// Query internship documents across all companies.
    ///
    /// Each item carries `companyId` and `companyName` of its owner.
    async fn query_internships(&self, spec: &QuerySpec) -> Result<QueryPage>;

    async fn get(&self, id: Uuid) -> Result<Option<Company>>;

    async fn find_by_name(&self, company_name: &str) -> Result<Option<Company>>;

    /// Locate the company embedding internship `internship_id`.
    async fn find_owner(&self, internship_id: Uuid) -> Result<Option<LookupResult>>;

    /// Store a new company.
    ///
    /// # Errors
    /// * `Conflict` - a company with the same id or name exists
    async fn insert(&self, company: Company) -> Result<Company>;

    /// Replace a stored company.
    ///
    /// Succeeds only while the stored revision equals `company.revision`; the saved
    /// copy carries the incremented revision.
    ///
    /// # Errors
    /// * `NotFound` - the company no longer exists
    /// * `Conflict` - the company changed since it was read, or the new name is taken
    async fn save(&self, company: Company) -> Result<Company>;

    /// Remove a company and its internships. Returns `false` when absent.
    async fn delete(&self, id: Uuid) -> Result<bool>;

    /// Cheap liveness probe of the backend.
    async fn ping(&self) -> Result<()>;
}

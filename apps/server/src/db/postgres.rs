//! PostgreSQL company store
//!
//! One row per company; the whole company (internships included) lives in the
//! `document` JSONB column. `revision` is the optimistic-concurrency token and is
//! mirrored into the document on every save.

use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};
use sqlx::{postgres::PgArguments, query::Query, PgPool, Postgres, Row};
use uuid::Uuid;

use super::{
    locator,
    sql::{self, BindValue, CompiledQuery, DocSource},
    CompanyStore, LookupResult, QueryPage,
};
use crate::{
    models::Company,
    query::{eval, QuerySpec},
    Error, Result,
};

#[derive(Clone)]
pub struct PostgresCompanyStore {
    pool: PgPool,
}

impl PostgresCompanyStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn run_query(&self, source: DocSource, spec: &QuerySpec) -> Result<QueryPage> {
        let CompiledQuery { sql, binds } = sql::compile_select(source, spec);
        let rows = bind_all(sqlx::query(&sql), binds)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        let CompiledQuery { sql, binds } = sql::compile_count(source, spec);
        let total: i64 = bind_all(sqlx::query(&sql), binds)
            .fetch_one(&self.pool)
            .await
            .and_then(|row| row.try_get(0))
            .map_err(Error::Database)?;

        let items = rows
            .iter()
            .map(|row| row.try_get::<JsonValue, _>("doc"))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::Database)?
            .into_iter()
            .map(|doc| eval::project(doc, &spec.select))
            .collect();

        Ok(QueryPage {
            total: usize::try_from(total).unwrap_or_default(),
            items,
        })
    }

    /// First company, in storage order, matching `clause`.
    async fn fetch_one_where(
        &self,
        clause: &str,
        bind: impl FnOnce(Query<'_, Postgres, PgArguments>) -> Query<'_, Postgres, PgArguments>,
    ) -> Result<Option<Company>> {
        let sql =
            format!("SELECT document, revision FROM companies WHERE {clause} ORDER BY seq LIMIT 1");
        let row = bind(sqlx::query(&sql))
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        row.map(|row| company_from_row(&row)).transpose()
    }
}

fn bind_all(
    mut query: Query<'_, Postgres, PgArguments>,
    binds: Vec<BindValue>,
) -> Query<'_, Postgres, PgArguments> {
    for value in binds {
        query = match value {
            BindValue::TextArray(v) => query.bind(v),
            BindValue::Json(v) => query.bind(v),
            BindValue::Float(v) => query.bind(v),
            BindValue::Int(v) => query.bind(v),
        };
    }
    query
}

fn company_from_row(row: &sqlx::postgres::PgRow) -> Result<Company> {
    let document: JsonValue = row.try_get("document").map_err(Error::Database)?;
    let revision: i64 = row.try_get("revision").map_err(Error::Database)?;
    let mut company: Company = serde_json::from_value(document)
        .map_err(|e| Error::Internal(format!("Stored company document is malformed: {e}")))?;
    company.revision = revision;
    Ok(company)
}

fn to_document(company: &Company) -> Result<JsonValue> {
    serde_json::to_value(company)
        .map_err(|e| Error::Internal(format!("Failed to serialize company: {e}")))
}

fn map_write_error(e: sqlx::Error, company: &Company) -> Error {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => Error::Conflict(format!(
            "Company name '{}' is already taken",
            company.company_name
        )),
        _ => Error::Database(e),
    }
}

#[async_trait]
impl CompanyStore for PostgresCompanyStore {
    async fn query_companies(&self, spec: &QuerySpec) -> Result<QueryPage> {
        self.run_query(DocSource::Companies, spec).await
    }

    async fn query_internships(&self, spec: &QuerySpec) -> Result<QueryPage> {
        self.run_query(DocSource::Internships, spec).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<Company>> {
        self.fetch_one_where("id = $1", |q| q.bind(id)).await
    }

    async fn find_by_name(&self, company_name: &str) -> Result<Option<Company>> {
        let name = company_name.to_string();
        self.fetch_one_where("company_name = $1", |q| q.bind(name)).await
    }

    async fn find_owner(&self, internship_id: Uuid) -> Result<Option<LookupResult>> {
        // Containment on the GIN-indexed internships array narrows to the owner.
        let probe = json!([{ "id": internship_id.to_string() }]);
        let Some(company) = self
            .fetch_one_where("document -> 'internships' @> $1::jsonb", |q| q.bind(probe))
            .await?
        else {
            return Ok(None);
        };

        let companies = [company];
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
        let document = to_document(&company)?;
        sqlx::query(
            r#"
            INSERT INTO companies (id, company_name, document, revision, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(company.id)
        .bind(&company.company_name)
        .bind(document)
        .bind(company.revision)
        .bind(company.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &company))?;

        tracing::debug!(company_id = %company.id, "Inserted company");
        Ok(company)
    }

    async fn save(&self, company: Company) -> Result<Company> {
        let expected = company.revision;
        let mut next = company;
        next.revision = expected + 1;
        let document = to_document(&next)?;

        let result = sqlx::query(
            r#"
            UPDATE companies
            SET company_name = $2, document = $3, revision = $4, updated_at = now()
            WHERE id = $1 AND revision = $5
            "#,
        )
        .bind(next.id)
        .bind(&next.company_name)
        .bind(document)
        .bind(next.revision)
        .bind(expected)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &next))?;

        if result.rows_affected() == 0 {
            let current: Option<i64> =
                sqlx::query_scalar("SELECT revision FROM companies WHERE id = $1")
                    .bind(next.id)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(Error::Database)?;
            return Err(match current {
                None => Error::NotFound(format!("company id {} doesn't exist", next.id)),
                Some(found) => Error::Conflict(format!(
                    "Company {} was modified concurrently (expected revision {expected}, found {found})",
                    next.id
                )),
            });
        }

        tracing::debug!(company_id = %next.id, revision = next.revision, "Saved company");
        Ok(next)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM companies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }
}

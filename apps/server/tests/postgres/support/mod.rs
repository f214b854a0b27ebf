use anyhow::Context as _;
use internhub::{
    db::{self, CompanyStore, InMemoryCompanyStore, PostgresCompanyStore},
    models::{Company, GeoPoint, Internship, NewCompany, NewInternship},
    query::{translate, QueryLimits, QuerySpec, RawParams, ResourceKind},
    Config,
};
use sqlx::Connection as _;
use url::Url;
use uuid::Uuid;

pub const JAFFA: (f64, f64) = (34.7522, 32.0504);
pub const JERUSALEM: (f64, f64) = (35.2137, 31.7683);
pub const TEL_AVIV: (f64, f64) = (34.7818, 32.0853);

pub struct TestDb {
    pub store: PostgresCompanyStore,
    schema: String,
    admin_database_url: String,
}

impl TestDb {
    pub async fn new() -> anyhow::Result<Self> {
        let admin_database_url =
            std::env::var("DATABASE_URL").context("DATABASE_URL must point at a test database")?;

        let schema = format!("test_{}", Uuid::new_v4().simple());
        let mut admin_conn = sqlx::PgConnection::connect(&admin_database_url)
            .await
            .context("connect admin db for schema create")?;
        sqlx::query(&format!(r#"CREATE SCHEMA "{}""#, schema))
            .execute(&mut admin_conn)
            .await
            .context("create test schema")?;

        let mut config = Config::default().database;
        config.url = with_search_path(&admin_database_url, &schema)?;
        config.pool_min_size = 0;
        config.pool_max_size = 2;
        config.run_migrations = true;

        let pool = db::connect(&config).await.context("connect test pool")?;

        Ok(Self {
            store: PostgresCompanyStore::new(pool),
            schema,
            admin_database_url,
        })
    }

    pub async fn cleanup(self) -> anyhow::Result<()> {
        self.store.pool().close().await;

        let mut admin_conn = sqlx::PgConnection::connect(&self.admin_database_url)
            .await
            .context("connect admin db for schema drop")?;
        sqlx::query(&format!(r#"DROP SCHEMA "{}" CASCADE"#, self.schema))
            .execute(&mut admin_conn)
            .await
            .context("drop test schema")?;

        Ok(())
    }
}

fn with_search_path(database_url: &str, schema: &str) -> anyhow::Result<String> {
    let mut url = Url::parse(database_url).context("parse database URL")?;
    url.query_pairs_mut()
        .append_pair("options", &format!("-c search_path={}", schema));
    Ok(url.to_string())
}

pub fn company(name: &str) -> Company {
    Company::from_new(NewCompany {
        company_name: name.to_string(),
        description: None,
        website: None,
        email: None,
        phone: None,
        address: None,
    })
}

pub fn posting(
    title: &str,
    min_salary: Option<f64>,
    remote: bool,
    at: Option<(f64, f64)>,
) -> Internship {
    Internship::from_new(NewInternship {
        job_id: title.to_lowercase(),
        title: title.to_string(),
        description: None,
        location: None,
        min_salary,
        duration_months: None,
        remote,
        skills: Vec::new(),
        geo_position: at.map(|(lng, lat)| GeoPoint::new(lng, lat)),
    })
}

/// Acme posts "Port" (Jaffa, 40) and "Hill" (Jerusalem, 60, remote);
/// Globex posts "Unpaid" with no salary or position.
pub fn seed_companies() -> Vec<Company> {
    let mut acme = company("Acme");
    acme.internships
        .push(posting("Port", Some(40.0), false, Some(JAFFA)));
    acme.internships
        .push(posting("Hill", Some(60.0), true, Some(JERUSALEM)));

    let mut globex = company("Globex");
    globex.internships.push(posting("Unpaid", None, false, None));

    vec![acme, globex]
}

/// The same companies in Postgres and in memory.
pub async fn seeded(db: &TestDb) -> anyhow::Result<InMemoryCompanyStore> {
    let memory = InMemoryCompanyStore::new();
    for company in seed_companies() {
        db.store.insert(company.clone()).await?;
        memory.insert(company).await?;
    }
    Ok(memory)
}

pub fn internship_spec(pairs: &[(&str, &str)]) -> QuerySpec {
    translate(
        &RawParams::from_pairs(pairs.iter().copied()),
        ResourceKind::Internships,
        &QueryLimits::default(),
    )
    .expect("valid query")
}

pub async fn titles(store: &dyn CompanyStore, spec: &QuerySpec) -> anyhow::Result<Vec<String>> {
    let page = store.query_internships(spec).await?;
    Ok(page
        .items
        .iter()
        .filter_map(|item| item["title"].as_str().map(str::to_string))
        .collect())
}

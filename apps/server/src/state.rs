//! Shared application state

use sqlx::PgPool;
use std::sync::Arc;

use crate::{
    auth::AuthManager,
    config::StoreBackend,
    db::{self, CompanyStore, InMemoryCompanyStore, PostgresCompanyStore},
    geo::{Geocoder, HttpGeocoder},
    services::{CompanyService, InternshipService},
    Config, Result,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn CompanyStore>,
    /// Present with the Postgres backend; feeds pool gauges.
    pub pool: Option<PgPool>,
    pub geocoder: Arc<dyn Geocoder>,
    pub auth: Arc<AuthManager>,
    pub internships: Arc<InternshipService>,
    pub companies: Arc<CompanyService>,
}

impl AppState {
    /// Build state from configuration: connect the store and the geocoder.
    pub async fn new(config: Config) -> Result<Self> {
        let (store, pool): (Arc<dyn CompanyStore>, Option<PgPool>) = match config.database.backend
        {
            StoreBackend::Postgres => {
                let pool = db::connect(&config.database).await?;
                tracing::info!(
                    max_connections = config.database.pool_max_size,
                    "Connected to PostgreSQL"
                );
                (
                    Arc::new(PostgresCompanyStore::new(pool.clone())),
                    Some(pool),
                )
            }
            StoreBackend::Memory => {
                tracing::warn!("Using the in-memory store; data is lost on restart");
                (Arc::new(InMemoryCompanyStore::new()), None)
            }
        };

        let geocoder: Arc<dyn Geocoder> = Arc::new(HttpGeocoder::new(&config.geocoder)?);
        Self::from_parts(config, store, geocoder, pool)
    }

    /// Assemble state around existing collaborators.
    pub fn from_parts(
        config: Config,
        store: Arc<dyn CompanyStore>,
        geocoder: Arc<dyn Geocoder>,
        pool: Option<PgPool>,
    ) -> Result<Self> {
        let auth = Arc::new(AuthManager::new(&config.auth)?);
        let limits = config.query.limits();

        let internships = Arc::new(InternshipService::new(
            store.clone(),
            geocoder.clone(),
            config.geo.earth_radius(),
            limits,
            config.geocoder.geocode_on_create,
        ));
        let companies = Arc::new(CompanyService::new(store.clone(), limits));

        Ok(Self {
            config: Arc::new(config),
            store,
            pool,
            geocoder,
            auth,
            internships,
            companies,
        })
    }
}

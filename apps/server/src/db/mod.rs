//! Database layer - company storage backends

pub mod locator;
pub mod memory;
pub mod postgres;
pub mod sql;
pub mod traits;

pub use memory::InMemoryCompanyStore;
pub use postgres::PostgresCompanyStore;
pub use traits::{CompanyStore, LookupResult, QueryPage};

use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{config::DatabaseConfig, Error, Result};

/// Open the connection pool and apply pending migrations when configured to.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .min_connections(config.pool_min_size)
        .max_connections(config.pool_max_size)
        .acquire_timeout(Duration::from_secs(config.pool_timeout_seconds))
        .connect(&config.url)
        .await
        .map_err(Error::Database)?;

    if config.run_migrations {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| Error::Internal(format!("Migration failed: {e}")))?;
        tracing::info!("Database migrations applied");
    }

    Ok(pool)
}

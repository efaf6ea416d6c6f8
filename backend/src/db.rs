//! Database connection, migrations and first-run seeding

use std::{str::FromStr, time::Duration};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::config::{DatabaseConfig, SeedConfig};
use crate::error::AppResult;
use crate::services::{catalog::CatalogSeedReport, CatalogService, PersonService};

/// Open the durable store, creating the database file when missing
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect_with(options)
        .await
}

/// Open a private in-memory store
///
/// Every SQLite connection to `:memory:` gets its own database, so the pool
/// is pinned to one connection that never expires.
pub async fn connect_in_memory() -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
}

/// Apply pending schema migrations
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Outcome of a seeding run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub catalog: CatalogSeedReport,
    pub admin_created: bool,
}

/// Seed empty catalogs and create the administrator when absent
///
/// Catalogs that already hold rows are skipped and existing rows are never
/// overwritten, so running this on every start is safe.
pub async fn seed(pool: &SqlitePool, seed: &SeedConfig, bcrypt_cost: u32) -> AppResult<SeedReport> {
    let catalog = CatalogService::new(pool.clone()).seed_defaults().await?;
    let admin_created = PersonService::new(pool.clone(), bcrypt_cost)
        .ensure_admin(&seed.admin_username, &seed.admin_password)
        .await?;

    tracing::info!(
        crop_types = catalog.crop_types,
        soil_types = catalog.soil_types,
        climates = catalog.climates,
        admin_created,
        "Seeding completed"
    );

    Ok(SeedReport {
        catalog,
        admin_created,
    })
}

use std::sync::Arc;

use catalog_core::config::{AppConfig, ConfigError, LoadOptions};
use catalog_db::{
    connect_with_settings, ensure_schema, BaselineSeed, DbPool, ProductResolver, RepositoryError,
    SchemaError, SeedOutcome, SqlProductRepository,
};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub resolver: ProductResolver,
    pub seed: SeedOutcome,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database schema setup failed: {0}")]
    Schema(#[source] SchemaError),
    #[error("baseline seed failed: {0}")]
    Seed(#[source] RepositoryError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

/// Connects, ensures the schema and seeds the baseline catalog, in that
/// order. Any failure aborts startup before a listener exists.
pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    ensure_schema(&db_pool).await.map_err(BootstrapError::Schema)?;
    info!(
        event_name = "system.bootstrap.schema_ready",
        correlation_id = "bootstrap",
        "database schema ensured"
    );

    let seed = BaselineSeed::ensure(&db_pool).await.map_err(BootstrapError::Seed)?;
    info!(
        event_name = "system.bootstrap.seed_checked",
        correlation_id = "bootstrap",
        inserted = seed.inserted,
        live_count = seed.live_count,
        "baseline seed checked"
    );

    let repository = Arc::new(SqlProductRepository::new(db_pool.clone()));
    let resolver = ProductResolver::from_config(repository, &config.lookup);

    Ok(Application { config, db_pool, resolver, seed })
}

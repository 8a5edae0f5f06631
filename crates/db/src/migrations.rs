use sqlx::migrate::{MigrateError, Migrator};
use thiserror::Error;
use tracing::info;

use crate::DbPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Columns the product repository reads and writes.
pub const PRODUCT_COLUMNS: &[&str] =
    &["id", "code", "price", "created_at", "updated_at", "deleted_at"];

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("schema migration failed: {0}")]
    Migration(#[from] MigrateError),
    #[error("schema inspection failed: {0}")]
    Inspect(#[source] sqlx::Error),
    #[error("table `products` is incompatible: missing columns {missing:?}")]
    Incompatible { missing: Vec<String> },
}

pub async fn run_pending(pool: &DbPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

/// Applies pending migrations and checks that `products` has the expected
/// shape. Safe to call on every start: applied migrations are skipped and an
/// existing compatible table is left as is.
pub async fn ensure_schema(pool: &DbPool) -> Result<(), SchemaError> {
    run_pending(pool).await?;

    let columns: Vec<String> = sqlx::query_scalar("SELECT name FROM pragma_table_info('products')")
        .fetch_all(pool)
        .await
        .map_err(SchemaError::Inspect)?;

    let missing = PRODUCT_COLUMNS
        .iter()
        .filter(|expected| !columns.iter().any(|column| column == *expected))
        .map(|expected| expected.to_string())
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        return Err(SchemaError::Incompatible { missing });
    }

    info!(
        event_name = "system.schema.ready",
        correlation_id = "bootstrap",
        column_count = columns.len(),
        "product schema verified"
    );
    Ok(())
}

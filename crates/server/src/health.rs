//! Readiness probe.
//!
//! `GET /health` counts live products through the same repository the
//! resolver reads from, so a missing table or a closed pool reports
//! `degraded` with 503. Driver text is logged, never returned.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use catalog_db::{DbPool, ProductRepository, SqlProductRepository};
use chrono::Utc;
use serde::Serialize;
use tracing::warn;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Readiness {
    Ready,
    Degraded,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CatalogProbe {
    pub readiness: Readiness,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live_products: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub status: Readiness,
    pub catalog: CatalogProbe,
    pub checked_at: String,
}

pub fn router(db_pool: DbPool) -> Router {
    Router::new()
        .route("/health", get(health))
        .with_state(SqlProductRepository::new(db_pool))
}

pub async fn health(
    State(repository): State<SqlProductRepository>,
) -> (StatusCode, Json<HealthReport>) {
    let catalog = probe_catalog(&repository).await;
    let status_code = match catalog.readiness {
        Readiness::Ready => StatusCode::OK,
        Readiness::Degraded => StatusCode::SERVICE_UNAVAILABLE,
    };

    let report = HealthReport {
        status: catalog.readiness.clone(),
        catalog,
        checked_at: Utc::now().to_rfc3339(),
    };
    (status_code, Json(report))
}

async fn probe_catalog(repository: &SqlProductRepository) -> CatalogProbe {
    match repository.count_live().await {
        Ok(count) => CatalogProbe { readiness: Readiness::Ready, live_products: Some(count) },
        Err(error) => {
            warn!(
                event_name = "system.health.catalog_unavailable",
                error = %error,
                "catalog readiness probe failed"
            );
            CatalogProbe { readiness: Readiness::Degraded, live_products: None }
        }
    }
}

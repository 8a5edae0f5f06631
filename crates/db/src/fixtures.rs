use chrono::Utc;
use tracing::info;

use crate::connection::DbPool;
use crate::repositories::product::{encode_price, COUNT_LIVE, FIND_LIVE_BY_CODE, INSERT};
use crate::repositories::RepositoryError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BaselineProduct {
    pub code: &'static str,
    pub price: u64,
}

/// Records written into an empty catalog on first start, in insertion order.
pub const BASELINE_PRODUCTS: &[BaselineProduct] = &[
    BaselineProduct { code: "D42", price: 100 },
    BaselineProduct { code: "E33", price: 200 },
    BaselineProduct { code: "A10", price: 300 },
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedOutcome {
    /// Rows written by this call; zero when the catalog already had live rows.
    pub inserted: usize,
    pub live_count: i64,
}

impl SeedOutcome {
    pub fn is_noop(&self) -> bool {
        self.inserted == 0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}

/// Baseline catalog seeding.
///
/// The emptiness check and the inserts share one deferred transaction. When
/// two processes race on a fresh file, SQLite lets only one of them upgrade
/// to a writer; the other fails with a busy error and its startup aborts. A
/// rerun then sees the populated catalog and skips.
pub struct BaselineSeed;

impl BaselineSeed {
    pub async fn ensure(pool: &DbPool) -> Result<SeedOutcome, RepositoryError> {
        let mut tx = pool.begin().await?;

        let existing: i64 = sqlx::query_scalar(COUNT_LIVE).fetch_one(&mut *tx).await?;
        if existing != 0 {
            tx.rollback().await?;
            info!(
                event_name = "system.seed.skipped",
                correlation_id = "bootstrap",
                live_count = existing,
                "catalog already populated, skipping baseline seed"
            );
            return Ok(SeedOutcome { inserted: 0, live_count: existing });
        }

        let now = Utc::now().to_rfc3339();
        for product in BASELINE_PRODUCTS {
            sqlx::query(INSERT)
                .bind(product.code)
                .bind(encode_price(product.price)?)
                .bind(&now)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        info!(
            event_name = "system.seed.applied",
            correlation_id = "bootstrap",
            inserted = BASELINE_PRODUCTS.len(),
            "baseline catalog seeded"
        );
        Ok(SeedOutcome {
            inserted: BASELINE_PRODUCTS.len(),
            live_count: BASELINE_PRODUCTS.len() as i64,
        })
    }

    /// Checks that every baseline code resolves to a live record with its
    /// baseline price.
    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::with_capacity(BASELINE_PRODUCTS.len());

        for product in BASELINE_PRODUCTS {
            let row: Option<(i64, String, i64, String, String, Option<String>)> =
                sqlx::query_as(FIND_LIVE_BY_CODE).bind(product.code).fetch_optional(pool).await?;
            let matches = row
                .map(|(_, _, price, _, _, _)| encode_price(product.price).ok() == Some(price))
                .unwrap_or(false);
            checks.push((product.code, matches));
        }

        let all_present = checks.iter().all(|(_, passed)| *passed);
        Ok(VerificationResult { all_present, checks })
    }
}

use chrono::{DateTime, Utc};
use sqlx::Row;

use catalog_core::domain::product::{Lifecycle, NewProduct, Product, ProductCode, ProductId};

use super::{ProductRepository, RepositoryError};
use crate::DbPool;

// Statement text is fixed; caller input only ever travels through `.bind`.
pub(crate) const FIND_BY_ID: &str = "SELECT id, code, price, created_at, updated_at, deleted_at
     FROM products WHERE id = ?1";

pub(crate) const FIND_LIVE_BY_CODE: &str =
    "SELECT id, code, price, created_at, updated_at, deleted_at
     FROM products
     WHERE code = ?1 AND deleted_at IS NULL
     ORDER BY id ASC
     LIMIT 1";

pub(crate) const COUNT_LIVE: &str = "SELECT COUNT(*) FROM products WHERE deleted_at IS NULL";

pub(crate) const INSERT: &str =
    "INSERT INTO products (code, price, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)";

pub(crate) const SOFT_DELETE: &str =
    "UPDATE products SET deleted_at = ?1, updated_at = ?1 WHERE id = ?2 AND deleted_at IS NULL";

#[derive(Clone)]
pub struct SqlProductRepository {
    pool: DbPool,
}

impl SqlProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn parse_timestamp(column: &str, value: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Decode(format!("{column}: {e}")))
}

pub(crate) fn encode_price(price: u64) -> Result<i64, RepositoryError> {
    i64::try_from(price)
        .map_err(|_| RepositoryError::Encode(format!("price {price} exceeds storage range")))
}

fn row_to_product(row: &sqlx::sqlite::SqliteRow) -> Result<Product, RepositoryError> {
    let id: i64 = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let code: String = row.try_get("code").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let price: i64 = row.try_get("price").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let created_at_str: String =
        row.try_get("created_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let updated_at_str: String =
        row.try_get("updated_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let deleted_at_str: Option<String> =
        row.try_get("deleted_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let price = u64::try_from(price)
        .map_err(|_| RepositoryError::Decode(format!("product {id} has negative price {price}")))?;
    let deleted_at = deleted_at_str
        .as_deref()
        .map(|value| parse_timestamp("deleted_at", value))
        .transpose()?;

    Ok(Product {
        id: ProductId(id),
        code,
        price,
        lifecycle: Lifecycle::from_deleted_at(deleted_at),
        created_at: parse_timestamp("created_at", &created_at_str)?,
        updated_at: parse_timestamp("updated_at", &updated_at_str)?,
    })
}

#[async_trait::async_trait]
impl ProductRepository for SqlProductRepository {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query(FIND_BY_ID).bind(id.0).fetch_optional(&self.pool).await?;

        match row {
            Some(ref r) => Ok(Some(row_to_product(r)?)),
            None => Ok(None),
        }
    }

    async fn find_live_by_code(
        &self,
        code: &ProductCode,
    ) -> Result<Option<Product>, RepositoryError> {
        let row =
            sqlx::query(FIND_LIVE_BY_CODE).bind(code.as_str()).fetch_optional(&self.pool).await?;

        match row {
            Some(ref r) => Ok(Some(row_to_product(r)?)),
            None => Ok(None),
        }
    }

    async fn count_live(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(COUNT_LIVE).fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn insert(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        let now = Utc::now();
        let result = sqlx::query(INSERT)
            .bind(&product.code)
            .bind(encode_price(product.price)?)
            .bind(now.to_rfc3339())
            .execute(&self.pool)
            .await?;

        Ok(Product {
            id: ProductId(result.last_insert_rowid()),
            code: product.code,
            price: product.price,
            lifecycle: Lifecycle::Live,
            created_at: now,
            updated_at: now,
        })
    }

    async fn soft_delete(&self, id: &ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(SOFT_DELETE)
            .bind(Utc::now().to_rfc3339())
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[cfg(test)]
mod tests {
    use catalog_core::domain::product::{Lifecycle, NewProduct, ProductCode, ProductId};

    use super::SqlProductRepository;
    use crate::repositories::{ProductRepository, RepositoryError};
    use crate::{connect_with_settings, migrations, DbPool};

    const INJECTION_PROBES: &[&str] = &[
        "x'; DROP TABLE products; --",
        "' OR '1'='1",
        "E33' --",
        "E33'/*",
        "\"; DELETE FROM products; --",
        "' UNION SELECT id, code, price, created_at, updated_at, deleted_at FROM products --",
        "%",
        "E3_",
        "",
    ];

    async fn setup() -> (DbPool, SqlProductRepository) {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::ensure_schema(&pool).await.expect("schema");
        let repo = SqlProductRepository::new(pool.clone());
        for (code, price) in [("D42", 100), ("E33", 200), ("A10", 300)] {
            repo.insert(NewProduct::new(code, price)).await.expect("insert");
        }
        (pool, repo)
    }

    fn code(raw: &str) -> ProductCode {
        ProductCode::parse(raw, 4_096).expect("code within limit")
    }

    #[tokio::test]
    async fn find_live_by_code_returns_exact_match() {
        let (pool, repo) = setup().await;

        let found = repo.find_live_by_code(&code("D42")).await.expect("lookup").expect("present");
        assert_eq!(found.code, "D42");
        assert_eq!(found.price, 100);
        assert_eq!(found.lifecycle, Lifecycle::Live);

        pool.close().await;
    }

    #[tokio::test]
    async fn find_live_by_code_is_case_sensitive() {
        let (pool, repo) = setup().await;

        assert!(repo.find_live_by_code(&code("d42")).await.expect("lookup").is_none());
        assert!(repo.find_live_by_code(&code("D42 ")).await.expect("lookup").is_none());

        pool.close().await;
    }

    #[tokio::test]
    async fn hostile_codes_never_match_or_mutate() {
        let (pool, repo) = setup().await;

        for probe in INJECTION_PROBES {
            let found = repo.find_live_by_code(&code(probe)).await.expect("lookup");
            if let Some(product) = found {
                assert_eq!(product.code, *probe, "returned record must literally match input");
            }
        }

        assert_eq!(repo.count_live().await.expect("count"), 3);
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&pool)
            .await
            .expect("products table still exists");
        assert_eq!(total, 3);

        pool.close().await;
    }

    #[tokio::test]
    async fn hostile_code_stored_literally_is_found_literally() {
        let (pool, repo) = setup().await;
        let hostile = "x'; DROP TABLE products; --";
        let inserted = repo.insert(NewProduct::new(hostile, 5)).await.expect("insert");

        let found = repo.find_live_by_code(&code(hostile)).await.expect("lookup").expect("present");
        assert_eq!(found.id, inserted.id);
        assert_eq!(found.code, hostile);

        pool.close().await;
    }

    #[tokio::test]
    async fn duplicate_codes_resolve_to_lowest_id() {
        let (pool, repo) = setup().await;
        let first = repo.insert(NewProduct::new("DUP", 1)).await.expect("insert first");
        let second = repo.insert(NewProduct::new("DUP", 2)).await.expect("insert second");
        assert!(second.id > first.id);

        for _ in 0..3 {
            let found =
                repo.find_live_by_code(&code("DUP")).await.expect("lookup").expect("present");
            assert_eq!(found.id, first.id);
        }

        repo.soft_delete(&first.id).await.expect("delete first");
        let found = repo.find_live_by_code(&code("DUP")).await.expect("lookup").expect("present");
        assert_eq!(found.id, second.id);

        pool.close().await;
    }

    #[tokio::test]
    async fn soft_deleted_records_are_excluded_from_lookup_and_count() {
        let (pool, repo) = setup().await;
        let target =
            repo.find_live_by_code(&code("E33")).await.expect("lookup").expect("present");

        assert!(repo.soft_delete(&target.id).await.expect("delete"));
        assert!(!repo.soft_delete(&target.id).await.expect("second delete is a no-op"));

        assert!(repo.find_live_by_code(&code("E33")).await.expect("lookup").is_none());
        assert_eq!(repo.count_live().await.expect("count"), 2);

        let stored = repo.find_by_id(&target.id).await.expect("find").expect("row retained");
        assert!(matches!(stored.lifecycle, Lifecycle::Deleted { .. }));

        pool.close().await;
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let (pool, repo) = setup().await;
        let last = repo.insert(NewProduct::new("TMP", 1)).await.expect("insert");
        repo.soft_delete(&last.id).await.expect("delete");
        sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(last.id.0)
            .execute(&pool)
            .await
            .expect("hard delete");

        let next = repo.insert(NewProduct::new("TMP", 1)).await.expect("insert again");
        assert!(next.id > last.id);

        pool.close().await;
    }

    #[tokio::test]
    async fn negative_price_rows_fail_to_decode() {
        let (pool, repo) = setup().await;
        sqlx::query("PRAGMA ignore_check_constraints = ON").execute(&pool).await.expect("pragma");
        sqlx::query(
            "INSERT INTO products (code, price, created_at, updated_at)
             VALUES ('NEG', -1, '2024-01-01T00:00:00+00:00', '2024-01-01T00:00:00+00:00')",
        )
        .execute(&pool)
        .await
        .expect("insert raw row");

        let error = repo.find_live_by_code(&code("NEG")).await.expect_err("negative price");
        assert!(matches!(error, RepositoryError::Decode(_)));

        pool.close().await;
    }

    #[tokio::test]
    async fn find_by_id_returns_none_for_unknown_id() {
        let (pool, repo) = setup().await;
        assert!(repo.find_by_id(&ProductId(9_999)).await.expect("find").is_none());
        pool.close().await;
    }

    #[tokio::test]
    async fn closed_pool_surfaces_database_error() {
        let (pool, repo) = setup().await;
        pool.close().await;

        let error = repo.find_live_by_code(&code("D42")).await.expect_err("pool closed");
        assert!(matches!(error, RepositoryError::Database(_)));
    }
}

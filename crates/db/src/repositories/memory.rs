use chrono::Utc;
use tokio::sync::RwLock;

use catalog_core::domain::product::{Lifecycle, NewProduct, Product, ProductCode, ProductId};

use super::{ProductRepository, RepositoryError};

#[derive(Default)]
struct Catalog {
    next_id: i64,
    products: Vec<Product>,
}

/// Process-local repository with the same lookup rules as the SQL one.
#[derive(Default)]
pub struct InMemoryProductRepository {
    catalog: RwLock<Catalog>,
}

#[async_trait::async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let catalog = self.catalog.read().await;
        Ok(catalog.products.iter().find(|product| product.id == *id).cloned())
    }

    async fn find_live_by_code(
        &self,
        code: &ProductCode,
    ) -> Result<Option<Product>, RepositoryError> {
        let catalog = self.catalog.read().await;
        Ok(catalog
            .products
            .iter()
            .filter(|product| product.lifecycle.is_live() && product.code == code.as_str())
            .min_by_key(|product| product.id)
            .cloned())
    }

    async fn count_live(&self) -> Result<i64, RepositoryError> {
        let catalog = self.catalog.read().await;
        Ok(catalog.products.iter().filter(|product| product.lifecycle.is_live()).count() as i64)
    }

    async fn insert(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        let mut catalog = self.catalog.write().await;
        catalog.next_id += 1;
        let now = Utc::now();
        let stored = Product {
            id: ProductId(catalog.next_id),
            code: product.code,
            price: product.price,
            lifecycle: Lifecycle::Live,
            created_at: now,
            updated_at: now,
        };
        catalog.products.push(stored.clone());
        Ok(stored)
    }

    async fn soft_delete(&self, id: &ProductId) -> Result<bool, RepositoryError> {
        let mut catalog = self.catalog.write().await;
        let Some(product) = catalog
            .products
            .iter_mut()
            .find(|product| product.id == *id && product.lifecycle.is_live())
        else {
            return Ok(false);
        };

        let now = Utc::now();
        product.lifecycle = Lifecycle::Deleted { at: now };
        product.updated_at = now;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use catalog_core::domain::product::{Lifecycle, NewProduct, ProductCode};

    use crate::repositories::{InMemoryProductRepository, ProductRepository};

    #[tokio::test]
    async fn in_memory_repo_matches_sql_lookup_rules() {
        let repo = InMemoryProductRepository::default();
        let first = repo.insert(NewProduct::new("DUP", 1)).await.expect("insert");
        let second = repo.insert(NewProduct::new("DUP", 2)).await.expect("insert");
        let code = ProductCode::parse("DUP", 64).expect("code");

        let found = repo.find_live_by_code(&code).await.expect("lookup").expect("present");
        assert_eq!(found.id, first.id);

        assert!(repo.soft_delete(&first.id).await.expect("delete"));
        let found = repo.find_live_by_code(&code).await.expect("lookup").expect("present");
        assert_eq!(found.id, second.id);
        assert_eq!(repo.count_live().await.expect("count"), 1);

        let lower = ProductCode::parse("dup", 64).expect("code");
        assert!(repo.find_live_by_code(&lower).await.expect("lookup").is_none());

        let stored = repo.find_by_id(&first.id).await.expect("find").expect("retained");
        assert!(matches!(stored.lifecycle, Lifecycle::Deleted { .. }));
    }
}

use async_trait::async_trait;
use thiserror::Error;

use catalog_core::domain::product::{NewProduct, Product, ProductCode, ProductId};

pub mod memory;
pub mod product;

pub use memory::InMemoryProductRepository;
pub use product::SqlProductRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("encode error: {0}")]
    Encode(String),
    #[error("store call timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },
}

/// Product persistence. Every lookup other than `find_by_id` sees live
/// records only.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Fetches a record regardless of lifecycle state.
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Exact, case-sensitive match on `code` among live records. When several
    /// live records share the code, the one with the lowest id is returned.
    async fn find_live_by_code(
        &self,
        code: &ProductCode,
    ) -> Result<Option<Product>, RepositoryError>;

    async fn count_live(&self) -> Result<i64, RepositoryError>;

    async fn insert(&self, product: NewProduct) -> Result<Product, RepositoryError>;

    /// Marks a live record deleted. Returns `false` when no live record has `id`.
    async fn soft_delete(&self, id: &ProductId) -> Result<bool, RepositoryError>;
}

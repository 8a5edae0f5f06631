//! Resolves an untrusted product code to exactly one live product.
//!
//! The code is validated against the configured length limit and then handed
//! to [`ProductRepository::find_live_by_code`], whose statement is fixed text
//! with a single positional placeholder. Nothing here builds SQL.
//!
//! Matching rules:
//! - equality on `code`, case-sensitive, no trimming or normalisation;
//! - soft-deleted records never match;
//! - among duplicate live codes the lowest `id` wins.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use catalog_core::config::LookupConfig;
use catalog_core::domain::product::{Product, ProductCode};
use catalog_core::errors::{ApplicationError, DomainError};

use crate::repositories::{ProductRepository, RepositoryError};

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    InputRejected(#[from] DomainError),
    #[error("no live product matches the requested code")]
    NotFound,
    #[error(transparent)]
    Inconsistent(DomainError),
    #[error("store failure: {0}")]
    Store(#[from] RepositoryError),
}

impl ResolveError {
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::InputRejected(_) => "input_rejected",
            Self::NotFound => "not_found",
            Self::Inconsistent(_) => "inconsistent",
            Self::Store(RepositoryError::Timeout { .. }) => "store_timeout",
            Self::Store(_) => "store",
        }
    }
}

impl From<ResolveError> for ApplicationError {
    fn from(value: ResolveError) -> Self {
        match value {
            ResolveError::InputRejected(error) => Self::Domain(error),
            ResolveError::NotFound => Self::NotFound("product".to_string()),
            ResolveError::Inconsistent(error) => Self::Domain(error),
            ResolveError::Store(error) => Self::Persistence(error.to_string()),
        }
    }
}

#[derive(Clone)]
pub struct ProductResolver {
    repository: Arc<dyn ProductRepository>,
    max_code_length: usize,
    query_timeout: Duration,
}

impl ProductResolver {
    pub fn new(
        repository: Arc<dyn ProductRepository>,
        max_code_length: usize,
        query_timeout: Duration,
    ) -> Self {
        Self { repository, max_code_length, query_timeout }
    }

    pub fn from_config(repository: Arc<dyn ProductRepository>, config: &LookupConfig) -> Self {
        Self::new(
            repository,
            config.max_code_length,
            Duration::from_millis(config.query_timeout_ms),
        )
    }

    pub async fn resolve(&self, raw_code: &str) -> Result<Product, ResolveError> {
        let code = ProductCode::parse(raw_code, self.max_code_length)?;

        let found =
            match tokio::time::timeout(self.query_timeout, self.repository.find_live_by_code(&code))
                .await
            {
                Ok(result) => result?,
                Err(_) => {
                    return Err(ResolveError::Store(RepositoryError::Timeout {
                        after_ms: self.query_timeout.as_millis() as u64,
                    }))
                }
            };

        let Some(product) = found else {
            return Err(ResolveError::NotFound);
        };

        if !product.lifecycle.is_live() || product.code != code.as_str() {
            return Err(ResolveError::Inconsistent(DomainError::InvariantViolation(format!(
                "repository returned product {} outside the live exact-match set",
                product.id.0
            ))));
        }

        Ok(product)
    }
}

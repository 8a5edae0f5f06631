use std::sync::Arc;

use crate::commands::{run_with_pool, CommandResult};
use catalog_db::{ensure_schema, ProductResolver, ResolveError, SqlProductRepository};

pub fn run(code: &str) -> CommandResult {
    let code = code.to_string();
    let result = run_with_pool("lookup", |config, pool| async move {
        ensure_schema(&pool).await.map_err(|error| ("schema", error.to_string(), 5u8))?;

        let resolver = ProductResolver::from_config(
            Arc::new(SqlProductRepository::new(pool.clone())),
            &config.lookup,
        );
        let product = resolver.resolve(&code).await.map_err(|error| {
            let exit_code = match error {
                ResolveError::NotFound | ResolveError::InputRejected(_) => 6u8,
                ResolveError::Store(_) | ResolveError::Inconsistent(_) => 7u8,
            };
            (error.error_class(), error.to_string(), exit_code)
        })?;

        Ok(serde_json::json!({
            "id": product.id.0,
            "code": product.code,
            "price": product.price,
            "created_at": product.created_at.to_rfc3339(),
            "updated_at": product.updated_at.to_rfc3339(),
        })
        .to_string())
    });

    match result {
        Ok(message) => CommandResult::success("lookup", message),
        Err(failure) => failure,
    }
}

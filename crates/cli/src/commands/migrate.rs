use crate::commands::{run_with_pool, CommandResult};
use catalog_db::ensure_schema;

pub fn run() -> CommandResult {
    let result = run_with_pool("migrate", |_config, pool| async move {
        ensure_schema(&pool).await.map_err(|error| ("schema", error.to_string(), 5u8))
    });

    match result {
        Ok(()) => CommandResult::success("migrate", "product schema is up to date"),
        Err(failure) => failure,
    }
}

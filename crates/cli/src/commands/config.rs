use crate::commands::CommandResult;
use catalog_core::config::{AppConfig, LoadOptions};

/// Prints the merged configuration (defaults, file, env, overrides).
pub fn run() -> CommandResult {
    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => match serde_json::to_string(&config) {
            Ok(rendered) => CommandResult::success("config", rendered),
            Err(error) => CommandResult::failure("config", "serialization", error.to_string(), 1),
        },
        Err(error) => CommandResult::failure(
            "config",
            "config_validation",
            format!("configuration issue: {error}"),
            2,
        ),
    }
}

use crate::commands::{run_with_pool, CommandFailure, CommandResult};
use catalog_db::{ensure_schema, BaselineSeed, SeedOutcome};

pub fn run() -> CommandResult {
    let result = run_with_pool("seed", |_config, pool| async move {
        ensure_schema(&pool).await.map_err(|error| ("schema", error.to_string(), 5u8))?;

        let outcome = BaselineSeed::ensure(&pool)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;

        let verification = BaselineSeed::verify(&pool)
            .await
            .map_err(|error| verification_failure(error.to_string()))?;

        if !verification.all_present && !outcome.is_noop() {
            let failed_checks = verification
                .checks
                .iter()
                .filter_map(|(check, passed)| (!passed).then_some(*check))
                .collect::<Vec<_>>();
            return Err(verification_failure(verification_message(&failed_checks)));
        }

        Ok(outcome)
    });

    match result {
        Ok(outcome) => CommandResult::success("seed", summary(&outcome)),
        Err(failure) => failure,
    }
}

fn summary(outcome: &SeedOutcome) -> String {
    if outcome.is_noop() {
        format!(
            "catalog already populated ({} live products); nothing inserted",
            outcome.live_count
        )
    } else {
        format!("inserted {} baseline products", outcome.inserted)
    }
}

fn verification_failure(message: String) -> CommandFailure {
    ("seed_verification", message, 5)
}

fn verification_message(failed_checks: &[&str]) -> String {
    if failed_checks.is_empty() {
        "Some seed data failed to load".to_string()
    } else {
        format!("Seed verification failed for codes: {}", failed_checks.join(", "))
    }
}

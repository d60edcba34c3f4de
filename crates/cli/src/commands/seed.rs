use reach_db::{DemoDataset, RecordStore, SeedResult, DEMO_OWNER};

use crate::commands::{prepare, CommandResult, StepFailure, EXIT_DATABASE, EXIT_MIGRATION};

pub fn run() -> CommandResult {
    let (config, runtime) = match prepare("seed") {
        Ok(prepared) => prepared,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let store = RecordStore::connect(&config.database)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), EXIT_DATABASE))?;
        let outcome = load_and_verify(&store).await;
        store.close().await;
        outcome
    });

    match result {
        Ok(seeded) => CommandResult::success("seed", summary(&seeded)),
        Err(failure) => CommandResult::from_step("seed", failure),
    }
}

async fn load_and_verify(store: &RecordStore) -> Result<SeedResult, StepFailure> {
    store.migrate().await.map_err(|error| ("migration", error.to_string(), EXIT_MIGRATION))?;

    let seeded = DemoDataset::load(store.pool())
        .await
        .map_err(|error| ("seed_execution", error.to_string(), EXIT_MIGRATION))?;

    let verification = DemoDataset::verify(store.pool())
        .await
        .map_err(|error| ("seed_verification", error.to_string(), EXIT_MIGRATION))?;
    if !verification.all_present {
        let failed: Vec<&str> = verification
            .checks
            .iter()
            .filter_map(|(check, passed)| (!passed).then_some(*check))
            .collect();
        return Err(("seed_verification", verification_message(&failed), EXIT_MIGRATION));
    }

    Ok(seeded)
}

fn summary(seeded: &SeedResult) -> String {
    format!(
        "demo dataset ready for owner `{DEMO_OWNER}`: customers {} inserted, {} already present; \
         campaigns {} inserted, {} already present",
        seeded.customers_inserted,
        seeded.customers_skipped,
        seeded.campaigns_inserted,
        seeded.campaigns_skipped,
    )
}

fn verification_message(failed: &[&str]) -> String {
    if failed.is_empty() {
        "Some seed data failed to load".to_string()
    } else {
        format!("Seed verification failed for checks: {}", failed.join(", "))
    }
}

use reach_db::RecordStore;

use crate::commands::{prepare, CommandResult, StepFailure, EXIT_DATABASE, EXIT_MIGRATION};

pub fn run() -> CommandResult {
    let (config, runtime) = match prepare("migrate") {
        Ok(prepared) => prepared,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let store = RecordStore::connect(&config.database)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), EXIT_DATABASE))?;
        let migrated = store
            .migrate()
            .await
            .map_err(|error| ("migration", error.to_string(), EXIT_MIGRATION));
        store.close().await;
        migrated?;
        Ok::<(), StepFailure>(())
    });

    match result {
        Ok(()) => CommandResult::success("migrate", "applied pending migrations"),
        Err(failure) => CommandResult::from_step("migrate", failure),
    }
}

use reach_core::config::AppConfig;
use reach_db::RecordStore;
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub store: RecordStore,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
}

/// Connects the record store and brings its schema up to date.
pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let store =
        RecordStore::connect(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
    store.migrate().await.map_err(BootstrapError::Migration)?;

    info!(
        event_name = "system.bootstrap.ready",
        correlation_id = "bootstrap",
        "record store connected and migrated"
    );

    Ok(Application { config, store })
}

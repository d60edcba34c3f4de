use std::sync::Arc;
use std::time::Duration;

use sqlx::migrate::MigrateError;
use sqlx::sqlite::SqlitePoolOptions;
use tracing::info;

use reach_core::config::DatabaseConfig;

use crate::migrations;
use crate::repositories::{
    CampaignRepository, CustomerRepository, SqlCampaignRepository, SqlCustomerRepository,
};

pub type DbPool = sqlx::SqlitePool;

pub async fn connect(database_url: &str) -> Result<DbPool, sqlx::Error> {
    connect_with_settings(database_url, 5, 30).await
}

pub async fn connect_with_settings(
    database_url: &str,
    max_connections: u32,
    timeout_secs: u64,
) -> Result<DbPool, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .acquire_timeout(Duration::from_secs(timeout_secs.max(1)))
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                sqlx::query("PRAGMA foreign_keys = ON").execute(&mut *conn).await?;
                sqlx::query("PRAGMA journal_mode = WAL").execute(&mut *conn).await?;
                sqlx::query("PRAGMA busy_timeout = 5000").execute(&mut *conn).await?;
                Ok(())
            })
        })
        .connect(database_url)
        .await
}

/// Explicitly constructed handle over the customer and campaign collections.
///
/// There is no process-wide connection: callers connect, hand repository
/// handles to the services that need them, and close the store on shutdown.
#[derive(Clone, Debug)]
pub struct RecordStore {
    pool: DbPool,
}

impl RecordStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool =
            connect_with_settings(&config.url, config.max_connections, config.timeout_secs).await?;
        info!(
            event_name = "system.store.connected",
            max_connections = config.max_connections,
            "record store connected"
        );
        Ok(Self { pool })
    }

    pub fn from_pool(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), MigrateError> {
        migrations::run_pending(&self.pool).await?;
        info!(event_name = "system.store.migrated", "record store migrations applied");
        Ok(())
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn customers(&self) -> Arc<dyn CustomerRepository> {
        Arc::new(SqlCustomerRepository::new(self.pool.clone()))
    }

    pub fn campaigns(&self) -> Arc<dyn CampaignRepository> {
        Arc::new(SqlCampaignRepository::new(self.pool.clone()))
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!(event_name = "system.store.closed", "record store closed");
    }
}

#[cfg(test)]
mod tests {
    use reach_core::config::DatabaseConfig;

    use super::RecordStore;

    fn memory_config() -> DatabaseConfig {
        DatabaseConfig { url: "sqlite::memory:".to_string(), max_connections: 1, timeout_secs: 5 }
    }

    #[tokio::test]
    async fn store_lifecycle_connect_migrate_close() {
        let store = RecordStore::connect(&memory_config()).await.expect("connect");
        store.migrate().await.expect("migrate");

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customer")
            .fetch_one(store.pool())
            .await
            .expect("query customer table");
        assert_eq!(count, 0);

        store.close().await;
        assert!(store.pool().is_closed());
    }

    #[tokio::test]
    async fn migrate_is_idempotent() {
        let store = RecordStore::connect(&memory_config()).await.expect("connect");
        store.migrate().await.expect("first migrate");
        store.migrate().await.expect("second migrate");
    }
}

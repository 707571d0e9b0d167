//! PostgreSQL storage adapter implementation

pub mod config;
pub mod migrations;
pub mod overview;
pub mod spatial_ref;

pub use config::{ConfigError, PoolConfig, PostgresConfig};
pub use migrations::{MigrationError, MigrationManager, MigrationStatus};

use explorer_core::error::{ExplorerError, Result};
use sqlx::{postgres::PgPoolOptions, PgPool};

/// PostgreSQL storage adapter
///
/// Persists period overviews in `time_overview` and resolves SRID names from
/// PostGIS `spatial_ref_sys`.
pub struct PostgresStore {
    pool: PgPool,
    config: PostgresConfig,
    target_srid: u32,
}

impl PostgresStore {
    /// Connect with the given configuration
    pub async fn new(config: PostgresConfig) -> Result<Self> {
        config.validate().map_err(|e| ExplorerError::ConfigInvalid {
            key: "database_url".to_string(),
            reason: e.to_string(),
        })?;

        let pool = PgPoolOptions::new()
            .min_connections(config.pool.min_connections)
            .max_connections(config.pool.max_connections)
            .acquire_timeout(config.pool.acquire_timeout)
            .idle_timeout(config.pool.idle_timeout)
            .connect(&config.database_url)
            .await
            .map_err(|e| ExplorerError::Persistence(format!("Failed to connect to database: {}", e)))?;

        let store = Self { pool, config, target_srid: 4326 };
        store.health_check().await?;

        if store.config.auto_migrate {
            store.run_migrations().await?;
        }

        tracing::info!(
            max_connections = store.config.pool.max_connections,
            "Connected to PostgreSQL"
        );
        Ok(store)
    }

    /// SRID reported as the footprint target
    pub fn with_target_srid(mut self, srid: u32) -> Self {
        self.target_srid = srid;
        self
    }

    /// Run all pending migrations
    pub async fn run_migrations(&self) -> Result<()> {
        MigrationManager::new(self.pool.clone())
            .run_migrations()
            .await
            .map_err(|e| ExplorerError::Persistence(format!("Migration failed: {}", e)))
    }

    /// Check migration status
    pub async fn migration_status(&self) -> Result<Vec<MigrationStatus>> {
        MigrationManager::new(self.pool.clone()).check_status().await.map_err(|e| {
            ExplorerError::Persistence(format!("Failed to check migration status: {}", e))
        })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Perform a health check on the database connection
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ExplorerError::Persistence(format!("Health check failed: {}", e)))?;
        Ok(())
    }
}

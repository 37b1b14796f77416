use std::sync::Arc;

use clientele_core::config::{AppConfig, ConfigError, LoadOptions, SeedMode, StorageBackend};
use clientele_core::customer::{CustomerDao, CustomerService};
use clientele_core::{seed, ApplicationError};
use clientele_db::{connect, migrations, DbPool, InMemoryCustomerDao, SqlCustomerDao};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    /// `None` when the in-memory backend is configured.
    pub db_pool: Option<DbPool>,
    pub customer_service: CustomerService,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("customer seeding failed: {0}")]
    Seed(#[source] ApplicationError),
}

#[cfg(test)]
pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        storage_backend = ?config.storage.backend,
        "starting application bootstrap"
    );

    let (db_pool, dao): (Option<DbPool>, Arc<dyn CustomerDao>) = match config.storage.backend {
        StorageBackend::Sqlite => {
            let pool = connect(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
            info!(
                event_name = "system.bootstrap.database_connected",
                correlation_id = "bootstrap",
                "database connection established"
            );

            migrations::run_pending(&pool).await.map_err(BootstrapError::Migration)?;
            info!(
                event_name = "system.bootstrap.migrations_applied",
                correlation_id = "bootstrap",
                "database migrations applied"
            );

            (Some(pool.clone()), Arc::new(SqlCustomerDao::new(pool)))
        }
        StorageBackend::Memory => (None, Arc::new(InMemoryCustomerDao::default())),
    };

    let customer_service = CustomerService::new(dao);

    if config.seed.mode != SeedMode::None {
        let requests = seed::plan(&config.seed, &mut rand::thread_rng());
        let report = seed::seed_customers(&customer_service, requests)
            .await
            .map_err(BootstrapError::Seed)?;
        info!(
            event_name = "system.bootstrap.seeded",
            correlation_id = "bootstrap",
            seed_mode = ?config.seed.mode,
            inserted = report.inserted,
            skipped = report.skipped,
            "startup customers seeded"
        );
    }

    Ok(Application { config, db_pool, customer_service })
}

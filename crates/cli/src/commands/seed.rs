use std::sync::Arc;

use clientele_core::config::{SeedConfig, SeedMode, StorageBackend};
use clientele_core::{seed, CustomerService, SeedReport};
use clientele_db::{connect, migrations, SqlCustomerDao};

use crate::commands::{
    current_thread_runtime, load_config, CommandResult, EXIT_CONFIG, EXIT_DB_CONNECTIVITY,
    EXIT_MIGRATION, EXIT_SEED,
};

#[derive(Debug, Clone, Default)]
pub struct SeedArgs {
    pub mode: Option<SeedMode>,
    pub count: Option<u32>,
}

pub fn run(args: SeedArgs) -> CommandResult {
    let config = match load_config("seed") {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let seed_config = resolve_seed_config(&config.seed, &args);
    if let Err(error) = seed_config.validate() {
        return CommandResult::failure(
            "seed",
            "config_validation",
            format!("configuration issue: {error}"),
            EXIT_CONFIG,
        );
    }
    if seed_config.mode == SeedMode::None {
        return CommandResult::success("seed", "seed mode is none; nothing to insert");
    }
    if config.storage.backend == StorageBackend::Memory {
        return CommandResult::success(
            "seed",
            "in-memory storage backend configured; nothing to seed",
        );
    }

    let runtime = match current_thread_runtime("seed") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = connect(&config.database)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), EXIT_DB_CONNECTIVITY))?;
        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), EXIT_MIGRATION))?;

        let service = CustomerService::new(Arc::new(SqlCustomerDao::new(pool.clone())));
        let requests = seed::plan(&seed_config, &mut rand::thread_rng());
        let outcome = seed::seed_customers(&service, requests)
            .await
            .map_err(|error| ("seed", error.to_string(), EXIT_SEED));

        pool.close().await;
        outcome
    });

    match result {
        Ok(report) => CommandResult::success("seed", render_report(seed_config.mode, &report)),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}

/// Command-line flags win over configuration; a configured `none` falls back to `fixed`.
fn resolve_seed_config(configured: &SeedConfig, args: &SeedArgs) -> SeedConfig {
    let mode = args.mode.unwrap_or(match configured.mode {
        SeedMode::None => SeedMode::Fixed,
        mode => mode,
    });

    SeedConfig {
        mode,
        count: args.count.unwrap_or(configured.count),
        email_domain: configured.email_domain.clone(),
    }
}

fn render_report(mode: SeedMode, report: &SeedReport) -> String {
    let mode = match mode {
        SeedMode::None => "none",
        SeedMode::Fixed => "fixed",
        SeedMode::Random => "random",
    };
    format!(
        "seeded {mode} customers: inserted={} skipped={}",
        report.inserted, report.skipped
    )
}

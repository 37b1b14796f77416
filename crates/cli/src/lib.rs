pub mod commands;

use clap::{Parser, Subcommand};
use clientele_core::config::SeedMode;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "clientele",
    about = "Clientele operator CLI",
    long_about = "Operate the Clientele customer registry: migrations, demo data, config inspection, and readiness checks.",
    after_help = "Examples:\n  clientele migrate\n  clientele seed --mode random --count 5\n  clientele doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Insert demo customers; existing emails are skipped")]
    Seed {
        #[arg(long, help = "Seed mode: fixed or random (defaults to the configured mode, else fixed)")]
        mode: Option<SeedMode>,
        #[arg(long, help = "Number of random customers to generate")]
        count: Option<u32>,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution"
    )]
    Config,
    #[command(about = "Validate config, DB connectivity, and customer schema readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed { mode, count } => {
            commands::seed::run(commands::seed::SeedArgs { mode, count })
        }
        Command::Config => commands::config::run(),
        Command::Doctor { json } => commands::doctor::run(json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

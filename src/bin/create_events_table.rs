//! Create the events table.
//!
//! Reads the database URI from a YAML config file and creates the `events`
//! table if it does not exist. Exits non-zero on any failure.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use events_schema::utils::bootstrap::init_tracing;
use events_schema::{Config, EnsureOutcome};

/// Create the events table if it does not already exist.
#[derive(Parser, Debug)]
#[command(name = "create-events-table", about = "Create the events table")]
struct Cli {
    /// Path to config file.
    #[arg(short, long)]
    config: PathBuf,
}

async fn create_events_table(cli: &Cli) -> Result<EnsureOutcome, Box<dyn std::error::Error>> {
    let config = Config::load(&cli.config)?;
    info!(config = %cli.config.display(), "Configuration loaded");

    Ok(events_schema::run(&config).await?)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match create_events_table(&cli).await {
        Ok(EnsureOutcome::Created) => info!("Events table schema initialized"),
        Ok(EnsureOutcome::AlreadyPresent) => info!("Events table already present"),
        Err(err) => {
            error!(error = %err, config = %cli.config.display(), "Failed to create events table");
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}

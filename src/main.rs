//! Main entry point for the habit calendar server
//!
//! This file sets up logging, parses command line arguments, and starts the
//! HTTP server in front of the file and SQLite habit stores.

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use habit_calendar::{AppConfig, Args, HabitCalendarServer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // RUST_LOG wins over the verbosity flags when set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting habit calendar server");

    let config = AppConfig::from_args(&args)?;
    info!("Using database at: {}", config.database.display());
    info!("Using habit document at: {}", config.document.display());

    let server = HabitCalendarServer::new(&config)?;
    server.run(&config).await?;

    info!("Habit calendar server shutdown complete");
    Ok(())
}

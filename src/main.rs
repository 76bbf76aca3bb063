//! Meetup Announcer - posts new Meetup events to a chat channel
//!
#![doc = "Main entry point for the meetup-announcer binary."]

use anyhow::Result;

use meetup_announcer::cli::{Cli, Commands};
use meetup_announcer::commands;
use meetup_announcer::config::Config;
use meetup_announcer::logging::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    init_logging(&config.logging)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Serve { dry_run } => {
            tracing::info!(dry_run = dry_run, "Starting announcer");
            commands::serve::run_serve(config, dry_run).await?;
            Ok(())
        }
        Commands::Check { dry_run } => {
            tracing::info!(dry_run = dry_run, "Running single check");
            commands::check::run_check(config, dry_run).await?;
            Ok(())
        }
        Commands::Upcoming { json } => {
            tracing::debug!(json = json, "Listing upcoming events");
            commands::upcoming::run_upcoming(config, json).await?;
            Ok(())
        }
    }
}

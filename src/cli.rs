//! Command-line interface definition
//!
//! This module defines the CLI structure using clap's derive API.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Meetup Announcer - posts new Meetup events to a chat channel
#[derive(Parser, Debug, Clone)]
#[command(name = "meetup-announcer")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "ANNOUNCER_CONFIG")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    /// Also append logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Listen for chat commands and announce new events on a timer
    Serve {
        /// Log formatted messages instead of posting them
        #[arg(long)]
        dry_run: bool,
    },

    /// Run a single check-and-announce cycle and exit
    Check {
        /// Log formatted messages instead of posting them
        #[arg(long)]
        dry_run: bool,
    },

    /// Print all upcoming events without touching the watermark
    Upcoming {
        /// Print events as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: None,
            verbose: false,
            json_logs: false,
            log_file: None,
            command: Commands::Upcoming { json: false },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default() {
        let cli = Cli::default();
        assert_eq!(cli.config, None);
        assert!(!cli.verbose);
        assert_eq!(cli.command, Commands::Upcoming { json: false });
    }

    #[test]
    fn test_parse_serve_dry_run() {
        let cli = Cli::try_parse_from(["meetup-announcer", "serve", "--dry-run"]).unwrap();
        assert_eq!(cli.command, Commands::Serve { dry_run: true });
    }

    #[test]
    fn test_parse_check_with_config() {
        let cli = Cli::try_parse_from([
            "meetup-announcer",
            "--config",
            "custom.yaml",
            "--verbose",
            "check",
        ])
        .unwrap();
        assert_eq!(cli.config.as_deref(), Some("custom.yaml"));
        assert!(cli.verbose);
        assert_eq!(cli.command, Commands::Check { dry_run: false });
    }

    #[test]
    fn test_parse_upcoming_json() {
        let cli = Cli::try_parse_from(["meetup-announcer", "upcoming", "--json"]).unwrap();
        assert_eq!(cli.command, Commands::Upcoming { json: true });
    }

    #[test]
    fn test_parse_requires_subcommand() {
        assert!(Cli::try_parse_from(["meetup-announcer"]).is_err());
    }
}

//! JobScout Daemon
//!
//! Scheduled job-search orchestration: fetches postings from an
//! aggregation service, scores them against a candidate profile with a
//! reasoning service, and stores tiered results locally.
//!
//! # Usage
//!
//! ```bash
//! jobscoutd start [--foreground] [--key sk-...]
//! jobscoutd run [--tenant NAME] [--profile ID] [--key sk-...]
//! jobscoutd stop
//! jobscoutd status
//! jobscoutd purge [--days N]
//! jobscoutd config init
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/jobscout/config.toml)
//! 3. Environment variables (JOBSCOUT_*)
//! 4. CLI flags
//!
//! Scoring keys are never part of the configuration: they are supplied
//! at runtime, held in memory, and expire after the vault TTL.

use anyhow::Result;
use clap::Parser;

use scout_daemon::{
    config_init, purge, run_once, show_status, start_daemon, stop_daemon, Cli, Commands,
    ConfigCommands,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Start {
            foreground,
            db_path,
            tenant,
            key,
        } => {
            start_daemon(
                cli.config.as_deref(),
                foreground,
                db_path.as_deref(),
                cli.log_level.as_deref(),
                &tenant,
                key,
            )
            .await?;
        }
        Commands::Stop => {
            stop_daemon()?;
        }
        Commands::Status { tenant, db_path } => {
            show_status(cli.config.as_deref(), &tenant, db_path.as_deref())?;
        }
        Commands::Run {
            tenant,
            profile,
            key,
            db_path,
        } => {
            run_once(
                cli.config.as_deref(),
                &tenant,
                profile.as_deref(),
                key,
                db_path.as_deref(),
                cli.log_level.as_deref(),
            )
            .await?;
        }
        Commands::Purge { days, db_path } => {
            purge(cli.config.as_deref(), days, db_path.as_deref())?;
        }
        Commands::Config { command } => match command {
            ConfigCommands::Init { path, force } => {
                config_init(path.as_deref(), force)?;
            }
        },
    }

    Ok(())
}

//! CLI argument parsing for jobscoutd.

use clap::{Parser, Subcommand};

/// JobScout Daemon
///
/// Scheduled job-search orchestration: fetches postings, scores them
/// against a candidate profile, and stores tiered results.
#[derive(Parser, Debug)]
#[command(name = "jobscoutd")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/jobscout/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Daemon commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the daemon: restore schedules and fire runs on their intervals
    Start {
        /// Run in foreground (don't daemonize)
        #[arg(short, long)]
        foreground: bool,

        /// Override database path
        #[arg(long)]
        db_path: Option<String>,

        /// Tenant the --key credential belongs to
        #[arg(short, long, default_value = "default")]
        tenant: String,

        /// Scoring key to load into the vault at startup (sk-...);
        /// held in memory only, expires after the vault TTL
        #[arg(short, long)]
        key: Option<String>,
    },

    /// Stop the running daemon
    Stop,

    /// Show daemon liveness and storage summary
    Status {
        /// Tenant to summarize
        #[arg(short, long, default_value = "default")]
        tenant: String,

        /// Override database path
        #[arg(long)]
        db_path: Option<String>,
    },

    /// Trigger one run now and print the summary
    Run {
        /// Tenant to run for
        #[arg(short, long, default_value = "default")]
        tenant: String,

        /// Profile id (defaults to the tenant's active profile)
        #[arg(short, long)]
        profile: Option<String>,

        /// Scoring key for this run (sk-...); never persisted
        #[arg(short, long)]
        key: Option<String>,

        /// Override database path
        #[arg(long)]
        db_path: Option<String>,
    },

    /// Delete runs and postings older than the retention window
    Purge {
        /// Retention window in days (default from config)
        #[arg(short, long)]
        days: Option<u32>,

        /// Override database path
        #[arg(long)]
        db_path: Option<String>,
    },

    /// Configuration helpers
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Write a default config file
    Init {
        /// Destination (default: ~/.config/jobscout/config.toml)
        #[arg(long)]
        path: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

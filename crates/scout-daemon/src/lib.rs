//! JobScout daemon library exports.
//!
//! This crate provides the `jobscoutd` CLI binary.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (start, stop, status, run, purge, config)

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands, ConfigCommands};
pub use commands::{config_init, purge, run_once, show_status, start_daemon, stop_daemon};

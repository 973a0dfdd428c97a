//! Command implementations for jobscoutd.
//!
//! Handles:
//! - start: load config, open storage, restore schedules, run until signalled
//! - stop: signal the running daemon (via PID file)
//! - status: PID liveness plus a storage summary
//! - run: one-shot manual trigger
//! - purge: retention sweep
//! - config init: write a default config file

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use secrecy::SecretString;
use tokio::signal;
use tracing::{info, warn};

use scout_engine::{ApiEvaluator, ScoringEngine};
use scout_runner::RunManager;
use scout_scheduler::{create_purge_job, PurgeJobConfig, SchedulerService};
use scout_service::{JobScoutService, ServiceError};
use scout_source::{Fetcher, HttpPostingSource};
use scout_storage::Storage;
use scout_types::Settings;
use scout_vault::KeyVault;

/// Get the PID file path
fn pid_file_path() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| {
            // Prefer the runtime dir where one exists, else the cache dir
            #[cfg(unix)]
            {
                dirs.runtime_dir()
                    .map(|p| p.to_path_buf())
                    .unwrap_or_else(|| dirs.cache_dir().to_path_buf())
            }
            #[cfg(not(unix))]
            {
                dirs.cache_dir().to_path_buf()
            }
        })
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("jobscout")
        .join("daemon.pid")
}

/// Write PID to file
fn write_pid_file() -> Result<()> {
    let pid_path = pid_file_path();
    if let Some(parent) = pid_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&pid_path, std::process::id().to_string())?;
    info!("Wrote PID file: {:?}", pid_path);
    Ok(())
}

/// Remove PID file
fn remove_pid_file() {
    let pid_path = pid_file_path();
    if pid_path.exists() {
        if let Err(e) = fs::remove_file(&pid_path) {
            warn!("Failed to remove PID file: {}", e);
        } else {
            info!("Removed PID file");
        }
    }
}

/// Read PID from file
fn read_pid_file() -> Option<u32> {
    let pid_path = pid_file_path();
    fs::read_to_string(&pid_path)
        .ok()
        .and_then(|s| s.trim().parse().ok())
}

/// Check if a process is running
#[cfg(unix)]
fn is_process_running(pid: u32) -> bool {
    // Signal 0 checks process existence without touching it
    unsafe { libc::kill(pid as i32, 0) == 0 }
}

#[cfg(not(unix))]
fn is_process_running(_pid: u32) -> bool {
    // No cheap liveness probe on this platform; trust the PID file
    true
}

fn init_logging(settings: &Settings) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

fn apply_overrides(
    settings: &mut Settings,
    db_path_override: Option<&str>,
    log_level_override: Option<&str>,
) {
    if let Some(db_path) = db_path_override {
        settings.db_path = db_path.to_string();
    }
    if let Some(log_level) = log_level_override {
        settings.log_level = log_level.to_string();
    }
}

/// The full component stack behind the service facade.
struct Components {
    storage: Arc<Storage>,
    scheduler: Arc<SchedulerService>,
    service: JobScoutService,
}

async fn build_components(settings: &Settings) -> Result<Components> {
    let db_path = settings.expanded_db_path();
    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent).context("Failed to create database directory")?;
    }
    let storage = Arc::new(Storage::open(&db_path).with_context(|| {
        format!(
            "Failed to open storage at {:?} (is the daemon running?)",
            db_path
        )
    })?);

    let vault = Arc::new(KeyVault::with_ttl(Duration::from_secs(
        settings.vault.ttl_hours * 3600,
    )));
    let source = Arc::new(HttpPostingSource::new(&settings.source)?);
    let evaluator = Arc::new(ApiEvaluator::new(&settings.scoring)?);

    let fetcher = Fetcher::new(source, &settings.source);
    let engine = ScoringEngine::new(evaluator.clone(), &settings.scoring);
    let runner = Arc::new(RunManager::new(
        storage.clone(),
        vault.clone(),
        fetcher,
        engine,
    ));

    let scheduler = Arc::new(SchedulerService::new(&settings.scheduler, runner.clone()).await?);
    let service = JobScoutService::new(
        storage.clone(),
        vault,
        runner,
        scheduler.clone(),
        evaluator,
    );

    Ok(Components {
        storage,
        scheduler,
        service,
    })
}

async fn wait_for_shutdown() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down...");
        }
    }
}

/// Start the daemon.
///
/// 1. Load configuration (defaults -> file -> env -> CLI)
/// 2. Open storage and build the component stack
/// 3. Restore schedules for active profiles with a recurring interval
/// 4. Register the retention purge job and start the scheduler
/// 5. Run until SIGINT/SIGTERM
pub async fn start_daemon(
    config_path: Option<&str>,
    foreground: bool,
    db_path_override: Option<&str>,
    log_level_override: Option<&str>,
    tenant: &str,
    key: Option<String>,
) -> Result<()> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;
    apply_overrides(&mut settings, db_path_override, log_level_override);

    init_logging(&settings)?;

    info!("jobscoutd starting...");
    info!("  Database path: {}", settings.db_path);
    info!("  Log level: {}", settings.log_level);
    info!("  Retention: {} days", settings.retention.purge_days);

    if !foreground {
        warn!("Background mode not implemented, running in foreground");
        warn!("Use a process manager (systemd, launchd) for background operation");
    }

    let components = build_components(&settings).await?;

    if let Some(key) = key {
        components
            .service
            .submit_credential(tenant, SecretString::from(key))
            .await
            .context("Startup key was rejected")?;
    }

    let restored = components.service.restore_schedules().await?;
    info!("Restored {} schedule(s)", restored);

    create_purge_job(
        &components.scheduler,
        components.storage.clone(),
        PurgeJobConfig {
            retain_days: settings.retention.purge_days,
            ..Default::default()
        },
    )
    .await?;

    components.scheduler.start().await?;
    write_pid_file()?;

    wait_for_shutdown().await;

    if let Err(e) = components.scheduler.stop().await {
        warn!("Scheduler stop failed: {}", e);
    }
    remove_pid_file();
    info!("jobscoutd stopped");
    Ok(())
}

/// Stop the running daemon by sending SIGTERM.
pub fn stop_daemon() -> Result<()> {
    let pid = read_pid_file().context("No PID file found - daemon may not be running")?;

    if !is_process_running(pid) {
        remove_pid_file();
        anyhow::bail!("Daemon not running (stale PID file removed)");
    }

    #[cfg(unix)]
    {
        unsafe {
            if libc::kill(pid as i32, libc::SIGTERM) != 0 {
                anyhow::bail!("Failed to send SIGTERM to daemon");
            }
        }
        println!("Sent SIGTERM to daemon (PID {})", pid);
    }

    #[cfg(not(unix))]
    {
        anyhow::bail!("Stop command not implemented on this platform");
    }

    Ok(())
}

/// Show daemon liveness and a storage summary.
pub fn show_status(
    config_path: Option<&str>,
    tenant: &str,
    db_path_override: Option<&str>,
) -> Result<()> {
    match read_pid_file() {
        Some(pid) if is_process_running(pid) => {
            println!("jobscoutd is running (PID {})", pid);
        }
        Some(pid) => {
            println!(
                "jobscoutd is NOT running (stale PID {} in {:?})",
                pid,
                pid_file_path()
            );
        }
        None => {
            println!("jobscoutd is NOT running (no PID file)");
        }
    }

    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;
    apply_overrides(&mut settings, db_path_override, None);

    let db_path = settings.expanded_db_path();
    match Storage::open(&db_path) {
        Ok(storage) => {
            let stats = storage.get_stats()?;
            println!("Storage: {:?}", db_path);
            println!("  Runs:     {}", stats.run_count);
            println!("  Postings: {}", stats.posting_count);
            println!("  Profiles: {}", stats.profile_count);

            match storage.latest_run(tenant)? {
                Some(run) => {
                    println!("Last run for '{}': {} ({})", tenant, run.status, run.run_id);
                    println!(
                        "  Found {} / scored {} / {} tokens",
                        run.postings_found, run.postings_scored, run.tokens_used
                    );
                    if let Some(message) = &run.error_message {
                        println!("  Note: {}", message);
                    }
                }
                None => println!("Last run for '{}': none", tenant),
            }
        }
        Err(e) => {
            println!("Storage unavailable: {} (locked by a running daemon?)", e);
        }
    }

    Ok(())
}

/// Trigger one run and print the summary.
pub async fn run_once(
    config_path: Option<&str>,
    tenant: &str,
    profile_id: Option<&str>,
    key: Option<String>,
    db_path_override: Option<&str>,
    log_level_override: Option<&str>,
) -> Result<()> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;
    apply_overrides(&mut settings, db_path_override, log_level_override);
    init_logging(&settings)?;

    let components = build_components(&settings).await?;

    if let Some(key) = key {
        components
            .service
            .submit_credential(tenant, SecretString::from(key))
            .await
            .context("Submitted key was rejected")?;
    }

    let summary = match components
        .service
        .trigger_manual_run(tenant, profile_id)
        .await
    {
        Ok(summary) => summary,
        Err(e @ ServiceError::CredentialMissing(_)) => {
            anyhow::bail!("{} (pass --key sk-... to score this run)", e);
        }
        Err(e) => return Err(e.into()),
    };

    println!("Run {} finished: {}", summary.run_id, summary.status);
    println!("  Postings found:  {}", summary.postings_found);
    println!("  Postings scored: {}", summary.postings_scored);
    println!("  Tokens used:     {}", summary.tokens_used);
    Ok(())
}

/// Delete runs and postings older than the retention window.
pub fn purge(
    config_path: Option<&str>,
    days_override: Option<u32>,
    db_path_override: Option<&str>,
) -> Result<()> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;
    apply_overrides(&mut settings, db_path_override, None);

    let days = days_override.unwrap_or(settings.retention.purge_days);
    let db_path = settings.expanded_db_path();
    let storage = Storage::open(&db_path).with_context(|| {
        format!(
            "Failed to open storage at {:?} (is the daemon running?)",
            db_path
        )
    })?;

    let cutoff = Utc::now() - chrono::Duration::days(i64::from(days));
    let stats = storage.purge_all_older_than(cutoff.timestamp_millis())?;
    println!(
        "Purged {} run(s) and {} posting(s) older than {} day(s)",
        stats.runs_deleted, stats.postings_deleted, days
    );
    Ok(())
}

fn default_config_file() -> PathBuf {
    directories::ProjectDirs::from("", "", "jobscout")
        .map(|p| p.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
        .join("config.toml")
}

/// Write a default config file.
pub fn config_init(path_override: Option<&str>, force: bool) -> Result<()> {
    let dest = match path_override {
        Some(path) => PathBuf::from(path),
        None => default_config_file(),
    };

    if dest.exists() && !force {
        anyhow::bail!("{:?} already exists (pass --force to overwrite)", dest);
    }

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    let rendered =
        toml::to_string_pretty(&Settings::default()).context("Failed to render default config")?;
    fs::write(&dest, rendered).with_context(|| format!("Failed to write {:?}", dest))?;
    println!("Wrote default config to {:?}", dest);
    Ok(())
}

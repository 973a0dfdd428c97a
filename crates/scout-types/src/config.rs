//! Configuration loading for jobscout.
//!
//! Layered precedence: built-in defaults -> config file
//! (~/.config/jobscout/config.toml) -> CLI-specified file -> JOBSCOUT_*
//! environment variables. CLI flags are applied by the caller afterwards.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ScoutError;

/// Posting-source fetch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSettings {
    /// Provider endpoint.
    #[serde(default = "default_source_base_url")]
    pub base_url: String,

    /// Fetch attempts per (term, location) slice before giving up.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Backoff grows as base^attempt seconds between attempts.
    #[serde(default = "default_backoff_base")]
    pub backoff_base: f64,

    /// Per-request timeout in seconds.
    #[serde(default = "default_source_timeout")]
    pub request_timeout_secs: u64,

    /// Results requested per slice.
    #[serde(default = "default_results_per_slice")]
    pub results_per_slice: u32,

    /// Optional HTTP proxy for provider requests.
    #[serde(default)]
    pub proxy_url: Option<String>,
}

fn default_source_base_url() -> String {
    "https://api.jobdex.io/v1".to_string()
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_base() -> f64 {
    2.0
}

fn default_source_timeout() -> u64 {
    30
}

fn default_results_per_slice() -> u32 {
    50
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            base_url: default_source_base_url(),
            max_retries: default_max_retries(),
            backoff_base: default_backoff_base(),
            request_timeout_secs: default_source_timeout(),
            results_per_slice: default_results_per_slice(),
            proxy_url: None,
        }
    }
}

impl SourceSettings {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_retries == 0 {
            return Err("max_retries must be >= 1".to_string());
        }
        if self.backoff_base < 1.0 {
            return Err(format!(
                "backoff_base must be >= 1.0, got {}",
                self.backoff_base
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be > 0".to_string());
        }
        Ok(())
    }
}

/// Reasoning-service (scoring) settings.
///
/// The API key is deliberately absent here: keys are per-tenant, live in
/// the key vault only, and must never land in a config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringSettings {
    /// Model used for evaluations.
    #[serde(default = "default_scoring_model")]
    pub model: String,

    /// API base URL (for custom endpoints).
    #[serde(default = "default_scoring_base_url")]
    pub base_url: String,

    /// Per-call timeout in seconds.
    #[serde(default = "default_scoring_timeout")]
    pub timeout_secs: u64,

    /// Transient-failure retries per evaluation call.
    #[serde(default = "default_scoring_retries")]
    pub max_retries: u32,

    /// Posting descriptions are cut to this many characters in prompts.
    #[serde(default = "default_description_budget")]
    pub description_budget: usize,
}

fn default_scoring_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_scoring_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_scoring_timeout() -> u64 {
    60
}

fn default_scoring_retries() -> u32 {
    3
}

fn default_description_budget() -> usize {
    2_000
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            model: default_scoring_model(),
            base_url: default_scoring_base_url(),
            timeout_secs: default_scoring_timeout(),
            max_retries: default_scoring_retries(),
            description_budget: default_description_budget(),
        }
    }
}

impl ScoringSettings {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.description_budget == 0 {
            return Err("description_budget must be > 0".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be > 0".to_string());
        }
        Ok(())
    }
}

/// Key vault settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultSettings {
    /// Credential time-to-live in hours.
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: u64,
}

fn default_ttl_hours() -> u64 {
    24
}

impl Default for VaultSettings {
    fn default() -> Self {
        Self {
            ttl_hours: default_ttl_hours(),
        }
    }
}

impl VaultSettings {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.ttl_hours == 0 {
            return Err("ttl_hours must be > 0".to_string());
        }
        Ok(())
    }
}

/// Scheduler settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerSettings {
    /// Grace period for in-flight jobs at shutdown, in seconds.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

fn default_shutdown_timeout() -> u64 {
    30
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            shutdown_timeout_secs: default_shutdown_timeout(),
        }
    }
}

/// Retention settings for stored runs and postings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionSettings {
    /// Records older than this many days are eligible for purge.
    #[serde(default = "default_purge_days")]
    pub purge_days: u32,
}

fn default_purge_days() -> u32 {
    30
}

impl Default for RetentionSettings {
    fn default() -> Self {
        Self {
            purge_days: default_purge_days(),
        }
    }
}

impl RetentionSettings {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.purge_days == 0 {
            return Err("purge_days must be > 0".to_string());
        }
        Ok(())
    }
}

/// Main application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Path to RocksDB storage directory.
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub source: SourceSettings,

    #[serde(default)]
    pub scoring: ScoringSettings,

    #[serde(default)]
    pub vault: VaultSettings,

    #[serde(default)]
    pub scheduler: SchedulerSettings,

    #[serde(default)]
    pub retention: RetentionSettings,
}

fn default_db_path() -> String {
    ProjectDirs::from("", "", "jobscout")
        .map(|p| p.data_local_dir().join("db"))
        .unwrap_or_else(|| PathBuf::from("./data"))
        .to_string_lossy()
        .to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            log_level: default_log_level(),
            source: SourceSettings::default(),
            scoring: ScoringSettings::default(),
            vault: VaultSettings::default(),
            scheduler: SchedulerSettings::default(),
            retention: RetentionSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/jobscout/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (JOBSCOUT_*)
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, ScoutError> {
        let config_dir = ProjectDirs::from("", "", "jobscout")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("db_path", default_db_path())
            .map_err(|e| ScoutError::Config(e.to_string()))?
            .set_default("log_level", default_log_level())
            .map_err(|e| ScoutError::Config(e.to_string()))?
            .set_default("source.base_url", default_source_base_url())
            .map_err(|e| ScoutError::Config(e.to_string()))?
            .set_default("source.max_retries", default_max_retries() as i64)
            .map_err(|e| ScoutError::Config(e.to_string()))?
            .set_default("source.backoff_base", default_backoff_base())
            .map_err(|e| ScoutError::Config(e.to_string()))?
            .set_default("scoring.model", default_scoring_model())
            .map_err(|e| ScoutError::Config(e.to_string()))?
            .set_default("scoring.base_url", default_scoring_base_url())
            .map_err(|e| ScoutError::Config(e.to_string()))?
            .set_default("vault.ttl_hours", default_ttl_hours() as i64)
            .map_err(|e| ScoutError::Config(e.to_string()))?
            .set_default("retention.purge_days", default_purge_days() as i64)
            .map_err(|e| ScoutError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Format: JOBSCOUT_DB_PATH, JOBSCOUT_SOURCE_MAX_RETRIES, etc.
        builder = builder.add_source(
            Environment::with_prefix("JOBSCOUT")
                .separator("_")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| ScoutError::Config(e.to_string()))?;

        let settings: Settings = config
            .try_deserialize()
            .map_err(|e| ScoutError::Config(e.to_string()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Validate all sections, collapsing the first failure into an error.
    pub fn validate(&self) -> Result<(), ScoutError> {
        self.source
            .validate()
            .map_err(|e| ScoutError::Config(format!("source: {}", e)))?;
        self.scoring
            .validate()
            .map_err(|e| ScoutError::Config(format!("scoring: {}", e)))?;
        self.vault
            .validate()
            .map_err(|e| ScoutError::Config(format!("vault: {}", e)))?;
        self.retention
            .validate()
            .map_err(|e| ScoutError::Config(format!("retention: {}", e)))?;
        Ok(())
    }

    /// Expand ~ in db_path to the actual home directory.
    pub fn expanded_db_path(&self) -> PathBuf {
        if self.db_path.starts_with("~/") {
            if let Some(home) = std::env::var_os("HOME") {
                return PathBuf::from(home).join(&self.db_path[2..]);
            }
        }
        PathBuf::from(&self.db_path)
    }
}

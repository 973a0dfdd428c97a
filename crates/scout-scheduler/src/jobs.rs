//! Predefined maintenance jobs.
//!
//! Currently one job: the retention purge, which sweeps every tenant's
//! runs and postings and deletes records older than the retention
//! window. Profiles and credentials are never touched.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio_cron_scheduler::Job;
use tracing::{info, warn};
use uuid::Uuid;

use scout_storage::Storage;

use crate::error::SchedulerError;
use crate::scheduler::SchedulerService;

/// Configuration for the retention purge job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurgeJobConfig {
    /// Seconds between sweeps (default: 86400 = daily).
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Records older than this many days are deleted (default: 30).
    #[serde(default = "default_retain_days")]
    pub retain_days: u32,
}

fn default_interval_secs() -> u64 {
    86_400
}

fn default_retain_days() -> u32 {
    30
}

impl Default for PurgeJobConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            retain_days: default_retain_days(),
        }
    }
}

/// Register the retention purge job with the scheduler.
///
/// # Errors
///
/// Returns an error if job registration fails.
pub async fn create_purge_job(
    scheduler: &SchedulerService,
    storage: Arc<Storage>,
    config: PurgeJobConfig,
) -> Result<Uuid, SchedulerError> {
    let retain_days = config.retain_days;
    let token = scheduler.shutdown_token();

    let job = Job::new_repeated_async(
        Duration::from_secs(config.interval_secs),
        move |_job_id, _scheduler| {
            let storage = storage.clone();
            let token = token.clone();
            Box::pin(async move {
                if token.is_cancelled() {
                    return;
                }
                let cutoff = Utc::now() - chrono::Duration::days(i64::from(retain_days));
                match storage.purge_all_older_than(cutoff.timestamp_millis()) {
                    Ok(stats) => info!(
                        runs = stats.runs_deleted,
                        postings = stats.postings_deleted,
                        "Retention purge complete"
                    ),
                    Err(e) => warn!("Retention purge failed: {}", e),
                }
            })
        },
    )?;

    let job_id = scheduler.add_job(job).await?;
    info!(
        interval_secs = config.interval_secs,
        retain_days, "Registered retention purge job"
    );
    Ok(job_id)
}

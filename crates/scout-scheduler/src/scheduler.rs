//! Recurring trigger management on top of `tokio-cron-scheduler`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use scout_runner::RunManager;
use scout_types::{Interval, SchedulerSettings};

use crate::error::SchedulerError;
use crate::registry::{ScheduleEntry, ScheduleRegistry};

/// Upper bound on the shutdown grace sleep, regardless of configuration.
const MAX_SHUTDOWN_GRACE_SECS: u64 = 5;

/// Manages recurring search triggers for (tenant, profile) pairs.
///
/// Each active, non-manual profile gets one repeating trigger that fires
/// a full pipeline run. The first fire lands one full interval after
/// installation; callers wanting results sooner trigger a manual run.
/// Fired runs execute as detached tasks so a slow run never delays the
/// next tick, and a failed scheduled run surfaces through run history
/// rather than through the scheduler.
pub struct SchedulerService {
    scheduler: JobScheduler,
    runner: Arc<RunManager>,
    registry: ScheduleRegistry,
    shutdown_token: CancellationToken,
    is_running: AtomicBool,
    shutdown_timeout_secs: u64,
}

impl SchedulerService {
    /// Create a new scheduler service.
    ///
    /// Nothing fires until [`start`](Self::start) is called; triggers are
    /// installed separately via [`upsert_schedule`](Self::upsert_schedule).
    pub async fn new(
        settings: &SchedulerSettings,
        runner: Arc<RunManager>,
    ) -> Result<Self, SchedulerError> {
        let scheduler = JobScheduler::new().await?;
        Ok(Self {
            scheduler,
            runner,
            registry: ScheduleRegistry::new(),
            shutdown_token: CancellationToken::new(),
            is_running: AtomicBool::new(false),
            shutdown_timeout_secs: settings.shutdown_timeout_secs,
        })
    }

    /// Start firing installed triggers.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::AlreadyRunning` if already started.
    pub async fn start(&self) -> Result<(), SchedulerError> {
        if self.is_running.swap(true, Ordering::SeqCst) {
            return Err(SchedulerError::AlreadyRunning);
        }

        self.scheduler.start().await?;
        info!("Scheduler started");
        Ok(())
    }

    /// Stop the scheduler, giving in-flight runs a bounded grace period.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::NotRunning` if not started.
    pub async fn stop(&self) -> Result<(), SchedulerError> {
        if !self.is_running.swap(false, Ordering::SeqCst) {
            return Err(SchedulerError::NotRunning);
        }

        self.shutdown_token.cancel();

        let grace = self.shutdown_timeout_secs.min(MAX_SHUTDOWN_GRACE_SECS);
        tokio::time::sleep(Duration::from_secs(grace)).await;

        // shutdown() needs &mut; the scheduler is a handle over shared
        // state, so a clone shuts down the same instance.
        let mut scheduler = self.scheduler.clone();
        if let Err(e) = scheduler.shutdown().await {
            warn!("Error during scheduler shutdown: {}", e);
        }

        info!("Scheduler stopped");
        Ok(())
    }

    /// True between a successful `start` and the next `stop`.
    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::SeqCst)
    }

    /// Install or replace the trigger for a (tenant, profile) pair.
    ///
    /// A manual interval removes any existing trigger and installs
    /// nothing.
    pub async fn upsert_schedule(
        &self,
        tenant_id: &str,
        profile_id: &str,
        interval: Interval,
    ) -> Result<(), SchedulerError> {
        if let Some(old) = self.registry.remove(tenant_id, profile_id) {
            // The underlying scheduler may have already dropped the
            // trigger; a stale removal is not fatal.
            if let Err(e) = self.scheduler.remove(&old.job_id).await {
                warn!(
                    tenant_id,
                    profile_id, "Failed to remove replaced trigger: {}", e
                );
            }
        }

        let Some(period) = interval.period() else {
            info!(tenant_id, profile_id, "Interval is manual, no trigger installed");
            return Ok(());
        };

        let runner = self.runner.clone();
        let token = self.shutdown_token.clone();
        let tenant = tenant_id.to_string();
        let profile = profile_id.to_string();

        let job = Job::new_repeated_async(period, move |_job_id, _scheduler| {
            let runner = runner.clone();
            let token = token.clone();
            let tenant = tenant.clone();
            let profile = profile.clone();
            Box::pin(async move {
                if token.is_cancelled() {
                    return;
                }
                // Detached so a slow pipeline never delays the next tick.
                tokio::spawn(async move {
                    match runner.execute_run(&tenant, &profile).await {
                        Ok(run) => info!(
                            run_id = %run.run_id,
                            tenant_id = %tenant,
                            profile_id = %profile,
                            status = %run.status,
                            "Scheduled run finished"
                        ),
                        Err(e) => warn!(
                            tenant_id = %tenant,
                            profile_id = %profile,
                            "Scheduled run failed: {}", e
                        ),
                    }
                });
            })
        })?;

        let job_id = self.scheduler.add(job).await?;
        self.registry
            .insert(tenant_id, profile_id, ScheduleEntry::new(job_id, interval));
        info!(
            tenant_id,
            profile_id,
            interval = %interval,
            "Trigger installed"
        );
        Ok(())
    }

    /// Remove the trigger for a (tenant, profile) pair.
    ///
    /// Returns `true` if a trigger was installed.
    pub async fn remove_schedule(
        &self,
        tenant_id: &str,
        profile_id: &str,
    ) -> Result<bool, SchedulerError> {
        let Some(entry) = self.registry.remove(tenant_id, profile_id) else {
            return Ok(false);
        };

        if let Err(e) = self.scheduler.remove(&entry.job_id).await {
            warn!(tenant_id, profile_id, "Failed to remove trigger: {}", e);
        }
        info!(tenant_id, profile_id, "Trigger removed");
        Ok(true)
    }

    /// Next time the pair's trigger will fire, if one is installed.
    pub async fn next_fire_time(
        &self,
        tenant_id: &str,
        profile_id: &str,
    ) -> Result<Option<DateTime<Utc>>, SchedulerError> {
        let Some(entry) = self.registry.get(tenant_id, profile_id) else {
            return Ok(None);
        };

        let mut scheduler = self.scheduler.clone();
        Ok(scheduler.next_tick_for_job(entry.job_id).await?)
    }

    /// Number of installed triggers.
    pub fn schedule_count(&self) -> usize {
        self.registry.len()
    }

    /// Snapshot of installed triggers as (tenant, profile, entry).
    pub fn schedules(&self) -> Vec<(String, String, ScheduleEntry)> {
        self.registry.list()
    }

    /// Register a standalone maintenance job.
    ///
    /// Maintenance jobs are not tracked in the per-profile registry.
    pub(crate) async fn add_job(&self, job: Job) -> Result<Uuid, SchedulerError> {
        Ok(self.scheduler.add(job).await?)
    }

    /// Token cancelled when the scheduler stops. Jobs check it before
    /// doing work so nothing new starts during shutdown.
    pub(crate) fn shutdown_token(&self) -> CancellationToken {
        self.shutdown_token.clone()
    }
}

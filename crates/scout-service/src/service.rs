//! The caller-facing facade over the jobscout components.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use tracing::info;

use scout_engine::Evaluator;
use scout_runner::RunManager;
use scout_scheduler::SchedulerService;
use scout_storage::{PurgeStats, Storage, StorageStats};
use scout_types::{PostingStatus, Profile, Run, RunStatus, ScoredPosting};
use scout_vault::{validate_key_format, KeyVault};

use crate::error::ServiceError;
use crate::summary::{RunSummary, StatusSummary};

/// Newest runs scanned when computing data freshness.
const FRESHNESS_SCAN_LIMIT: usize = 100;

/// Single entry point for drivers of the system (the daemon, tests).
///
/// Ties the components together: manual triggers check the vault before
/// starting a run, profile saves keep schedules in sync, credential
/// submission verifies against the live reasoning service, and the
/// status summary aggregates run history, scheduler, and vault state.
pub struct JobScoutService {
    storage: Arc<Storage>,
    vault: Arc<KeyVault>,
    runner: Arc<RunManager>,
    scheduler: Arc<SchedulerService>,
    evaluator: Arc<dyn Evaluator>,
}

impl JobScoutService {
    pub fn new(
        storage: Arc<Storage>,
        vault: Arc<KeyVault>,
        runner: Arc<RunManager>,
        scheduler: Arc<SchedulerService>,
        evaluator: Arc<dyn Evaluator>,
    ) -> Self {
        Self {
            storage,
            vault,
            runner,
            scheduler,
            evaluator,
        }
    }

    // ==================== Runs ====================

    /// Trigger a run now for the named profile, or the tenant's active
    /// profile when none is named.
    ///
    /// Unlike scheduled fires, a manual trigger is rejected up front when
    /// no credential is on file: the caller is present and can fix it,
    /// so no `needs_key` run is recorded.
    pub async fn trigger_manual_run(
        &self,
        tenant_id: &str,
        profile_id: Option<&str>,
    ) -> Result<RunSummary, ServiceError> {
        if !self.vault.has(tenant_id) {
            return Err(ServiceError::CredentialMissing(tenant_id.to_string()));
        }

        let profile = match profile_id {
            Some(id) => self
                .storage
                .get_profile(tenant_id, id)?
                .ok_or_else(|| ServiceError::ProfileNotFound(id.to_string()))?,
            None => self
                .storage
                .active_profile(tenant_id)?
                .ok_or_else(|| ServiceError::NoActiveProfile(tenant_id.to_string()))?,
        };

        let run = self
            .runner
            .execute_run(tenant_id, &profile.profile_id)
            .await?;
        Ok(RunSummary::from(&run))
    }

    /// Recent runs for a tenant, newest first.
    pub fn run_history(&self, tenant_id: &str, limit: usize) -> Result<Vec<Run>, ServiceError> {
        Ok(self.storage.runs_for_tenant(tenant_id, limit)?)
    }

    // ==================== Profiles ====================

    /// Persist a profile and bring its schedule in line: active profiles
    /// with a recurring interval get a trigger, everything else has any
    /// existing trigger removed.
    pub async fn save_profile(&self, profile: &Profile) -> Result<(), ServiceError> {
        self.storage.put_profile(profile)?;

        if profile.is_active && !profile.interval.is_manual() {
            self.scheduler
                .upsert_schedule(&profile.tenant_id, &profile.profile_id, profile.interval)
                .await?;
        } else {
            self.scheduler
                .remove_schedule(&profile.tenant_id, &profile.profile_id)
                .await?;
        }
        Ok(())
    }

    pub fn get_profile(
        &self,
        tenant_id: &str,
        profile_id: &str,
    ) -> Result<Option<Profile>, ServiceError> {
        Ok(self.storage.get_profile(tenant_id, profile_id)?)
    }

    pub fn list_profiles(&self, tenant_id: &str) -> Result<Vec<Profile>, ServiceError> {
        Ok(self.storage.profiles_for_tenant(tenant_id)?)
    }

    /// Delete a profile and its trigger. Returns `true` if the profile
    /// existed.
    pub async fn delete_profile(
        &self,
        tenant_id: &str,
        profile_id: &str,
    ) -> Result<bool, ServiceError> {
        self.scheduler.remove_schedule(tenant_id, profile_id).await?;
        Ok(self.storage.delete_profile(tenant_id, profile_id)?)
    }

    /// Reinstall triggers for every stored profile that is active with a
    /// recurring interval. Called once at daemon startup; returns the
    /// number of triggers installed.
    pub async fn restore_schedules(&self) -> Result<usize, ServiceError> {
        let mut restored = 0;
        for profile in self.storage.all_profiles()? {
            if profile.is_active && !profile.interval.is_manual() {
                self.scheduler
                    .upsert_schedule(&profile.tenant_id, &profile.profile_id, profile.interval)
                    .await?;
                restored += 1;
            }
        }
        info!(restored, "Restored schedules from stored profiles");
        Ok(restored)
    }

    /// Next fire time for a (tenant, profile) pair's trigger.
    pub async fn next_scheduled_run(
        &self,
        tenant_id: &str,
        profile_id: &str,
    ) -> Result<Option<DateTime<Utc>>, ServiceError> {
        Ok(self.scheduler.next_fire_time(tenant_id, profile_id).await?)
    }

    // ==================== Credentials ====================

    /// Validate and store a reasoning-service key for a tenant.
    ///
    /// The key must pass the format check and a live verification call
    /// before it is accepted; a key that fails either is never stored.
    pub async fn submit_credential(
        &self,
        tenant_id: &str,
        key: SecretString,
    ) -> Result<(), ServiceError> {
        validate_key_format(key.expose_secret())?;

        self.evaluator
            .verify(&key)
            .await
            .map_err(|e| ServiceError::VerificationFailed(e.to_string()))?;

        self.vault.store(tenant_id, key);
        info!(tenant_id, "Credential accepted");
        Ok(())
    }

    /// Remove a tenant's credential, if present.
    pub fn clear_credential(&self, tenant_id: &str) {
        self.vault.clear(tenant_id);
        info!(tenant_id, "Credential cleared");
    }

    /// Whether a live (unexpired) credential is on file.
    pub fn credential_active(&self, tenant_id: &str) -> bool {
        self.vault.has(tenant_id)
    }

    // ==================== Postings ====================

    /// Recently scored postings for a tenant, newest first.
    pub fn recent_postings(
        &self,
        tenant_id: &str,
        limit: usize,
    ) -> Result<Vec<ScoredPosting>, ServiceError> {
        Ok(self.storage.postings_for_tenant(tenant_id, limit)?)
    }

    /// Set the review status of a stored posting. Unknown posting ids
    /// are an error.
    pub fn update_posting_status(
        &self,
        tenant_id: &str,
        record_id: &str,
        status: PostingStatus,
    ) -> Result<(), ServiceError> {
        Ok(self
            .storage
            .update_posting_status(tenant_id, record_id, status)?)
    }

    // ==================== Maintenance & status ====================

    /// Delete all tenants' runs and postings older than `days` days.
    pub fn purge_older_than(&self, days: u32) -> Result<PurgeStats, ServiceError> {
        let cutoff = Utc::now() - chrono::Duration::days(i64::from(days));
        let stats = self.storage.purge_all_older_than(cutoff.timestamp_millis())?;
        info!(
            days,
            runs = stats.runs_deleted,
            postings = stats.postings_deleted,
            "Purge finished"
        );
        Ok(stats)
    }

    /// Record counts across the whole store.
    pub fn storage_stats(&self) -> Result<StorageStats, ServiceError> {
        Ok(self.storage.get_stats()?)
    }

    /// Aggregated health for a tenant: last run, next trigger fire,
    /// credential state, trailing token usage, and data freshness.
    pub async fn status_summary(&self, tenant_id: &str) -> Result<StatusSummary, ServiceError> {
        let last_run = self.storage.latest_run(tenant_id)?;

        let next_scheduled_run = match self.storage.active_profile(tenant_id)? {
            Some(profile) => {
                self.scheduler
                    .next_fire_time(tenant_id, &profile.profile_id)
                    .await?
            }
            None => None,
        };

        let since = (Utc::now() - chrono::Duration::hours(24)).timestamp_millis();
        let tokens_last_24h = self
            .storage
            .runs_since(tenant_id, since)?
            .iter()
            .map(|run| run.tokens_used)
            .sum();

        let data_freshness_days = self
            .storage
            .runs_for_tenant(tenant_id, FRESHNESS_SCAN_LIMIT)?
            .iter()
            .find(|run| run.status == RunStatus::Completed)
            .and_then(|run| run.completed_at)
            .map(|at| (Utc::now() - at).num_days());

        Ok(StatusSummary {
            last_run: last_run.as_ref().map(RunSummary::from),
            next_scheduled_run,
            credential_active: self.vault.has(tenant_id),
            tokens_last_24h,
            data_freshness_days,
        })
    }
}

//! RocksDB wrapper for jobscout storage.
//!
//! Provides:
//! - Database open with column family setup
//! - Run history writes, with atomic finalization batches
//! - Per-tenant range reads over time-ordered keys
//! - Profile CRUD and retention purge

use rocksdb::{Direction, IteratorMode, Options, WriteBatch, DB};
use std::path::Path;
use tracing::{debug, info};

use crate::column_families::{build_cf_descriptors, CF_POSTINGS, CF_PROFILES, CF_RUNS};
use crate::error::StorageError;
use crate::keys::{PostingKey, ProfileKey, RunKey};
use scout_types::{PostingStatus, Profile, Run, ScoredPosting};

/// Counts removed by a retention purge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeStats {
    pub runs_deleted: usize,
    pub postings_deleted: usize,
}

/// Record counts for a storage instance.
#[derive(Debug, Clone, Copy, Default)]
pub struct StorageStats {
    pub run_count: usize,
    pub posting_count: usize,
    pub profile_count: usize,
}

/// Main storage interface for jobscout.
pub struct Storage {
    db: DB,
}

impl Storage {
    /// Open storage at the given path, creating it if necessary.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        info!("Opening storage at {:?}", path);

        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);
        // Universal compaction suits the append-heavy run history
        db_opts.set_compaction_style(rocksdb::DBCompactionStyle::Universal);
        db_opts.set_max_background_jobs(4);

        let cf_descriptors = build_cf_descriptors();
        let db = DB::open_cf_descriptors(&db_opts, path, cf_descriptors)?;

        Ok(Self { db })
    }

    fn cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily, StorageError> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StorageError::ColumnFamilyNotFound(name.to_string()))
    }

    // ==================== Runs ====================

    /// Write a run record, overwriting any prior version of the same run.
    ///
    /// Called once when the run starts (status `running`) so an operator
    /// can observe in-flight runs, and again by [`finalize_run`] with the
    /// terminal state.
    ///
    /// [`finalize_run`]: Storage::finalize_run
    pub fn put_run(&self, run: &Run) -> Result<(), StorageError> {
        let cf = self.cf(CF_RUNS)?;
        let key = RunKey::from_run_id(&run.tenant_id, &run.run_id)?;
        self.db.put_cf(&cf, key.to_bytes(), run.to_bytes()?)?;
        debug!(run_id = %run.run_id, status = %run.status, "Stored run");
        Ok(())
    }

    /// Commit a finished run and its scored postings in one atomic batch.
    ///
    /// The terminal run record and every posting land together or not at
    /// all, so the run's status is always a truthful summary of what was
    /// persisted.
    pub fn finalize_run(&self, run: &Run, postings: &[ScoredPosting]) -> Result<(), StorageError> {
        let runs_cf = self.cf(CF_RUNS)?;
        let postings_cf = self.cf(CF_POSTINGS)?;

        let run_key = RunKey::from_run_id(&run.tenant_id, &run.run_id)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&runs_cf, run_key.to_bytes(), run.to_bytes()?);

        for posting in postings {
            let key = PostingKey::from_record_id(&posting.tenant_id, &posting.record_id)?;
            batch.put_cf(&postings_cf, key.to_bytes(), posting.to_bytes()?);
        }

        self.db.write(batch)?;
        debug!(
            run_id = %run.run_id,
            status = %run.status,
            postings = postings.len(),
            "Finalized run"
        );
        Ok(())
    }

    /// Get a run by tenant and run id.
    pub fn get_run(&self, tenant_id: &str, run_id: &str) -> Result<Option<Run>, StorageError> {
        let cf = self.cf(CF_RUNS)?;
        let key = RunKey::from_run_id(tenant_id, run_id)?;
        match self.db.get_cf(&cf, key.to_bytes())? {
            Some(bytes) => Ok(Some(Run::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Most recent run for a tenant, if any.
    pub fn latest_run(&self, tenant_id: &str) -> Result<Option<Run>, StorageError> {
        Ok(self.runs_for_tenant(tenant_id, 1)?.into_iter().next())
    }

    /// Up to `limit` runs for a tenant, newest first.
    pub fn runs_for_tenant(&self, tenant_id: &str, limit: usize) -> Result<Vec<Run>, StorageError> {
        let cf = self.cf(CF_RUNS)?;
        let prefix = RunKey::tenant_prefix(tenant_id);
        let upper = RunKey::tenant_upper_bound(tenant_id);

        let mut results = Vec::new();
        let iter = self
            .db
            .iterator_cf(&cf, IteratorMode::From(&upper, Direction::Reverse));

        for item in iter {
            let (key, value) = item?;
            if !key.starts_with(&prefix) {
                break;
            }
            results.push(Run::from_bytes(&value)?);
            if results.len() >= limit {
                break;
            }
        }

        Ok(results)
    }

    /// Runs for a tenant started at or after `since_ms`, oldest first.
    pub fn runs_since(&self, tenant_id: &str, since_ms: i64) -> Result<Vec<Run>, StorageError> {
        let cf = self.cf(CF_RUNS)?;
        let prefix = RunKey::tenant_prefix(tenant_id);
        let start = RunKey::prefix_start(tenant_id, since_ms);

        let mut results = Vec::new();
        let iter = self
            .db
            .iterator_cf(&cf, IteratorMode::From(&start, Direction::Forward));

        for item in iter {
            let (key, value) = item?;
            if !key.starts_with(&prefix) {
                break;
            }
            results.push(Run::from_bytes(&value)?);
        }

        Ok(results)
    }

    // ==================== Postings ====================

    /// Get a scored posting by tenant and record id.
    pub fn get_posting(
        &self,
        tenant_id: &str,
        record_id: &str,
    ) -> Result<Option<ScoredPosting>, StorageError> {
        let cf = self.cf(CF_POSTINGS)?;
        let key = PostingKey::from_record_id(tenant_id, record_id)?;
        match self.db.get_cf(&cf, key.to_bytes())? {
            Some(bytes) => Ok(Some(ScoredPosting::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Up to `limit` scored postings for a tenant, newest first.
    pub fn postings_for_tenant(
        &self,
        tenant_id: &str,
        limit: usize,
    ) -> Result<Vec<ScoredPosting>, StorageError> {
        let cf = self.cf(CF_POSTINGS)?;
        let prefix = PostingKey::tenant_prefix(tenant_id);
        let upper = PostingKey::tenant_upper_bound(tenant_id);

        let mut results = Vec::new();
        let iter = self
            .db
            .iterator_cf(&cf, IteratorMode::From(&upper, Direction::Reverse));

        for item in iter {
            let (key, value) = item?;
            if !key.starts_with(&prefix) {
                break;
            }
            results.push(ScoredPosting::from_bytes(&value)?);
            if results.len() >= limit {
                break;
            }
        }

        Ok(results)
    }

    /// Update the review status of a stored posting.
    ///
    /// Scoring fields are never touched; only `status` changes.
    pub fn update_posting_status(
        &self,
        tenant_id: &str,
        record_id: &str,
        status: PostingStatus,
    ) -> Result<(), StorageError> {
        let cf = self.cf(CF_POSTINGS)?;
        let key = PostingKey::from_record_id(tenant_id, record_id)?;

        let bytes = self
            .db
            .get_cf(&cf, key.to_bytes())?
            .ok_or_else(|| StorageError::NotFound(format!("posting {}", record_id)))?;

        let mut posting = ScoredPosting::from_bytes(&bytes)?;
        posting.status = status;
        self.db.put_cf(&cf, key.to_bytes(), posting.to_bytes()?)?;
        debug!(record_id, %status, "Updated posting status");
        Ok(())
    }

    // ==================== Profiles ====================

    /// Write a profile record, replacing any prior version.
    pub fn put_profile(&self, profile: &Profile) -> Result<(), StorageError> {
        let cf = self.cf(CF_PROFILES)?;
        let key = ProfileKey::new(&profile.tenant_id, &profile.profile_id);
        self.db.put_cf(&cf, key.to_bytes(), profile.to_bytes()?)?;
        debug!(profile_id = %profile.profile_id, "Stored profile");
        Ok(())
    }

    /// Get a profile by tenant and profile id.
    pub fn get_profile(
        &self,
        tenant_id: &str,
        profile_id: &str,
    ) -> Result<Option<Profile>, StorageError> {
        let cf = self.cf(CF_PROFILES)?;
        let key = ProfileKey::new(tenant_id, profile_id);
        match self.db.get_cf(&cf, key.to_bytes())? {
            Some(bytes) => Ok(Some(Profile::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    /// All profiles for a tenant, in key order.
    pub fn profiles_for_tenant(&self, tenant_id: &str) -> Result<Vec<Profile>, StorageError> {
        let cf = self.cf(CF_PROFILES)?;
        let prefix = ProfileKey::tenant_prefix(tenant_id);

        let mut results = Vec::new();
        let iter = self
            .db
            .iterator_cf(&cf, IteratorMode::From(&prefix, Direction::Forward));

        for item in iter {
            let (key, value) = item?;
            if !key.starts_with(&prefix) {
                break;
            }
            results.push(Profile::from_bytes(&value)?);
        }

        Ok(results)
    }

    /// The tenant's active profile, preferring the most recently updated
    /// when several are active.
    pub fn active_profile(&self, tenant_id: &str) -> Result<Option<Profile>, StorageError> {
        let profiles = self.profiles_for_tenant(tenant_id)?;
        Ok(profiles
            .into_iter()
            .filter(|p| p.is_active)
            .max_by_key(|p| p.updated_at))
    }

    /// Delete a profile. Returns whether a record existed.
    pub fn delete_profile(&self, tenant_id: &str, profile_id: &str) -> Result<bool, StorageError> {
        let cf = self.cf(CF_PROFILES)?;
        let key = ProfileKey::new(tenant_id, profile_id);

        let existed = self.db.get_cf(&cf, key.to_bytes())?.is_some();
        if existed {
            self.db.delete_cf(&cf, key.to_bytes())?;
            debug!(profile_id, "Deleted profile");
        }
        Ok(existed)
    }

    /// Profiles across all tenants. Used at startup to restore schedules.
    pub fn all_profiles(&self) -> Result<Vec<Profile>, StorageError> {
        let cf = self.cf(CF_PROFILES)?;

        let mut results = Vec::new();
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (_, value) = item?;
            results.push(Profile::from_bytes(&value)?);
        }
        Ok(results)
    }

    // ==================== Retention ====================

    /// Delete one tenant's runs and postings older than `cutoff_ms`.
    pub fn purge_tenant_older_than(
        &self,
        tenant_id: &str,
        cutoff_ms: i64,
    ) -> Result<PurgeStats, StorageError> {
        let runs_cf = self.cf(CF_RUNS)?;
        let postings_cf = self.cf(CF_POSTINGS)?;

        let mut batch = WriteBatch::default();
        let mut stats = PurgeStats::default();

        let run_prefix = RunKey::tenant_prefix(tenant_id);
        let iter = self
            .db
            .iterator_cf(&runs_cf, IteratorMode::From(&run_prefix, Direction::Forward));
        for item in iter {
            let (key, _) = item?;
            if !key.starts_with(&run_prefix) {
                break;
            }
            let run_key = RunKey::from_bytes(&key)?;
            if run_key.timestamp_ms >= cutoff_ms {
                break;
            }
            batch.delete_cf(&runs_cf, key);
            stats.runs_deleted += 1;
        }

        let posting_prefix = PostingKey::tenant_prefix(tenant_id);
        let iter = self.db.iterator_cf(
            &postings_cf,
            IteratorMode::From(&posting_prefix, Direction::Forward),
        );
        for item in iter {
            let (key, _) = item?;
            if !key.starts_with(&posting_prefix) {
                break;
            }
            let posting_key = PostingKey::from_bytes(&key)?;
            if posting_key.timestamp_ms() >= cutoff_ms {
                break;
            }
            batch.delete_cf(&postings_cf, key);
            stats.postings_deleted += 1;
        }

        if stats.runs_deleted > 0 || stats.postings_deleted > 0 {
            self.db.write(batch)?;
            info!(
                tenant_id,
                runs = stats.runs_deleted,
                postings = stats.postings_deleted,
                "Purged old records"
            );
        }
        Ok(stats)
    }

    /// Delete every tenant's runs and postings older than `cutoff_ms`.
    pub fn purge_all_older_than(&self, cutoff_ms: i64) -> Result<PurgeStats, StorageError> {
        let runs_cf = self.cf(CF_RUNS)?;
        let postings_cf = self.cf(CF_POSTINGS)?;

        let mut batch = WriteBatch::default();
        let mut stats = PurgeStats::default();

        for item in self.db.iterator_cf(&runs_cf, IteratorMode::Start) {
            let (key, _) = item?;
            let run_key = RunKey::from_bytes(&key)?;
            if run_key.timestamp_ms < cutoff_ms {
                batch.delete_cf(&runs_cf, key);
                stats.runs_deleted += 1;
            }
        }

        for item in self.db.iterator_cf(&postings_cf, IteratorMode::Start) {
            let (key, _) = item?;
            let posting_key = PostingKey::from_bytes(&key)?;
            if posting_key.timestamp_ms() < cutoff_ms {
                batch.delete_cf(&postings_cf, key);
                stats.postings_deleted += 1;
            }
        }

        if stats.runs_deleted > 0 || stats.postings_deleted > 0 {
            self.db.write(batch)?;
            info!(
                runs = stats.runs_deleted,
                postings = stats.postings_deleted,
                "Purged old records for all tenants"
            );
        }
        Ok(stats)
    }

    // ==================== Stats ====================

    /// Count records in each column family. Full scans; diagnostic use.
    pub fn get_stats(&self) -> Result<StorageStats, StorageError> {
        Ok(StorageStats {
            run_count: self.count_cf(CF_RUNS)?,
            posting_count: self.count_cf(CF_POSTINGS)?,
            profile_count: self.count_cf(CF_PROFILES)?,
        })
    }

    fn count_cf(&self, name: &str) -> Result<usize, StorageError> {
        let cf = self.cf(name)?;
        let mut count = 0;
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            item?;
            count += 1;
        }
        Ok(count)
    }
}

//! Run execution: the fetch -> filter -> score -> persist state machine.

use std::sync::Arc;
use tracing::{error, info, warn};

use scout_engine::ScoringEngine;
use scout_source::{apply_filters, Fetcher};
use scout_storage::Storage;
use scout_types::Run;
use scout_vault::KeyVault;

use crate::error::RunError;

const NEEDS_KEY_MESSAGE: &str = "scoring credential not available - scoring skipped";

/// Executes runs for (tenant, profile) pairs.
///
/// One instance is shared by the scheduler and the manual-trigger path;
/// executions are independent and may overlap, each producing its own
/// run record.
pub struct RunManager {
    storage: Arc<Storage>,
    vault: Arc<KeyVault>,
    fetcher: Fetcher,
    engine: ScoringEngine,
}

impl RunManager {
    /// Create a run manager over the given collaborators.
    pub fn new(
        storage: Arc<Storage>,
        vault: Arc<KeyVault>,
        fetcher: Fetcher,
        engine: ScoringEngine,
    ) -> Self {
        Self {
            storage,
            vault,
            fetcher,
            engine,
        }
    }

    /// Execute one run for a profile.
    ///
    /// Configuration problems (unknown profile, missing or invalid
    /// criteria) are rejected before any run record exists. After that
    /// point every outcome is a persisted run in a terminal state:
    /// - `completed`: fetch and scoring finished; per-posting scoring
    ///   failures only reduce the scored count
    /// - `needs_key`: fetch finished but no credential was in the vault;
    ///   the found count is retained and nothing is scored
    /// - `failed`: the error, truncated, is recorded on the run
    pub async fn execute_run(&self, tenant_id: &str, profile_id: &str) -> Result<Run, RunError> {
        let profile = self
            .storage
            .get_profile(tenant_id, profile_id)?
            .ok_or_else(|| RunError::ProfileNotFound(profile_id.to_string()))?;

        let criteria = profile
            .criteria
            .clone()
            .ok_or_else(|| RunError::MissingCriteria(profile_id.to_string()))?;
        criteria.validate().map_err(RunError::InvalidCriteria)?;

        let mut run = Run::new(tenant_id, profile_id);
        self.storage.put_run(&run)?;
        info!(
            run_id = %run.run_id,
            tenant_id,
            profile_id,
            "Starting run"
        );

        let fetched = self.fetcher.fetch_all(&criteria).await;
        let filtered = apply_filters(fetched, &criteria);
        run.postings_found = filtered.len() as u32;

        let postings = match self.vault.get(tenant_id) {
            None => {
                warn!(
                    run_id = %run.run_id,
                    tenant_id,
                    found = run.postings_found,
                    "No credential in vault, skipping scoring"
                );
                run.needs_key(NEEDS_KEY_MESSAGE);
                Vec::new()
            }
            Some(key) => {
                let outcome = self
                    .engine
                    .score_batch(&key, tenant_id, &run.run_id, &profile, filtered)
                    .await;
                run.complete(outcome.postings.len() as u32, outcome.tokens_used);
                outcome.postings
            }
        };

        if let Err(e) = self.storage.finalize_run(&run, &postings) {
            // Results never landed; record the run as failed instead so
            // it does not linger as `running`
            error!(run_id = %run.run_id, error = %e, "Failed to persist run results");
            run.postings_scored = 0;
            run.tokens_used = 0;
            run.fail(&format!("failed to persist results: {}", e));
            self.storage.put_run(&run)?;
        }

        info!(
            run_id = %run.run_id,
            status = %run.status,
            found = run.postings_found,
            scored = run.postings_scored,
            tokens = run.tokens_used,
            "Run finished"
        );
        Ok(run)
    }
}

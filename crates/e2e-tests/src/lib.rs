//! Shared test harness for end-to-end tests.
//!
//! Wires the full stack (storage, key vault, mock posting source, mock
//! evaluator, run manager, scheduler, and the service facade) over a
//! temporary database, so every test starts from a clean slate and the
//! mocks can script provider behavior.

use std::sync::Arc;

use secrecy::SecretString;
use tempfile::TempDir;

use scout_engine::{MockEvaluator, ScoringEngine};
use scout_runner::RunManager;
use scout_scheduler::SchedulerService;
use scout_service::JobScoutService;
use scout_source::{Fetcher, MockPostingSource};
use scout_storage::Storage;
use scout_types::{
    Interval, Profile, RawPosting, SchedulerSettings, ScoringSettings, SearchCriteria,
    SourceSettings,
};
use scout_vault::KeyVault;

/// Full application stack over a temporary database.
///
/// All components are exposed so tests can exercise any layer: the facade
/// for caller-visible flows, the runner for the scheduled-execution path,
/// and the mocks for scripting failures.
pub struct TestHarness {
    pub _temp_dir: TempDir,
    pub storage: Arc<Storage>,
    pub vault: Arc<KeyVault>,
    pub source: Arc<MockPostingSource>,
    pub evaluator: Arc<MockEvaluator>,
    pub runner: Arc<RunManager>,
    pub scheduler: Arc<SchedulerService>,
    pub service: JobScoutService,
}

impl TestHarness {
    /// Create a harness whose source returns no postings.
    pub async fn new() -> Self {
        Self::with_postings(Vec::new()).await
    }

    /// Create a harness whose source returns `postings` on every fetch.
    pub async fn with_postings(postings: Vec<RawPosting>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let storage = Arc::new(Storage::open(temp_dir.path()).expect("Failed to open storage"));
        let vault = Arc::new(KeyVault::new());
        let source = Arc::new(MockPostingSource::with_postings(postings));
        let evaluator = Arc::new(MockEvaluator::new());

        let fetcher = Fetcher::new(source.clone(), &SourceSettings::default());
        let engine = ScoringEngine::new(evaluator.clone(), &ScoringSettings::default());
        let runner = Arc::new(RunManager::new(
            storage.clone(),
            vault.clone(),
            fetcher,
            engine,
        ));

        let settings = SchedulerSettings {
            shutdown_timeout_secs: 1,
        };
        let scheduler = Arc::new(
            SchedulerService::new(&settings, runner.clone())
                .await
                .expect("Failed to create scheduler"),
        );

        let service = JobScoutService::new(
            storage.clone(),
            vault.clone(),
            runner.clone(),
            scheduler.clone(),
            evaluator.clone(),
        );

        Self {
            _temp_dir: temp_dir,
            storage,
            vault,
            source,
            evaluator,
            runner,
            scheduler,
            service,
        }
    }

    /// Put a well-formed credential in the vault, bypassing verification.
    pub fn store_credential(&self, tenant_id: &str) {
        self.vault
            .store(tenant_id, SecretString::from("sk-e2e-test-key"));
    }
}

/// Profile with default search criteria, ready to run.
pub fn searchable_profile(tenant_id: &str) -> Profile {
    let mut profile = Profile::new(tenant_id, "Backend search");
    profile.skills = vec!["rust".to_string(), "tokio".to_string()];
    profile.criteria = Some(SearchCriteria::default());
    profile
}

/// Profile with default criteria and the given recurrence.
pub fn recurring_profile(tenant_id: &str, interval: Interval) -> Profile {
    let mut profile = searchable_profile(tenant_id);
    profile.interval = interval;
    profile
}

/// A batch of distinct postings: job-0, job-1, ...
pub fn sample_postings(count: usize) -> Vec<RawPosting> {
    (0..count)
        .map(|i| {
            let mut posting =
                RawPosting::new(format!("job-{}", i), format!("Rust Engineer {}", i));
            posting.company = Some("Acme Corp".to_string());
            posting.location = Some("Remote".to_string());
            posting.description = Some("Build backend services in Rust".to_string());
            posting
        })
        .collect()
}

//! Credential lifecycle tests.
//!
//! Submission runs a format gate and then a live verification before the
//! key enters the vault; cleared or expired keys gate later runs. Keys
//! only ever live in process memory.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use tempfile::TempDir;

use e2e_tests::{sample_postings, searchable_profile, TestHarness};
use scout_engine::{MockEvaluator, ScoringEngine};
use scout_runner::RunManager;
use scout_service::ServiceError;
use scout_source::{Fetcher, MockPostingSource};
use scout_storage::Storage;
use scout_types::{RunStatus, ScoringSettings, SourceSettings};
use scout_vault::KeyVault;

/// A well-formed, verified key is accepted and unlocks scoring.
#[tokio::test(flavor = "multi_thread")]
async fn test_submitted_key_is_verified_and_unlocks_runs() {
    let harness = TestHarness::with_postings(sample_postings(1)).await;
    let profile = searchable_profile("tenant-a");
    harness.service.save_profile(&profile).await.unwrap();

    assert!(!harness.service.credential_active("tenant-a"));

    harness
        .service
        .submit_credential("tenant-a", SecretString::from("sk-live-key-1234"))
        .await
        .unwrap();

    assert!(harness.service.credential_active("tenant-a"));

    let summary = harness
        .service
        .trigger_manual_run("tenant-a", Some(&profile.profile_id))
        .await
        .unwrap();
    assert_eq!(summary.status, RunStatus::Completed);
    assert_eq!(summary.postings_scored, 1);
}

/// A malformed key is rejected before any provider round-trip.
#[tokio::test(flavor = "multi_thread")]
async fn test_malformed_key_is_rejected_without_verification() {
    let harness = TestHarness::new().await;

    let err = harness
        .service
        .submit_credential("tenant-a", SecretString::from("AKIA-not-a-key"))
        .await
        .unwrap_err();

    assert!(
        matches!(err, ServiceError::InvalidKeyFormat),
        "Expected InvalidKeyFormat, got: {}",
        err
    );
    assert!(!harness.service.credential_active("tenant-a"));
}

/// A key the provider rejects never enters the vault.
#[tokio::test(flavor = "multi_thread")]
async fn test_key_failing_live_verification_is_not_stored() {
    let harness = TestHarness::new().await;
    harness.evaluator.set_verify_fails(true);

    let err = harness
        .service
        .submit_credential("tenant-a", SecretString::from("sk-looks-fine"))
        .await
        .unwrap_err();

    assert!(
        matches!(err, ServiceError::VerificationFailed(_)),
        "Expected VerificationFailed, got: {}",
        err
    );
    assert!(
        err.to_string().contains("rejected"),
        "Error should carry the provider's reason, got: {}",
        err
    );
    assert!(!harness.service.credential_active("tenant-a"));
}

/// Clearing the credential gates the next manual trigger.
#[tokio::test(flavor = "multi_thread")]
async fn test_cleared_credential_blocks_next_manual_run() {
    let harness = TestHarness::with_postings(sample_postings(1)).await;
    let profile = searchable_profile("tenant-a");
    harness.service.save_profile(&profile).await.unwrap();
    harness
        .service
        .submit_credential("tenant-a", SecretString::from("sk-live-key-1234"))
        .await
        .unwrap();

    harness.service.clear_credential("tenant-a");
    assert!(!harness.service.credential_active("tenant-a"));

    let err = harness
        .service
        .trigger_manual_run("tenant-a", Some(&profile.profile_id))
        .await
        .unwrap_err();
    assert!(
        matches!(err, ServiceError::CredentialMissing(_)),
        "Expected CredentialMissing, got: {}",
        err
    );
}

/// Keys expire out of the vault; the next run downgrades to `needs_key`
/// instead of scoring with a stale credential.
#[tokio::test(flavor = "multi_thread")]
async fn test_expired_key_downgrades_next_run_to_needs_key() {
    // Stack with a vault whose TTL is short enough to observe
    let temp_dir = TempDir::new().unwrap();
    let storage = Arc::new(Storage::open(temp_dir.path()).unwrap());
    let vault = Arc::new(KeyVault::with_ttl(Duration::from_millis(200)));
    let source = Arc::new(MockPostingSource::with_postings(sample_postings(1)));
    let evaluator = Arc::new(MockEvaluator::new());
    let fetcher = Fetcher::new(source, &SourceSettings::default());
    let engine = ScoringEngine::new(evaluator, &ScoringSettings::default());
    let runner = RunManager::new(storage.clone(), vault.clone(), fetcher, engine);

    let profile = searchable_profile("tenant-a");
    storage.put_profile(&profile).unwrap();
    vault.store("tenant-a", SecretString::from("sk-short-lived"));

    // 1. While the key is live, runs complete
    let run = runner
        .execute_run("tenant-a", &profile.profile_id)
        .await
        .unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.postings_scored, 1);

    // 2. Past the TTL the vault forgets the key
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(!vault.has("tenant-a"));

    // 3. The next run fetches but does not score
    let run = runner
        .execute_run("tenant-a", &profile.profile_id)
        .await
        .unwrap();
    assert_eq!(run.status, RunStatus::NeedsKey);
    assert_eq!(run.postings_found, 1);
    assert_eq!(run.postings_scored, 0);
}

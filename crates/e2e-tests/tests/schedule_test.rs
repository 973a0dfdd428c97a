//! Scheduling and retention tests.
//!
//! Profile saves install and remove recurring triggers, restoration
//! rebuilds them from storage after a restart, and the retention purge
//! deletes old run history without touching fresh records.

use chrono::Utc;
use pretty_assertions::assert_eq;
use ulid::Ulid;

use e2e_tests::{recurring_profile, sample_postings, searchable_profile, TestHarness};
use scout_types::{DimensionScores, Interval, Run, ScoredPosting};

/// Saving an active recurring profile installs a trigger whose next
/// fire time sits one interval out.
#[tokio::test(flavor = "multi_thread")]
async fn test_save_recurring_profile_installs_trigger() {
    let harness = TestHarness::new().await;

    let profile = recurring_profile("tenant-a", Interval::Hourly);
    harness.service.save_profile(&profile).await.unwrap();

    assert_eq!(harness.scheduler.schedule_count(), 1);

    let next = harness
        .service
        .next_scheduled_run("tenant-a", &profile.profile_id)
        .await
        .unwrap()
        .expect("Recurring profile should have a next fire time");
    let delta = next - Utc::now();
    assert!(
        delta > chrono::Duration::minutes(55) && delta < chrono::Duration::minutes(65),
        "Hourly trigger should fire about an hour out, got {:?}",
        delta
    );
}

/// A profile that was never scheduled has no next fire time.
#[tokio::test(flavor = "multi_thread")]
async fn test_unscheduled_profile_has_no_next_fire_time() {
    let harness = TestHarness::new().await;

    let profile = searchable_profile("tenant-a");
    harness.service.save_profile(&profile).await.unwrap();

    let next = harness
        .service
        .next_scheduled_run("tenant-a", &profile.profile_id)
        .await
        .unwrap();
    assert_eq!(next, None);
}

/// Switching a scheduled profile back to manual removes its trigger.
#[tokio::test(flavor = "multi_thread")]
async fn test_switching_to_manual_removes_trigger() {
    let harness = TestHarness::new().await;

    let mut profile = recurring_profile("tenant-a", Interval::Hourly);
    harness.service.save_profile(&profile).await.unwrap();
    assert_eq!(harness.scheduler.schedule_count(), 1);

    profile.interval = Interval::Manual;
    harness.service.save_profile(&profile).await.unwrap();

    assert_eq!(harness.scheduler.schedule_count(), 0);
    let next = harness
        .service
        .next_scheduled_run("tenant-a", &profile.profile_id)
        .await
        .unwrap();
    assert_eq!(next, None);
}

/// Deactivating a scheduled profile removes its trigger.
#[tokio::test(flavor = "multi_thread")]
async fn test_deactivating_profile_removes_trigger() {
    let harness = TestHarness::new().await;

    let mut profile = recurring_profile("tenant-a", Interval::Daily);
    harness.service.save_profile(&profile).await.unwrap();
    assert_eq!(harness.scheduler.schedule_count(), 1);

    profile.is_active = false;
    harness.service.save_profile(&profile).await.unwrap();

    assert_eq!(harness.scheduler.schedule_count(), 0);
}

/// Deleting a profile removes both the record and its trigger.
#[tokio::test(flavor = "multi_thread")]
async fn test_deleting_profile_removes_trigger() {
    let harness = TestHarness::new().await;

    let profile = recurring_profile("tenant-a", Interval::Hourly);
    harness.service.save_profile(&profile).await.unwrap();
    assert_eq!(harness.scheduler.schedule_count(), 1);

    let deleted = harness
        .service
        .delete_profile("tenant-a", &profile.profile_id)
        .await
        .unwrap();
    assert!(deleted);
    assert_eq!(harness.scheduler.schedule_count(), 0);

    // Deleting again reports the record was already gone
    let deleted = harness
        .service
        .delete_profile("tenant-a", &profile.profile_id)
        .await
        .unwrap();
    assert!(!deleted);
}

/// After a restart, restoration re-installs triggers for exactly the
/// active recurring profiles found in storage.
#[tokio::test(flavor = "multi_thread")]
async fn test_restore_schedules_rebuilds_from_storage() {
    let harness = TestHarness::new().await;

    // 1. Write profiles straight to storage, as a previous process
    //    lifetime would have left them
    let hourly = recurring_profile("tenant-a", Interval::Hourly);
    harness.storage.put_profile(&hourly).unwrap();

    let mut dormant = recurring_profile("tenant-a", Interval::Daily);
    dormant.is_active = false;
    harness.storage.put_profile(&dormant).unwrap();

    let manual = searchable_profile("tenant-b");
    harness.storage.put_profile(&manual).unwrap();

    assert_eq!(harness.scheduler.schedule_count(), 0);

    // 2. Restore: only the active recurring profile gets a trigger
    let restored = harness.service.restore_schedules().await.unwrap();
    assert_eq!(restored, 1);
    assert_eq!(harness.scheduler.schedule_count(), 1);

    let next = harness
        .service
        .next_scheduled_run("tenant-a", &hourly.profile_id)
        .await
        .unwrap();
    assert!(next.is_some(), "Restored trigger should have a fire time");
}

/// Retention purge drops runs and postings older than the cutoff while
/// leaving fresh records alone.
#[tokio::test(flavor = "multi_thread")]
async fn test_retention_purge_removes_old_history() {
    let harness = TestHarness::with_postings(sample_postings(1)).await;
    harness.store_credential("tenant-a");
    let profile = searchable_profile("tenant-a");
    harness.service.save_profile(&profile).await.unwrap();

    // 1. Plant a 40-day-old completed run with one scored posting.
    //    Record ids are ULIDs, so ages are encoded in the ids themselves.
    let old_when = Utc::now() - chrono::Duration::days(40);
    let old_ms = old_when.timestamp_millis();

    let mut old_run = Run::new("tenant-a", &profile.profile_id);
    old_run.run_id = Ulid::from_parts(old_ms as u64, 7).to_string();
    old_run.started_at = old_when;
    old_run.complete(1, 100);
    old_run.completed_at = Some(old_when);

    let mut old_posting = ScoredPosting::new(
        "tenant-a",
        &old_run.run_id,
        sample_postings(1).remove(0),
        DimensionScores::neutral(),
        Vec::new(),
        Vec::new(),
        String::new(),
    );
    old_posting.record_id = Ulid::from_parts(old_ms as u64, 9).to_string();
    old_posting.scored_at = old_when;
    harness
        .storage
        .finalize_run(&old_run, &[old_posting])
        .unwrap();

    // 2. Produce a fresh run alongside it
    harness
        .service
        .trigger_manual_run("tenant-a", Some(&profile.profile_id))
        .await
        .unwrap();
    assert_eq!(harness.service.run_history("tenant-a", 10).unwrap().len(), 2);

    // 3. Purge at 30 days: the planted records go, the fresh ones stay
    let stats = harness.service.purge_older_than(30).unwrap();
    assert_eq!(stats.runs_deleted, 1);
    assert_eq!(stats.postings_deleted, 1);

    let history = harness.service.run_history("tenant-a", 10).unwrap();
    assert_eq!(history.len(), 1);
    assert!(history[0].run_id != old_run.run_id);

    let postings = harness.service.recent_postings("tenant-a", 10).unwrap();
    assert_eq!(postings.len(), 1);
    assert_eq!(postings[0].posting.external_id, "job-0");
}

//! Caller-facing result shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use scout_types::{Run, RunStatus};

/// Compact view of one run, returned from manual triggers and status
/// queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: String,
    pub status: RunStatus,
    pub postings_found: u32,
    pub postings_scored: u32,
    pub tokens_used: u64,
}

impl From<&Run> for RunSummary {
    fn from(run: &Run) -> Self {
        Self {
            run_id: run.run_id.clone(),
            status: run.status,
            postings_found: run.postings_found,
            postings_scored: run.postings_scored,
            tokens_used: run.tokens_used,
        }
    }
}

/// Aggregated tenant health.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusSummary {
    /// Most recent run, regardless of outcome.
    pub last_run: Option<RunSummary>,

    /// Next fire time of the active profile's trigger, if one is
    /// installed.
    #[serde(default)]
    pub next_scheduled_run: Option<DateTime<Utc>>,

    /// Whether a live (unexpired) credential is in the vault.
    pub credential_active: bool,

    /// Reasoning-service tokens consumed over the trailing 24 hours.
    pub tokens_last_24h: u64,

    /// Days since the newest completed run; absent when nothing has
    /// completed yet.
    pub data_freshness_days: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_run_summary_from_run() {
        let mut run = Run::new("tenant-1", "profile-1");
        run.postings_found = 8;
        run.complete(5, 1_200);

        let summary = RunSummary::from(&run);
        assert_eq!(summary.run_id, run.run_id);
        assert_eq!(summary.status, RunStatus::Completed);
        assert_eq!(summary.postings_found, 8);
        assert_eq!(summary.postings_scored, 5);
        assert_eq!(summary.tokens_used, 1_200);
    }

    #[test]
    fn test_status_summary_serializes() {
        let summary = StatusSummary {
            last_run: None,
            next_scheduled_run: None,
            credential_active: false,
            tokens_last_24h: 0,
            data_freshness_days: None,
        };
        let json = serde_json::to_string(&summary).unwrap();
        let decoded: StatusSummary = serde_json::from_str(&json).unwrap();
        assert!(!decoded.credential_active);
        assert!(decoded.last_run.is_none());
    }
}

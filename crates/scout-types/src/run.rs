//! Run records: one per execution of the fetch/filter/score pipeline.
//!
//! A Run is created in `Running` when the pipeline starts and must reach
//! exactly one terminal state before the triggering call returns. History
//! is append-only; a finalized Run is never mutated again.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Longest error message stored on a run. Longer messages are cut.
pub const MAX_ERROR_LEN: usize = 500;

/// Lifecycle state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Pipeline in progress. The only non-terminal state.
    Running,
    /// Pipeline finished; counts and token usage are final.
    Completed,
    /// Pipeline aborted; `error_message` holds the truncated cause.
    Failed,
    /// Fetch finished but no credential was available to score with.
    NeedsKey,
}

impl RunStatus {
    /// True for every state except `Running`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunStatus::Running)
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Running => write!(f, "running"),
            RunStatus::Completed => write!(f, "completed"),
            RunStatus::Failed => write!(f, "failed"),
            RunStatus::NeedsKey => write!(f, "needs_key"),
        }
    }
}

/// Record of one pipeline execution for a (tenant, profile) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    /// Unique identifier (ULID string).
    pub run_id: String,

    pub tenant_id: String,

    pub profile_id: String,

    pub status: RunStatus,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub started_at: DateTime<Utc>,

    /// Set exactly once, when the run reaches a terminal state.
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub completed_at: Option<DateTime<Utc>>,

    /// Postings returned by the fetch stage after filtering.
    pub postings_found: u32,

    /// Postings successfully scored and persisted.
    pub postings_scored: u32,

    /// Reasoning-service tokens consumed by this run.
    pub tokens_used: u64,

    /// Truncated failure or gating message, absent on clean completion.
    #[serde(default)]
    pub error_message: Option<String>,
}

impl Run {
    /// Start a new run: status `Running`, counters zeroed.
    pub fn new(tenant_id: impl Into<String>, profile_id: impl Into<String>) -> Self {
        Self {
            run_id: ulid::Ulid::new().to_string(),
            tenant_id: tenant_id.into(),
            profile_id: profile_id.into(),
            status: RunStatus::Running,
            started_at: Utc::now(),
            completed_at: None,
            postings_found: 0,
            postings_scored: 0,
            tokens_used: 0,
            error_message: None,
        }
    }

    /// Finalize as `Completed` with scoring results.
    pub fn complete(&mut self, postings_scored: u32, tokens_used: u64) {
        self.postings_scored = postings_scored;
        self.tokens_used = tokens_used;
        self.finalize(RunStatus::Completed);
    }

    /// Finalize as `Failed`, capturing a truncated error message.
    pub fn fail(&mut self, message: &str) {
        self.error_message = Some(truncate_error(message));
        self.finalize(RunStatus::Failed);
    }

    /// Finalize as `NeedsKey`. Fetched count is retained, scored stays 0.
    pub fn needs_key(&mut self, message: &str) {
        self.error_message = Some(truncate_error(message));
        self.finalize(RunStatus::NeedsKey);
    }

    fn finalize(&mut self, status: RunStatus) {
        self.status = status;
        self.completed_at = Some(Utc::now());
    }

    /// True once the run has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Start timestamp as milliseconds since the Unix epoch.
    pub fn started_ms(&self) -> i64 {
        self.started_at.timestamp_millis()
    }

    /// Serialize to JSON bytes for storage.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Deserialize from JSON bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// Cap a message at `MAX_ERROR_LEN` characters, char-boundary safe.
pub fn truncate_error(message: &str) -> String {
    message.chars().take(MAX_ERROR_LEN).collect()
}

//! Posting records: raw fetch output and scored results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::score::{DimensionScores, Tier};

/// A posting as produced by the source adapter. Never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPosting {
    /// Provider's identifier, falling back to the posting URL.
    pub external_id: String,

    pub title: String,

    #[serde(default)]
    pub company: Option<String>,

    #[serde(default)]
    pub location: Option<String>,

    #[serde(default)]
    pub salary_min: Option<f64>,

    #[serde(default)]
    pub salary_max: Option<f64>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub url: Option<String>,

    /// Which provider/site this posting came from.
    #[serde(default)]
    pub source: Option<String>,
}

impl RawPosting {
    /// Minimal posting for call sites that only have an id and title.
    pub fn new(external_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            external_id: external_id.into(),
            title: title.into(),
            company: None,
            location: None,
            salary_min: None,
            salary_max: None,
            description: None,
            url: None,
            source: None,
        }
    }
}

/// Caller-driven review state of a stored posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PostingStatus {
    #[default]
    New,
    Applied,
    Saved,
    Hidden,
}

impl std::fmt::Display for PostingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PostingStatus::New => write!(f, "new"),
            PostingStatus::Applied => write!(f, "applied"),
            PostingStatus::Saved => write!(f, "saved"),
            PostingStatus::Hidden => write!(f, "hidden"),
        }
    }
}

/// A posting together with its evaluation against a profile.
///
/// Produced once per (run, posting); the scoring fields are immutable after
/// creation. Only `status` changes afterwards, driven by the user reviewing
/// results, never by a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredPosting {
    /// Unique identifier (ULID string).
    pub record_id: String,

    pub tenant_id: String,

    /// Run that produced this record.
    pub run_id: String,

    pub posting: RawPosting,

    pub dimensions: DimensionScores,

    /// Weighted total over the dimensions, rounded to 3 decimals.
    pub total: f64,

    pub tier: Tier,

    #[serde(default)]
    pub matched_skills: Vec<String>,

    #[serde(default)]
    pub missing_skills: Vec<String>,

    /// Free-text explanation from the evaluator.
    #[serde(default)]
    pub rationale: String,

    #[serde(default)]
    pub status: PostingStatus,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub scored_at: DateTime<Utc>,
}

impl ScoredPosting {
    /// Build a scored record, deriving total and tier from the dimensions.
    pub fn new(
        tenant_id: impl Into<String>,
        run_id: impl Into<String>,
        posting: RawPosting,
        dimensions: DimensionScores,
        matched_skills: Vec<String>,
        missing_skills: Vec<String>,
        rationale: String,
    ) -> Self {
        let total = dimensions.weighted_total();
        Self {
            record_id: ulid::Ulid::new().to_string(),
            tenant_id: tenant_id.into(),
            run_id: run_id.into(),
            posting,
            dimensions,
            total,
            tier: Tier::for_total(total),
            matched_skills,
            missing_skills,
            rationale,
            status: PostingStatus::New,
            scored_at: Utc::now(),
        }
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

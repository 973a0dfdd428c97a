//! # scout-types
//!
//! Shared domain types for the jobscout system.
//!
//! This crate defines the data structures used throughout the pipeline:
//! - Profiles: resume-derived data plus search criteria and schedule
//! - Postings: raw fetch output and scored results with tiers
//! - Runs: append-only execution records with a closed status enum
//! - Scoring math: fixed dimension weights and the tier boundary table
//! - Settings: layered configuration loading

pub mod config;
pub mod criteria;
pub mod error;
pub mod interval;
pub mod posting;
pub mod profile;
pub mod run;
pub mod score;

pub use config::{
    RetentionSettings, SchedulerSettings, ScoringSettings, Settings, SourceSettings, VaultSettings,
};
pub use criteria::SearchCriteria;
pub use error::ScoutError;
pub use interval::Interval;
pub use posting::{PostingStatus, RawPosting, ScoredPosting};
pub use profile::{Experience, Profile};
pub use run::{truncate_error, Run, RunStatus, MAX_ERROR_LEN};
pub use score::{
    round3, DimensionScores, Tier, NEUTRAL_SCORE, WEIGHT_COMPANY_SIGNALS, WEIGHT_EXPERIENCE_LEVEL,
    WEIGHT_LOCATION_MATCH, WEIGHT_RECENCY, WEIGHT_SALARY_FIT, WEIGHT_SKILL_MATCH,
};

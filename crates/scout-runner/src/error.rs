//! Error types for run execution.

use thiserror::Error;

use scout_storage::StorageError;

/// Error type for run execution.
///
/// Only configuration problems and storage faults surface here; transient
/// collaborator failures are absorbed inside the pipeline (retry, skip,
/// neutral fallback) and credential absence is the `needs_key` run state,
/// not an error.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Profile {0} not found")]
    ProfileNotFound(String),

    #[error("Profile {0} has no search criteria")]
    MissingCriteria(String),

    #[error("Invalid search criteria: {0}")]
    InvalidCriteria(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

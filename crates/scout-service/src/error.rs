//! Error types for the service facade.

use thiserror::Error;

use scout_runner::RunError;
use scout_scheduler::SchedulerError;
use scout_storage::StorageError;
use scout_vault::VaultError;

/// Error type for caller-facing operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Manual trigger without a stored credential.
    #[error("No scoring credential on file for tenant {0}")]
    CredentialMissing(String),

    /// Submitted key does not look like a reasoning-service key.
    #[error("Invalid key format")]
    InvalidKeyFormat,

    /// Live verification of a submitted key failed.
    #[error("Key verification failed: {0}")]
    VerificationFailed(String),

    /// Named profile does not exist.
    #[error("Profile {0} not found")]
    ProfileNotFound(String),

    /// Tenant has no active profile to run.
    #[error("No active profile for tenant {0}")]
    NoActiveProfile(String),

    #[error("Run error: {0}")]
    Run(#[from] RunError),

    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<VaultError> for ServiceError {
    fn from(err: VaultError) -> Self {
        match err {
            VaultError::InvalidFormat => ServiceError::InvalidKeyFormat,
        }
    }
}

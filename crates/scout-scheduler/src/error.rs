//! Error types for the scheduler.

use thiserror::Error;
use tokio_cron_scheduler::JobSchedulerError;

/// Error type for scheduler operations.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The underlying job scheduler failed.
    #[error("Scheduler error: {0}")]
    Scheduler(String),

    /// `start` was called while the scheduler is already running.
    #[error("Scheduler is already running")]
    AlreadyRunning,

    /// `stop` was called while the scheduler is not running.
    #[error("Scheduler is not running")]
    NotRunning,
}

impl From<JobSchedulerError> for SchedulerError {
    fn from(err: JobSchedulerError) -> Self {
        SchedulerError::Scheduler(err.to_string())
    }
}

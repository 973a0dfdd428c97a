//! Background scheduling for jobscout.
//!
//! [`SchedulerService`] keeps one repeating trigger per active,
//! non-manual (tenant, profile) pair; each fire launches a full pipeline
//! run as a detached task. The crate also hosts predefined maintenance
//! jobs:
//!
//! - **purge**: retention sweep deleting runs and postings older than
//!   the retention window
//!
//! A failed scheduled run surfaces through run history, never through
//! the scheduler itself.

pub mod error;
pub mod jobs;
pub mod registry;
pub mod scheduler;

pub use error::SchedulerError;
pub use jobs::{create_purge_job, PurgeJobConfig};
pub use registry::{ScheduleEntry, ScheduleRegistry};
pub use scheduler::SchedulerService;

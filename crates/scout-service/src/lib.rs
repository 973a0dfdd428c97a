//! Caller-facing facade for jobscout.
//!
//! [`JobScoutService`] ties the components together behind one API:
//! manual triggers that check the vault before any run starts, profile
//! saves that keep schedules in sync, credential submission with live
//! verification, posting review updates, retention purge, and the
//! aggregated status summary. The daemon and the scenario tests both
//! drive the system exclusively through this facade.

pub mod error;
pub mod service;
pub mod summary;

pub use error::ServiceError;
pub use service::JobScoutService;
pub use summary::{RunSummary, StatusSummary};

//! Run orchestration for jobscout.
//!
//! [`RunManager`] drives one execution of the pipeline: fetch postings,
//! filter them, score them when a credential is available, and persist
//! the results. Every started run ends in exactly one terminal state
//! (`completed`, `failed`, or `needs_key`).

pub mod error;
pub mod runner;

pub use error::RunError;
pub use runner::RunManager;

//! RocksDB-based persistence for jobscout.
//!
//! This crate provides durable storage for run history, scored postings,
//! and candidate profiles with:
//! - Column families per record type
//! - Tenant-prefixed, time-ordered keys for efficient range scans
//! - Atomic run finalization via write batches
//! - Retention purge of aged-out records

pub mod column_families;
pub mod db;
pub mod error;
pub mod keys;

pub use column_families::{CF_POSTINGS, CF_PROFILES, CF_RUNS};
pub use db::{PurgeStats, Storage, StorageStats};
pub use error::StorageError;
pub use keys::{PostingKey, ProfileKey, RunKey};

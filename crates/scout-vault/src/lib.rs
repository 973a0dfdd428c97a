//! Volatile per-tenant credential store for the jobscout daemon.
//!
//! Reasoning-service keys are supplied by users at runtime, live only in
//! process memory, and expire after a refreshable TTL. The vault is an
//! explicit service object injected into its consumers; there is no global
//! instance.

mod error;
mod vault;

pub use error::VaultError;
pub use vault::{validate_key_format, KeyVault, DEFAULT_TTL};

//! Error types for the key vault.

use thiserror::Error;

/// Errors raised by vault operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Submitted credential does not look like a service key.
    #[error("Invalid key format")]
    InvalidFormat,
}

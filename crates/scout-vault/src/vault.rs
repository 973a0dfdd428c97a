//! In-memory TTL credential store.
//!
//! Holds one reasoning-service key per tenant, in volatile memory only.
//! Nothing here is ever persisted: a process restart clears all entries,
//! which is the intended lifetime for user-supplied credentials.
//!
//! Expiry is lazy. `get` is the single point of eviction: it compares the
//! entry's freshness clock against the TTL and removes the entry as a side
//! effect when it has gone stale. There is no background sweep.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use secrecy::SecretString;
use tracing::debug;

use crate::error::VaultError;

/// Default credential time-to-live.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

struct VaultEntry {
    secret: SecretString,
    refreshed_at: Instant,
}

/// Thread-safe per-tenant credential store with lazy TTL eviction.
///
/// Shared between the run manager (scoring gate) and the service layer
/// (credential submit/clear/status) via `Arc`.
///
/// # Example
///
/// ```
/// use scout_vault::KeyVault;
///
/// let vault = KeyVault::new();
/// vault.store("tenant-1", "sk-abc123".into());
/// assert!(vault.has("tenant-1"));
/// vault.clear("tenant-1");
/// assert!(!vault.has("tenant-1"));
/// ```
pub struct KeyVault {
    entries: RwLock<HashMap<String, VaultEntry>>,
    ttl: Duration,
}

impl KeyVault {
    /// Create a vault with the default 24h TTL.
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    /// Create a vault with an explicit TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Store a credential, overwriting any existing entry and resetting
    /// its freshness clock. Last write wins.
    pub fn store(&self, tenant_id: &str, secret: SecretString) {
        let mut entries = self.entries.write().unwrap();
        entries.insert(
            tenant_id.to_string(),
            VaultEntry {
                secret,
                refreshed_at: Instant::now(),
            },
        );
        debug!(tenant_id, "Stored credential");
    }

    /// Fetch the tenant's credential, evicting it first if expired.
    pub fn get(&self, tenant_id: &str) -> Option<SecretString> {
        let mut entries = self.entries.write().unwrap();
        match entries.get(tenant_id) {
            Some(entry) if entry.refreshed_at.elapsed() > self.ttl => {
                entries.remove(tenant_id);
                debug!(tenant_id, "Evicted expired credential");
                None
            }
            Some(entry) => Some(entry.secret.clone()),
            None => None,
        }
    }

    /// Whether a live (non-expired) credential exists for the tenant.
    ///
    /// Defined as `get` returning present, so it shares the same lazy
    /// eviction side effect.
    pub fn has(&self, tenant_id: &str) -> bool {
        self.get(tenant_id).is_some()
    }

    /// Remove the tenant's credential unconditionally.
    pub fn clear(&self, tenant_id: &str) {
        let mut entries = self.entries.write().unwrap();
        if entries.remove(tenant_id).is_some() {
            debug!(tenant_id, "Cleared credential");
        }
    }

    /// Reset the freshness clock without changing the secret.
    ///
    /// Returns `false` if no entry exists (including one that expired).
    /// A live entry is extended for a full TTL from now; no update is lost
    /// because the clock is written under the same lock that reads it.
    pub fn refresh(&self, tenant_id: &str) -> bool {
        let mut entries = self.entries.write().unwrap();
        match entries.get_mut(tenant_id) {
            Some(entry) if entry.refreshed_at.elapsed() > self.ttl => {
                entries.remove(tenant_id);
                false
            }
            Some(entry) => {
                entry.refreshed_at = Instant::now();
                true
            }
            None => false,
        }
    }

    /// Number of entries currently held, expired or not.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// Whether the vault holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }
}

impl Default for KeyVault {
    fn default() -> Self {
        Self::new()
    }
}

/// Check that a submitted key looks like a reasoning-service key.
///
/// Format only; a live verification against the service is the caller's
/// concern.
pub fn validate_key_format(key: &str) -> Result<(), VaultError> {
    let key = key.trim();
    if !key.starts_with("sk-") || key.len() <= 3 {
        return Err(VaultError::InvalidFormat);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    #[test]
    fn test_store_and_get() {
        let vault = KeyVault::new();
        vault.store("tenant-1", secret("sk-test"));

        assert!(vault.get("tenant-1").is_some());
        assert!(vault.has("tenant-1"));
        assert!(vault.get("tenant-2").is_none());
    }

    #[test]
    fn test_store_overwrites() {
        use secrecy::ExposeSecret;

        let vault = KeyVault::new();
        vault.store("tenant-1", secret("sk-old"));
        vault.store("tenant-1", secret("sk-new"));

        let got = vault.get("tenant-1").unwrap();
        assert_eq!(got.expose_secret(), "sk-new");
        assert_eq!(vault.len(), 1);
    }

    #[test]
    fn test_clear_removes_entry() {
        let vault = KeyVault::new();
        vault.store("tenant-1", secret("sk-test"));
        vault.clear("tenant-1");

        assert!(!vault.has("tenant-1"));
        assert!(vault.is_empty());

        // Clearing an absent entry is a no-op
        vault.clear("tenant-1");
    }

    #[test]
    fn test_get_evicts_after_ttl() {
        let vault = KeyVault::with_ttl(Duration::from_millis(30));
        vault.store("tenant-1", secret("sk-test"));
        assert!(vault.has("tenant-1"));

        std::thread::sleep(Duration::from_millis(60));

        assert!(vault.get("tenant-1").is_none());
        // The expired entry was evicted, not just hidden
        assert_eq!(vault.len(), 0);
        assert!(!vault.has("tenant-1"));
    }

    #[test]
    fn test_refresh_extends_validity() {
        let vault = KeyVault::with_ttl(Duration::from_millis(80));
        vault.store("tenant-1", secret("sk-test"));

        // Refresh partway through; entry should outlive the original TTL
        std::thread::sleep(Duration::from_millis(50));
        assert!(vault.refresh("tenant-1"));

        std::thread::sleep(Duration::from_millis(50));
        assert!(vault.has("tenant-1"));
    }

    #[test]
    fn test_refresh_absent_returns_false() {
        let vault = KeyVault::new();
        assert!(!vault.refresh("tenant-1"));
    }

    #[test]
    fn test_refresh_expired_returns_false() {
        let vault = KeyVault::with_ttl(Duration::from_millis(20));
        vault.store("tenant-1", secret("sk-test"));

        std::thread::sleep(Duration::from_millis(50));

        assert!(!vault.refresh("tenant-1"));
        assert!(vault.is_empty());
    }

    #[test]
    fn test_tenants_are_isolated() {
        let vault = KeyVault::new();
        vault.store("tenant-1", secret("sk-one"));
        vault.store("tenant-2", secret("sk-two"));

        vault.clear("tenant-1");
        assert!(!vault.has("tenant-1"));
        assert!(vault.has("tenant-2"));
    }

    #[test]
    fn test_concurrent_access() {
        let vault = Arc::new(KeyVault::new());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let vault = vault.clone();
                std::thread::spawn(move || {
                    let tenant = format!("tenant-{}", i);
                    for _ in 0..100 {
                        vault.store(&tenant, SecretString::from("sk-test".to_string()));
                        assert!(vault.has(&tenant));
                        vault.refresh(&tenant);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(vault.len(), 8);
    }

    #[test]
    fn test_validate_key_format() {
        assert!(validate_key_format("sk-abc123").is_ok());
        assert!(validate_key_format("  sk-abc123  ").is_ok());
        assert!(validate_key_format("abc123").is_err());
        assert!(validate_key_format("sk-").is_err());
        assert!(validate_key_format("").is_err());
    }
}

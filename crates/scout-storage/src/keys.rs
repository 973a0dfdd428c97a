//! Key encoding and decoding for the storage layer.
//!
//! Every key is tenant-prefixed so that one tenant's records form a
//! contiguous, independently scannable range:
//! - runs:     `run:{tenant}:{timestamp_ms:013}:{ulid}`
//! - postings: `post:{tenant}:{ulid}`
//! - profiles: `profile:{tenant}:{profile_id}`
//!
//! Timestamps are zero-padded to 13 digits so lexicographic order matches
//! time order. Run and posting ids are ULIDs, which embed their creation
//! time; keys are always derived from the id so a record round-trips to
//! the same key.

use ulid::Ulid;

use crate::error::StorageError;

/// Key for run records.
/// Format: `run:{tenant}:{timestamp_ms:013}:{ulid}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunKey {
    pub tenant_id: String,
    /// Milliseconds embedded in the run's ULID.
    pub timestamp_ms: i64,
    pub ulid: Ulid,
}

impl RunKey {
    /// Build the key for a run id, using the ULID's embedded timestamp.
    pub fn from_run_id(tenant_id: &str, run_id: &str) -> Result<Self, StorageError> {
        let ulid: Ulid = run_id
            .parse()
            .map_err(|e| StorageError::Key(format!("Invalid run_id ULID: {}", e)))?;
        Ok(Self {
            tenant_id: tenant_id.to_string(),
            timestamp_ms: ulid.timestamp_ms() as i64,
            ulid,
        })
    }

    /// Encode key to bytes for storage.
    pub fn to_bytes(&self) -> Vec<u8> {
        format!(
            "run:{}:{:013}:{}",
            self.tenant_id, self.timestamp_ms, self.ulid
        )
        .into_bytes()
    }

    /// Decode key from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StorageError> {
        let s = std::str::from_utf8(bytes)
            .map_err(|e| StorageError::Key(format!("Invalid UTF-8: {}", e)))?;
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 4 || parts[0] != "run" {
            return Err(StorageError::Key(format!("Invalid run key format: {}", s)));
        }

        let timestamp_ms: i64 = parts[2]
            .parse()
            .map_err(|e| StorageError::Key(format!("Invalid timestamp: {}", e)))?;
        let ulid: Ulid = parts[3]
            .parse()
            .map_err(|e| StorageError::Key(format!("Invalid ULID: {}", e)))?;

        Ok(Self {
            tenant_id: parts[1].to_string(),
            timestamp_ms,
            ulid,
        })
    }

    /// The run id (ULID string) for this key.
    pub fn run_id(&self) -> String {
        self.ulid.to_string()
    }

    /// Prefix covering all of one tenant's runs.
    pub fn tenant_prefix(tenant_id: &str) -> Vec<u8> {
        format!("run:{}:", tenant_id).into_bytes()
    }

    /// Scan start for runs at or after `start_ms`.
    pub fn prefix_start(tenant_id: &str, start_ms: i64) -> Vec<u8> {
        format!("run:{}:{:013}:", tenant_id, start_ms).into_bytes()
    }

    /// Seek target strictly above every key in the tenant's range.
    ///
    /// `~` sorts after the digits and Crockford base32 characters that can
    /// follow the prefix, and before any longer tenant id's `:` separator.
    pub fn tenant_upper_bound(tenant_id: &str) -> Vec<u8> {
        format!("run:{}:~", tenant_id).into_bytes()
    }
}

/// Key for scored posting records.
/// Format: `post:{tenant}:{ulid}`
///
/// The ULID's embedded timestamp is the record's creation time, so keys
/// within a tenant sort oldest-first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostingKey {
    pub tenant_id: String,
    pub ulid: Ulid,
}

impl PostingKey {
    /// Build the key for a posting record id.
    pub fn from_record_id(tenant_id: &str, record_id: &str) -> Result<Self, StorageError> {
        let ulid: Ulid = record_id
            .parse()
            .map_err(|e| StorageError::Key(format!("Invalid record_id ULID: {}", e)))?;
        Ok(Self {
            tenant_id: tenant_id.to_string(),
            ulid,
        })
    }

    /// Encode key to bytes for storage.
    pub fn to_bytes(&self) -> Vec<u8> {
        format!("post:{}:{}", self.tenant_id, self.ulid).into_bytes()
    }

    /// Decode key from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StorageError> {
        let s = std::str::from_utf8(bytes)
            .map_err(|e| StorageError::Key(format!("Invalid UTF-8: {}", e)))?;
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 3 || parts[0] != "post" {
            return Err(StorageError::Key(format!(
                "Invalid posting key format: {}",
                s
            )));
        }

        let ulid: Ulid = parts[2]
            .parse()
            .map_err(|e| StorageError::Key(format!("Invalid ULID: {}", e)))?;

        Ok(Self {
            tenant_id: parts[1].to_string(),
            ulid,
        })
    }

    /// Creation time embedded in the record id.
    pub fn timestamp_ms(&self) -> i64 {
        self.ulid.timestamp_ms() as i64
    }

    /// Prefix covering all of one tenant's postings.
    pub fn tenant_prefix(tenant_id: &str) -> Vec<u8> {
        format!("post:{}:", tenant_id).into_bytes()
    }

    /// Seek target strictly above every key in the tenant's range.
    pub fn tenant_upper_bound(tenant_id: &str) -> Vec<u8> {
        format!("post:{}:~", tenant_id).into_bytes()
    }
}

/// Key for profile records.
/// Format: `profile:{tenant}:{profile_id}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileKey {
    pub tenant_id: String,
    pub profile_id: String,
}

impl ProfileKey {
    pub fn new(tenant_id: impl Into<String>, profile_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            profile_id: profile_id.into(),
        }
    }

    /// Encode key to bytes for storage.
    pub fn to_bytes(&self) -> Vec<u8> {
        format!("profile:{}:{}", self.tenant_id, self.profile_id).into_bytes()
    }

    /// Prefix covering all of one tenant's profiles.
    pub fn tenant_prefix(tenant_id: &str) -> Vec<u8> {
        format!("profile:{}:", tenant_id).into_bytes()
    }
}

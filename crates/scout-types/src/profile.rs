//! Profile records: resume-derived data plus search configuration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::criteria::SearchCriteria;
use crate::interval::Interval;

/// One prior position from the tenant's resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub title: String,

    #[serde(default)]
    pub company: String,
}

/// A tenant's named search profile.
///
/// The resume fields (skills, summary, experience) arrive from the resume
/// parser collaborator already structured; this crate never parses
/// documents itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Unique identifier (ULID string).
    pub profile_id: String,

    pub tenant_id: String,

    pub name: String,

    #[serde(default)]
    pub skills: Vec<String>,

    #[serde(default)]
    pub summary: String,

    #[serde(default)]
    pub experience: Vec<Experience>,

    /// Absent until the tenant configures a search; runs require it.
    #[serde(default)]
    pub criteria: Option<SearchCriteria>,

    #[serde(default)]
    pub interval: Interval,

    #[serde(default = "default_active")]
    pub is_active: bool,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl Profile {
    /// Create an empty active profile with a manual schedule.
    pub fn new(tenant_id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            profile_id: ulid::Ulid::new().to_string(),
            tenant_id: tenant_id.into(),
            name: name.into(),
            skills: Vec::new(),
            summary: String::new(),
            experience: Vec::new(),
            criteria: None,
            interval: Interval::Manual,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Bump `updated_at` to now. Call before persisting a modification.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Serialize to JSON bytes for storage.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Deserialize from JSON bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

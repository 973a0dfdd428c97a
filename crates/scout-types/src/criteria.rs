//! Search criteria supplied by a profile.
//!
//! Criteria are a value object: immutable for the duration of a run,
//! copied out of the owning profile when the run starts.

use serde::{Deserialize, Serialize};

/// What to fetch and which postings to keep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchCriteria {
    /// Posting sources to query (site tags understood by the provider).
    #[serde(default = "default_sources")]
    pub sources: Vec<String>,

    /// Search terms; empty means one generic term.
    #[serde(default)]
    pub search_terms: Vec<String>,

    /// Locations to search; empty means remote-anywhere.
    #[serde(default)]
    pub locations: Vec<String>,

    /// Restrict the provider query to remote positions.
    #[serde(default)]
    pub remote_only: bool,

    /// Lower salary bound; postings that cannot reach it are dropped.
    #[serde(default)]
    pub salary_min: Option<f64>,

    /// Upper salary bound; postings that cannot fall under it are dropped.
    #[serde(default)]
    pub salary_max: Option<f64>,

    /// Postings mentioning any of these (title or description) are dropped.
    #[serde(default)]
    pub exclude_keywords: Vec<String>,

    /// Drop postings whose title reads as a senior-level role.
    #[serde(default)]
    pub exclude_senior: bool,

    /// Drop postings whose location does not look domestic (heuristic).
    #[serde(default)]
    pub exclude_international: bool,
}

fn default_sources() -> Vec<String> {
    vec!["indeed".to_string()]
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            search_terms: Vec::new(),
            locations: Vec::new(),
            remote_only: false,
            salary_min: None,
            salary_max: None,
            exclude_keywords: Vec::new(),
            exclude_senior: false,
            exclude_international: false,
        }
    }
}

impl SearchCriteria {
    /// Search terms, substituting the generic default when unset.
    pub fn terms_or_default(&self) -> Vec<String> {
        if self.search_terms.is_empty() {
            vec!["software engineer".to_string()]
        } else {
            self.search_terms.clone()
        }
    }

    /// Locations, substituting the remote default when unset.
    pub fn locations_or_default(&self) -> Vec<String> {
        if self.locations.is_empty() {
            vec!["Remote".to_string()]
        } else {
            self.locations.clone()
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if let (Some(min), Some(max)) = (self.salary_min, self.salary_max) {
            if min > max {
                return Err(format!("salary_min {} exceeds salary_max {}", min, max));
            }
        }
        if let Some(min) = self.salary_min {
            if min < 0.0 {
                return Err(format!("salary_min must be non-negative, got {}", min));
            }
        }
        Ok(())
    }
}

//! Bounded evaluation contexts.
//!
//! Prompts are built from these rather than from the full records so the
//! payload sent to the reasoning service stays bounded regardless of how
//! large a posting description or profile grows.

use scout_types::{Profile, RawPosting};

/// Candidate-side context for an evaluation.
#[derive(Debug, Clone)]
pub struct ProfileContext {
    pub skills: Vec<String>,
    pub summary: String,
    /// Number of experience entries; the entries themselves stay out of
    /// the prompt.
    pub experience_count: usize,
}

impl ProfileContext {
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            skills: profile.skills.clone(),
            summary: profile.summary.clone(),
            experience_count: profile.experience.len(),
        }
    }
}

/// Posting-side context for an evaluation.
#[derive(Debug, Clone)]
pub struct PostingContext {
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    /// Description cut to the configured character budget.
    pub description: String,
}

impl PostingContext {
    /// Build a context, truncating the description to `description_budget`
    /// characters (not bytes, so multi-byte text stays intact).
    pub fn from_posting(posting: &RawPosting, description_budget: usize) -> Self {
        let description = posting
            .description
            .as_deref()
            .unwrap_or_default()
            .chars()
            .take(description_budget)
            .collect();

        Self {
            title: posting.title.clone(),
            company: posting.company.clone().unwrap_or_default(),
            location: posting.location.clone().unwrap_or_default(),
            salary_min: posting.salary_min,
            salary_max: posting.salary_max,
            description,
        }
    }
}

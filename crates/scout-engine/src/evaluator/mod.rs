//! Reasoning-service trait and implementations.

mod api;
mod mock;

pub use api::ApiEvaluator;
pub use mock::MockEvaluator;

use async_trait::async_trait;
use secrecy::SecretString;
use thiserror::Error;

use scout_types::DimensionScores;

use crate::context::{PostingContext, ProfileContext};

/// Error type for evaluation operations.
#[derive(Debug, Error)]
pub enum EvaluatorError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Credential rejected by provider")]
    InvalidCredential,
}

/// Output of one (profile, posting) evaluation.
///
/// Always well-formed: when the provider's answer could not be parsed,
/// the evaluator substitutes neutral dimensions rather than failing, so
/// one garbled response never costs the whole batch.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub dimensions: DimensionScores,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub rationale: String,
    /// Provider-reported token usage for this call.
    pub tokens_used: u64,
}

impl Evaluation {
    /// Neutral evaluation used when the provider response is unusable.
    /// Tokens spent on the failed call are still accounted for.
    pub fn neutral(rationale: impl Into<String>, tokens_used: u64) -> Self {
        Self {
            dimensions: DimensionScores::neutral(),
            matched_skills: Vec::new(),
            missing_skills: Vec::new(),
            rationale: rationale.into(),
            tokens_used,
        }
    }
}

/// Pluggable reasoning-service client.
///
/// The credential is passed per call: keys are tenant-scoped and live in
/// the key vault, while one evaluator instance is shared across tenants.
#[async_trait]
pub trait Evaluator: Send + Sync {
    /// Evaluate one posting against a profile.
    async fn evaluate(
        &self,
        key: &SecretString,
        profile: &ProfileContext,
        posting: &PostingContext,
    ) -> Result<Evaluation, EvaluatorError>;

    /// Check that a credential is accepted by the provider.
    async fn verify(&self, key: &SecretString) -> Result<(), EvaluatorError>;
}

/// Extract a JSON object from model output (handles markdown code blocks).
pub(crate) fn extract_json(text: &str) -> String {
    if let Some(start) = text.find("```json") {
        if let Some(end) = text[start + 7..].find("```") {
            return text[start + 7..start + 7 + end].trim().to_string();
        }
    }

    if let Some(start) = text.find("```") {
        if let Some(end) = text[start + 3..].find("```") {
            return text[start + 3..start + 3 + end].trim().to_string();
        }
    }

    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        return text[start..=end].to_string();
    }

    text.to_string()
}

//! Batch scoring driver.

use secrecy::SecretString;
use std::sync::Arc;
use tracing::{debug, warn};

use scout_types::{Profile, RawPosting, ScoredPosting, ScoringSettings};

use crate::context::{PostingContext, ProfileContext};
use crate::evaluator::Evaluator;

/// Result of scoring one batch of postings.
#[derive(Debug, Default)]
pub struct ScoreOutcome {
    pub postings: Vec<ScoredPosting>,
    /// Total provider tokens consumed, including calls whose answers
    /// could not be parsed.
    pub tokens_used: u64,
}

/// Scores filtered postings against a profile via the evaluator.
///
/// A failed evaluation skips that posting and keeps going; a batch never
/// fails because of a single posting.
pub struct ScoringEngine {
    evaluator: Arc<dyn Evaluator>,
    description_budget: usize,
}

impl ScoringEngine {
    /// Create a scoring engine over the given evaluator.
    pub fn new(evaluator: Arc<dyn Evaluator>, settings: &ScoringSettings) -> Self {
        Self {
            evaluator,
            description_budget: settings.description_budget,
        }
    }

    /// Score a batch, producing one record per successfully evaluated
    /// posting in input order.
    pub async fn score_batch(
        &self,
        key: &SecretString,
        tenant_id: &str,
        run_id: &str,
        profile: &Profile,
        postings: Vec<RawPosting>,
    ) -> ScoreOutcome {
        let profile_ctx = ProfileContext::from_profile(profile);
        let mut outcome = ScoreOutcome::default();

        for posting in postings {
            let posting_ctx = PostingContext::from_posting(&posting, self.description_budget);

            match self
                .evaluator
                .evaluate(key, &profile_ctx, &posting_ctx)
                .await
            {
                Ok(evaluation) => {
                    outcome.tokens_used += evaluation.tokens_used;
                    let scored = ScoredPosting::new(
                        tenant_id,
                        run_id,
                        posting,
                        evaluation.dimensions,
                        evaluation.matched_skills,
                        evaluation.missing_skills,
                        evaluation.rationale,
                    );
                    debug!(
                        external_id = %scored.posting.external_id,
                        total = scored.total,
                        tier = %scored.tier,
                        "Scored posting"
                    );
                    outcome.postings.push(scored);
                }
                Err(e) => {
                    warn!(
                        title = %posting.title,
                        error = %e,
                        "Failed to score posting, skipping"
                    );
                }
            }
        }

        outcome
    }
}

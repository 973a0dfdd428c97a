//! Mock evaluator for testing.

use async_trait::async_trait;
use secrecy::SecretString;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use scout_types::DimensionScores;

use crate::context::{PostingContext, ProfileContext};

use super::{Evaluation, Evaluator, EvaluatorError};

/// Mock evaluator with scripted outcomes.
///
/// Scripted responses are consumed in order; once the script is empty
/// every call returns the fallback evaluation.
pub struct MockEvaluator {
    script: Mutex<VecDeque<Result<Evaluation, String>>>,
    fallback: Evaluation,
    verify_fails: AtomicBool,
    calls: AtomicUsize,
}

impl MockEvaluator {
    /// Create a mock returning a strong match on every call.
    pub fn new() -> Self {
        Self::with_evaluation(Evaluation {
            dimensions: DimensionScores {
                skill_match: 0.9,
                experience_level: 0.9,
                location_match: 0.9,
                salary_fit: 0.9,
                company_signals: 0.9,
                recency: 0.9,
            },
            matched_skills: vec!["rust".to_string()],
            missing_skills: Vec::new(),
            rationale: "Strong match".to_string(),
            tokens_used: 100,
        })
    }

    /// Create a mock returning the given evaluation on every call.
    pub fn with_evaluation(fallback: Evaluation) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback,
            verify_fails: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    /// Queue a specific evaluation for the next unscripted call.
    pub fn push_evaluation(&self, evaluation: Evaluation) {
        self.script.lock().unwrap().push_back(Ok(evaluation));
    }

    /// Queue `count` call failures.
    pub fn push_failures(&self, count: usize) {
        let mut script = self.script.lock().unwrap();
        for _ in 0..count {
            script.push_back(Err("injected evaluation failure".to_string()));
        }
    }

    /// Make `verify` reject every credential.
    pub fn set_verify_fails(&self, fails: bool) {
        self.verify_fails.store(fails, Ordering::SeqCst);
    }

    /// Number of evaluate calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Evaluator for MockEvaluator {
    async fn evaluate(
        &self,
        _key: &SecretString,
        _profile: &ProfileContext,
        _posting: &PostingContext,
    ) -> Result<Evaluation, EvaluatorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let scripted = self.script.lock().unwrap().pop_front();
        match scripted {
            Some(Ok(evaluation)) => Ok(evaluation),
            Some(Err(msg)) => Err(EvaluatorError::ApiError(msg)),
            None => Ok(self.fallback.clone()),
        }
    }

    async fn verify(&self, _key: &SecretString) -> Result<(), EvaluatorError> {
        if self.verify_fails.load(Ordering::SeqCst) {
            Err(EvaluatorError::InvalidCredential)
        } else {
            Ok(())
        }
    }
}

//! Scoring for jobscout.
//!
//! Wraps the reasoning service behind a pluggable [`Evaluator`] trait and
//! drives it per posting:
//! - [`ApiEvaluator`]: OpenAI-compatible chat completions with bounded
//!   retry; lenient response parsing with a neutral fallback
//! - [`MockEvaluator`] for tests
//! - [`ScoringEngine`]: batch driver that skips failed postings and
//!   accumulates token usage

pub mod context;
pub mod evaluator;
pub mod scorer;

pub use context::{PostingContext, ProfileContext};
pub use evaluator::{ApiEvaluator, Evaluation, Evaluator, EvaluatorError, MockEvaluator};
pub use scorer::{ScoreOutcome, ScoringEngine};

//! API-based evaluator using OpenAI-compatible chat completions.

use async_trait::async_trait;
use backoff::{backoff::Backoff, ExponentialBackoff};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};

use scout_types::{DimensionScores, ScoringSettings, NEUTRAL_SCORE};

use crate::context::{PostingContext, ProfileContext};

use super::{extract_json, Evaluation, Evaluator, EvaluatorError};

/// Per-dimension payload the model is asked to return. Every field is
/// optional; missing dimensions fall back to neutral.
#[derive(Debug, Deserialize)]
struct RawScores {
    skill_match: Option<f64>,
    experience_level: Option<f64>,
    location_match: Option<f64>,
    salary_fit: Option<f64>,
    company_signals: Option<f64>,
    recency: Option<f64>,
    #[serde(default)]
    matched_skills: Vec<String>,
    #[serde(default)]
    missing_skills: Vec<String>,
    #[serde(default)]
    explanation: String,
}

/// Evaluator backed by an OpenAI-compatible chat-completions endpoint.
pub struct ApiEvaluator {
    client: Client,
    base_url: String,
    model: String,
    max_retries: u32,
}

impl ApiEvaluator {
    /// Create a new API evaluator.
    pub fn new(settings: &ScoringSettings) -> Result<Self, EvaluatorError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| EvaluatorError::ConfigError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            max_retries: settings.max_retries,
        })
    }

    /// Build the match-analysis prompt for one (profile, posting) pair.
    fn build_prompt(&self, profile: &ProfileContext, posting: &PostingContext) -> String {
        format!(
            r#"Analyze how well this job matches the candidate's profile.

CANDIDATE PROFILE:
Skills: {skills}
Summary: {summary}
Experience: {experience_count} positions

JOB POSTING:
Title: {title}
Company: {company}
Location: {location}
Salary: ${salary_min} - ${salary_max}
Description: {description}

Score each dimension from 0.0 to 1.0:
1. skill_match: How well do the candidate's skills match the job requirements?
2. experience_level: Does the experience level align?
3. location_match: Is the location/remote situation a good fit?
4. salary_fit: Is the salary competitive for the role?
5. company_signals: Any positive/negative company signals?
6. recency: Is this a recently posted position?

Also list:
- matched_skills: Skills from the candidate that match the job
- missing_skills: Important skills the candidate lacks
- explanation: Brief explanation of the match quality

Respond in JSON format only."#,
            skills = profile.skills.join(", "),
            summary = profile.summary,
            experience_count = profile.experience_count,
            title = posting.title,
            company = posting.company,
            location = posting.location,
            salary_min = salary_text(posting.salary_min),
            salary_max = salary_text(posting.salary_max),
            description = posting.description,
        )
    }

    /// Call the API with retry logic.
    async fn call_api(
        &self,
        key: &SecretString,
        prompt: &str,
    ) -> Result<(String, u64), EvaluatorError> {
        let mut backoff = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(120)),
            ..Default::default()
        };

        let mut attempts = 0;

        loop {
            attempts += 1;
            debug!(attempt = attempts, "Calling scoring API");

            match self.make_request(key, prompt).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    // A rejected credential will not improve on retry
                    if matches!(e, EvaluatorError::InvalidCredential) {
                        return Err(e);
                    }

                    if attempts >= self.max_retries {
                        error!(error = %e, "Max retries exceeded");
                        return Err(e);
                    }

                    match backoff.next_backoff() {
                        Some(duration) => {
                            warn!(
                                error = %e,
                                retry_in_ms = duration.as_millis(),
                                "Scoring call failed, retrying"
                            );
                            tokio::time::sleep(duration).await;
                        }
                        None => {
                            error!(error = %e, "Backoff exhausted");
                            return Err(e);
                        }
                    }
                }
            }
        }
    }

    /// Make a single chat-completions request. Returns the message content
    /// and reported token usage.
    async fn make_request(
        &self,
        key: &SecretString,
        prompt: &str,
    ) -> Result<(String, u64), EvaluatorError> {
        #[derive(Serialize)]
        struct ChatRequest {
            model: String,
            messages: Vec<ChatMessage>,
            temperature: f64,
            max_tokens: u32,
        }

        #[derive(Serialize)]
        struct ChatMessage {
            role: String,
            content: String,
        }

        #[derive(Deserialize)]
        struct ChatResponse {
            choices: Vec<ChatChoice>,
            usage: Option<ChatUsage>,
        }

        #[derive(Deserialize)]
        struct ChatChoice {
            message: ChatMessageResponse,
        }

        #[derive(Deserialize)]
        struct ChatMessageResponse {
            content: String,
        }

        #[derive(Deserialize)]
        struct ChatUsage {
            total_tokens: u64,
        }

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: "You are a job matching analyst. Respond only with valid JSON."
                        .to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: 0.3,
            max_tokens: 1000,
        };

        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", key.expose_secret()))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| EvaluatorError::ApiError(e.to_string()))?;

        if response.status() == 429 {
            return Err(EvaluatorError::RateLimitExceeded);
        }

        if response.status() == 401 || response.status() == 403 {
            return Err(EvaluatorError::InvalidCredential);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EvaluatorError::ApiError(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| EvaluatorError::ParseError(e.to_string()))?;

        let tokens = body.usage.map(|u| u.total_tokens).unwrap_or(0);

        body.choices
            .into_iter()
            .next()
            .map(|c| (c.message.content, tokens))
            .ok_or_else(|| EvaluatorError::ParseError("No choices in response".to_string()))
    }
}

fn salary_text(value: Option<f64>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

/// Parse model output into an evaluation. Never fails: missing dimensions
/// default to neutral, and a fully unparseable answer becomes a neutral
/// evaluation carrying the parse error in its rationale.
fn parse_evaluation(content: &str, tokens_used: u64) -> Evaluation {
    let json_str = extract_json(content);

    match serde_json::from_str::<RawScores>(&json_str) {
        Ok(raw) => Evaluation {
            dimensions: DimensionScores {
                skill_match: raw.skill_match.unwrap_or(NEUTRAL_SCORE),
                experience_level: raw.experience_level.unwrap_or(NEUTRAL_SCORE),
                location_match: raw.location_match.unwrap_or(NEUTRAL_SCORE),
                salary_fit: raw.salary_fit.unwrap_or(NEUTRAL_SCORE),
                company_signals: raw.company_signals.unwrap_or(NEUTRAL_SCORE),
                recency: raw.recency.unwrap_or(NEUTRAL_SCORE),
            },
            matched_skills: raw.matched_skills,
            missing_skills: raw.missing_skills,
            rationale: raw.explanation,
            tokens_used,
        },
        Err(e) => Evaluation::neutral(
            format!("Could not parse scoring response: {}", e),
            tokens_used,
        ),
    }
}

#[async_trait]
impl Evaluator for ApiEvaluator {
    async fn evaluate(
        &self,
        key: &SecretString,
        profile: &ProfileContext,
        posting: &PostingContext,
    ) -> Result<Evaluation, EvaluatorError> {
        let prompt = self.build_prompt(profile, posting);
        let (content, tokens_used) = self.call_api(key, &prompt).await?;
        Ok(parse_evaluation(&content, tokens_used))
    }

    async fn verify(&self, key: &SecretString) -> Result<(), EvaluatorError> {
        let url = format!("{}/models", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", key.expose_secret()))
            .send()
            .await
            .map_err(|e| EvaluatorError::ApiError(e.to_string()))?;

        if response.status() == 401 || response.status() == 403 {
            return Err(EvaluatorError::InvalidCredential);
        }

        if !response.status().is_success() {
            return Err(EvaluatorError::ApiError(format!(
                "HTTP {}",
                response.status()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(base_url: &str) -> ScoringSettings {
        ScoringSettings {
            base_url: base_url.to_string(),
            ..Default::default()
        }
    }

    fn profile_ctx() -> ProfileContext {
        ProfileContext {
            skills: vec!["rust".to_string(), "postgres".to_string()],
            summary: "Backend engineer".to_string(),
            experience_count: 3,
        }
    }

    fn posting_ctx() -> PostingContext {
        PostingContext {
            title: "Rust Developer".to_string(),
            company: "Acme".to_string(),
            location: "Remote".to_string(),
            salary_min: Some(140_000.0),
            salary_max: None,
            description: "Ship Rust services".to_string(),
        }
    }

    fn chat_body(content: &str, tokens: u64) -> serde_json::Value {
        serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": content}}],
            "usage": {"prompt_tokens": tokens / 2, "completion_tokens": tokens / 2, "total_tokens": tokens}
        })
    }

    #[test]
    fn test_prompt_contains_profile_and_posting() {
        let evaluator = ApiEvaluator::new(&ScoringSettings::default()).unwrap();
        let prompt = evaluator.build_prompt(&profile_ctx(), &posting_ctx());

        assert!(prompt.contains("Skills: rust, postgres"));
        assert!(prompt.contains("Experience: 3 positions"));
        assert!(prompt.contains("Title: Rust Developer"));
        assert!(prompt.contains("Salary: $140000 - $N/A"));
        assert!(prompt.contains("Respond in JSON format only."));
    }

    #[test]
    fn test_parse_full_response() {
        let content = r#"{
            "skill_match": 0.9,
            "experience_level": 0.8,
            "location_match": 1.0,
            "salary_fit": 0.7,
            "company_signals": 0.6,
            "recency": 0.5,
            "matched_skills": ["rust"],
            "missing_skills": ["kubernetes"],
            "explanation": "Solid fit"
        }"#;

        let eval = parse_evaluation(content, 120);
        assert!((eval.dimensions.skill_match - 0.9).abs() < f64::EPSILON);
        assert_eq!(eval.matched_skills, vec!["rust"]);
        assert_eq!(eval.missing_skills, vec!["kubernetes"]);
        assert_eq!(eval.rationale, "Solid fit");
        assert_eq!(eval.tokens_used, 120);
    }

    #[test]
    fn test_parse_missing_dimensions_default_to_neutral() {
        let eval = parse_evaluation(r#"{"skill_match": 0.9}"#, 50);
        assert!((eval.dimensions.skill_match - 0.9).abs() < f64::EPSILON);
        assert!((eval.dimensions.recency - 0.5).abs() < f64::EPSILON);
        assert!((eval.dimensions.salary_fit - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_garbage_yields_neutral_with_tokens() {
        let eval = parse_evaluation("I think this job looks great for you!", 80);
        assert!((eval.dimensions.skill_match - 0.5).abs() < f64::EPSILON);
        assert!(eval.rationale.starts_with("Could not parse scoring response:"));
        assert_eq!(eval.tokens_used, 80);
    }

    #[test]
    fn test_parse_handles_markdown_fences() {
        let content = "```json\n{\"skill_match\": 0.75}\n```";
        let eval = parse_evaluation(content, 60);
        assert!((eval.dimensions.skill_match - 0.75).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_evaluate_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer sk-test"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(chat_body(r#"{"skill_match": 1.0, "explanation": "ok"}"#, 90)),
            )
            .mount(&server)
            .await;

        let evaluator = ApiEvaluator::new(&settings(&server.uri())).unwrap();
        let key = SecretString::from("sk-test");
        let eval = evaluator
            .evaluate(&key, &profile_ctx(), &posting_ctx())
            .await
            .unwrap();

        assert!((eval.dimensions.skill_match - 1.0).abs() < f64::EPSILON);
        assert_eq!(eval.tokens_used, 90);
    }

    #[tokio::test]
    async fn test_evaluate_rejected_credential_fails_fast() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let evaluator = ApiEvaluator::new(&settings(&server.uri())).unwrap();
        let key = SecretString::from("sk-bad");
        let result = evaluator.evaluate(&key, &profile_ctx(), &posting_ctx()).await;

        assert!(matches!(result, Err(EvaluatorError::InvalidCredential)));
    }

    #[tokio::test]
    async fn test_verify_accepts_and_rejects() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/models"))
            .and(header("Authorization", "Bearer sk-good"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/models"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let evaluator = ApiEvaluator::new(&settings(&server.uri())).unwrap();

        assert!(evaluator.verify(&SecretString::from("sk-good")).await.is_ok());
        assert!(matches!(
            evaluator.verify(&SecretString::from("sk-bad")).await,
            Err(EvaluatorError::InvalidCredential)
        ));
    }
}

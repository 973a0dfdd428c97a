//! HTTP posting source against a job-board aggregation API.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use scout_types::{RawPosting, SourceSettings};

use crate::error::SourceError;
use crate::source::{FetchSlice, PostingSource};

const USER_AGENT: &str = concat!("jobscout/", env!("CARGO_PKG_VERSION"));

/// Raw posting row as returned by the aggregation API.
#[derive(Debug, Deserialize)]
struct WireJob {
    id: Option<String>,
    title: Option<String>,
    company: Option<String>,
    location: Option<String>,
    min_amount: Option<f64>,
    max_amount: Option<f64>,
    description: Option<String>,
    job_url: Option<String>,
    site: Option<String>,
}

/// Posting source backed by an HTTP aggregation service.
pub struct HttpPostingSource {
    client: Client,
    base_url: String,
}

impl HttpPostingSource {
    /// Create a new HTTP posting source.
    pub fn new(settings: &SourceSettings) -> Result<Self, SourceError> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .user_agent(USER_AGENT);

        if let Some(proxy_url) = &settings.proxy_url {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| SourceError::ConfigError(format!("bad proxy url: {}", e)))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| SourceError::ConfigError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl PostingSource for HttpPostingSource {
    async fn fetch(&self, slice: &FetchSlice) -> Result<Vec<RawPosting>, SourceError> {
        #[derive(Serialize)]
        struct SearchRequest<'a> {
            sources: &'a [String],
            search_term: &'a str,
            location: &'a str,
            is_remote: bool,
            results_wanted: u32,
            easy_apply: bool,
        }

        #[derive(Deserialize)]
        struct SearchResponse {
            jobs: Vec<WireJob>,
        }

        let request = SearchRequest {
            sources: &slice.sources,
            search_term: &slice.search_term,
            location: &slice.location,
            is_remote: slice.remote_only,
            results_wanted: slice.results_wanted,
            easy_apply: true,
        };

        let url = format!("{}/search", self.base_url);
        debug!(
            search_term = %slice.search_term,
            location = %slice.location,
            "Fetching postings"
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| SourceError::ApiError(e.to_string()))?;

        if response.status() == 429 {
            return Err(SourceError::RateLimited);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::ApiError(format!("HTTP {}: {}", status, body)));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| SourceError::ParseError(e.to_string()))?;

        Ok(body.jobs.into_iter().filter_map(normalize).collect())
    }
}

/// Normalize a wire row into a [`RawPosting`].
///
/// External id falls back to the posting URL; rows with neither are
/// unaddressable and dropped. Missing titles become "Unknown Position".
fn normalize(job: WireJob) -> Option<RawPosting> {
    let external_id = job.id.or_else(|| job.job_url.clone())?;

    Some(RawPosting {
        external_id,
        title: job.title.unwrap_or_else(|| "Unknown Position".to_string()),
        company: job.company,
        location: job.location,
        salary_min: job.min_amount,
        salary_max: job.max_amount,
        description: job.description,
        url: job.job_url,
        source: job.site,
    })
}

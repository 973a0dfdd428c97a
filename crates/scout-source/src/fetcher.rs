//! Cross-product fetch with bounded retry.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

use scout_types::{RawPosting, SearchCriteria, SourceSettings};

use crate::source::{FetchSlice, PostingSource};

/// Drives the posting source over the (term, location) cross-product,
/// retrying each slice with exponential backoff.
///
/// Retry contract per slice: up to `max_retries` attempts, sleeping
/// `backoff_base^attempt` seconds between them, no jitter. Exhausting
/// every attempt yields an empty slice, never an error; provider rate
/// limits make "nothing for this slice" a normal outcome.
pub struct Fetcher {
    source: Arc<dyn PostingSource>,
    max_retries: u32,
    backoff_base: f64,
    results_per_slice: u32,
}

impl Fetcher {
    /// Create a fetcher over the given source.
    pub fn new(source: Arc<dyn PostingSource>, settings: &SourceSettings) -> Self {
        Self {
            source,
            max_retries: settings.max_retries,
            backoff_base: settings.backoff_base,
            results_per_slice: settings.results_per_slice,
        }
    }

    /// Fetch all postings for the criteria, deduplicated by external id.
    ///
    /// Slices run in order; the first occurrence of each external id wins.
    pub async fn fetch_all(&self, criteria: &SearchCriteria) -> Vec<RawPosting> {
        let terms = criteria.terms_or_default();
        let locations = criteria.locations_or_default();

        let mut seen: HashSet<String> = HashSet::new();
        let mut all = Vec::new();

        for term in &terms {
            for location in &locations {
                let slice = FetchSlice {
                    search_term: term.clone(),
                    location: location.clone(),
                    sources: criteria.sources.clone(),
                    remote_only: criteria.remote_only,
                    results_wanted: self.results_per_slice,
                };

                let postings = self.fetch_slice(&slice).await;
                debug!(
                    term = %slice.search_term,
                    location = %slice.location,
                    count = postings.len(),
                    "Fetched slice"
                );

                for posting in postings {
                    if seen.insert(posting.external_id.clone()) {
                        all.push(posting);
                    }
                }
            }
        }

        all
    }

    /// Fetch one slice, absorbing failures into an empty result.
    async fn fetch_slice(&self, slice: &FetchSlice) -> Vec<RawPosting> {
        for attempt in 0..self.max_retries {
            match self.source.fetch(slice).await {
                Ok(postings) => return postings,
                Err(e) => {
                    if attempt + 1 < self.max_retries {
                        let wait = self.backoff_base.powi(attempt as i32);
                        warn!(
                            term = %slice.search_term,
                            location = %slice.location,
                            attempt = attempt + 1,
                            wait_secs = wait,
                            error = %e,
                            "Slice fetch failed, retrying"
                        );
                        tokio::time::sleep(Duration::from_secs_f64(wait)).await;
                    } else {
                        error!(
                            term = %slice.search_term,
                            location = %slice.location,
                            attempts = self.max_retries,
                            error = %e,
                            "Slice fetch failed after all attempts"
                        );
                    }
                }
            }
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockPostingSource;
    use pretty_assertions::assert_eq;

    fn settings() -> SourceSettings {
        SourceSettings::default()
    }

    fn criteria_with(terms: &[&str], locations: &[&str]) -> SearchCriteria {
        SearchCriteria {
            search_terms: terms.iter().map(|s| s.to_string()).collect(),
            locations: locations.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_fetch_all_covers_cross_product() {
        let source = Arc::new(MockPostingSource::new());
        let fetcher = Fetcher::new(source.clone(), &settings());

        let criteria = criteria_with(&["rust", "go"], &["Remote", "Austin, TX"]);
        fetcher.fetch_all(&criteria).await;

        // 2 terms x 2 locations, one call each
        assert_eq!(source.call_count(), 4);
    }

    #[tokio::test]
    async fn test_fetch_all_defaults_term_and_location() {
        let source = Arc::new(MockPostingSource::new());
        let fetcher = Fetcher::new(source.clone(), &settings());

        fetcher.fetch_all(&SearchCriteria::default()).await;
        assert_eq!(source.call_count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_all_dedupes_across_slices() {
        let source = Arc::new(MockPostingSource::with_postings(vec![
            RawPosting::new("j-1", "Engineer"),
            RawPosting::new("j-2", "Developer"),
        ]));
        let fetcher = Fetcher::new(source, &settings());

        // Two slices return the same postings; each id kept once
        let criteria = criteria_with(&["rust"], &["Remote", "Austin, TX"]);
        let postings = fetcher.fetch_all(&criteria).await;

        assert_eq!(postings.len(), 2);
        assert_eq!(postings[0].external_id, "j-1");
        assert_eq!(postings[1].external_id, "j-2");
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_succeeds_on_final_attempt() {
        let source = Arc::new(MockPostingSource::with_postings(vec![RawPosting::new(
            "j-1", "Engineer",
        )]));
        source.push_failures(2);
        let fetcher = Fetcher::new(source.clone(), &settings());

        let started = tokio::time::Instant::now();
        let postings = fetcher.fetch_all(&criteria_with(&["rust"], &["Remote"])).await;

        assert_eq!(postings.len(), 1);
        assert_eq!(source.call_count(), 3);
        // Backoff waits: 2^0 + 2^1 seconds
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_exhaustion_yields_empty_slice() {
        let source = Arc::new(MockPostingSource::new());
        source.push_failures(3);
        let fetcher = Fetcher::new(source.clone(), &settings());

        let started = tokio::time::Instant::now();
        let postings = fetcher.fetch_all(&criteria_with(&["rust"], &["Remote"])).await;

        assert!(postings.is_empty());
        assert_eq!(source.call_count(), 3);
        // No sleep after the final attempt
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_slice_does_not_poison_later_slices() {
        let source = Arc::new(MockPostingSource::with_postings(vec![RawPosting::new(
            "j-1", "Engineer",
        )]));
        // First slice exhausts all three attempts, second succeeds
        source.push_failures(3);
        let fetcher = Fetcher::new(source.clone(), &settings());

        let criteria = criteria_with(&["rust"], &["Remote", "Austin, TX"]);
        let postings = fetcher.fetch_all(&criteria).await;

        assert_eq!(postings.len(), 1);
        assert_eq!(source.call_count(), 4);
    }
}

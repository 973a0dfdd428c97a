//! Pluggable posting-source trait.

use async_trait::async_trait;

use scout_types::RawPosting;

use crate::error::SourceError;

/// One (term, location) request of the fetch cross-product.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchSlice {
    /// Search term, e.g. "rust developer"
    pub search_term: String,

    /// Location query, e.g. "Remote" or "New York, NY"
    pub location: String,

    /// Job boards to query, e.g. ["indeed", "linkedin"]
    pub sources: Vec<String>,

    /// Restrict results to remote roles
    pub remote_only: bool,

    /// Maximum results requested for this slice
    pub results_wanted: u32,
}

/// Pluggable posting source.
///
/// Implementations perform a single slice fetch with no retry of their
/// own; bounded retry with backoff lives in [`Fetcher`].
///
/// [`Fetcher`]: crate::fetcher::Fetcher
#[async_trait]
pub trait PostingSource: Send + Sync {
    /// Fetch postings for one slice. An empty vec is a normal outcome.
    async fn fetch(&self, slice: &FetchSlice) -> Result<Vec<RawPosting>, SourceError>;
}

//! Posting acquisition for jobscout.
//!
//! This crate wraps the external job-board aggregation service behind a
//! pluggable [`PostingSource`] trait and layers the run-facing behavior
//! on top:
//! - [`Fetcher`]: (term, location) cross-product with bounded retry and
//!   exponential backoff, deduplicating results by external id
//! - [`filter`]: pure predicate filters (keywords, seniority, geography
//!   heuristic, salary band) applied after fetch
//! - [`HttpPostingSource`] for production, [`MockPostingSource`] for tests

pub mod error;
pub mod fetcher;
pub mod filter;
pub mod http;
pub mod mock;
pub mod source;

pub use error::SourceError;
pub use fetcher::Fetcher;
pub use filter::{apply_filters, passes_filters};
pub use http::HttpPostingSource;
pub use mock::MockPostingSource;
pub use source::{FetchSlice, PostingSource};

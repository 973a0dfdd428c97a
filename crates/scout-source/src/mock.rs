//! Mock posting source for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use scout_types::RawPosting;

use crate::error::SourceError;
use crate::source::{FetchSlice, PostingSource};

/// Mock posting source with scripted outcomes.
///
/// Scripted responses are consumed in order; once the script is empty
/// every call returns the fallback postings. Useful for exercising retry
/// behavior without network access.
pub struct MockPostingSource {
    script: Mutex<VecDeque<Result<Vec<RawPosting>, String>>>,
    fallback: Vec<RawPosting>,
    calls: AtomicUsize,
}

impl MockPostingSource {
    /// Create a mock that returns no postings.
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Vec::new(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Create a mock that returns the given postings on every call.
    pub fn with_postings(postings: Vec<RawPosting>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: postings,
            calls: AtomicUsize::new(0),
        }
    }

    /// Queue a successful response for the next unscripted call.
    pub fn push_postings(&self, postings: Vec<RawPosting>) {
        self.script.lock().unwrap().push_back(Ok(postings));
    }

    /// Queue `count` failures before falling through to later entries.
    pub fn push_failures(&self, count: usize) {
        let mut script = self.script.lock().unwrap();
        for _ in 0..count {
            script.push_back(Err("injected source failure".to_string()));
        }
    }

    /// Number of fetch calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockPostingSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PostingSource for MockPostingSource {
    async fn fetch(&self, _slice: &FetchSlice) -> Result<Vec<RawPosting>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let scripted = self.script.lock().unwrap().pop_front();
        match scripted {
            Some(Ok(postings)) => Ok(postings),
            Some(Err(msg)) => Err(SourceError::ApiError(msg)),
            None => Ok(self.fallback.clone()),
        }
    }
}

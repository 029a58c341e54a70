//! Search Client port.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single search result row, projected from whatever the backend returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub url: String,
    pub title: String,
    pub snippet: String,
}

/// Issues a query against an external search backend and returns candidate
/// URLs. Two identical queries may return different results — callers must
/// not assume determinism.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<SearchHit>>;
}

/// Best-effort relevance filter over raw search hits, backed by an
/// external filter LLM. On failure the caller falls back to the
/// unfiltered, truncated list — this trait's contract is "never worse than
/// doing nothing", so implementations should swallow their own parse
/// errors internally rather than propagate them.
#[async_trait]
pub trait ResultFilter: Send + Sync {
    async fn filter(&self, query: &str, hits: Vec<SearchHit>, max_results: u32) -> Vec<SearchHit>;
}

/// Default filter that performs no filtering beyond truncation — used when
/// no filter LLM is configured.
pub struct NoopFilter;

#[async_trait]
impl ResultFilter for NoopFilter {
    async fn filter(&self, _query: &str, hits: Vec<SearchHit>, max_results: u32) -> Vec<SearchHit> {
        hits.into_iter().take(max_results as usize).collect()
    }
}

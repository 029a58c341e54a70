//! Content Fetcher port.

use crate::error::Result;
use async_trait::async_trait;

/// Coarse classification of a fetched response's body, derived from the
/// response's `Content-Type` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Html,
    Pdf,
    Other,
}

/// The result of a single fetch attempt. A non-2xx response or network error
/// is represented as `Other` with empty `bytes` and the observed status (or
/// `0` for a transport-level failure) rather than as an `Err` — fetch
/// failures never raise, they are reported as data.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub bytes: Vec<u8>,
    pub kind: ContentKind,
    pub status: u16,
}

impl FetchOutcome {
    pub fn failure(status: u16) -> Self {
        Self {
            bytes: Vec::new(),
            kind: ContentKind::Other,
            status,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Fetches a single URL's bytes and classifies its content type.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchOutcome>;
}

/// Optional drop-in replacement fetch path for JavaScript-rendered pages.
/// Not implemented by this workspace's default `explorer-fetch` client — a
/// caller may plug in a headless-browser-backed implementation without
/// `explorer-fetch` itself depending on a browser automation stack.
#[async_trait]
pub trait JsRenderFallback: Send + Sync {
    async fn render(&self, url: &str) -> Result<FetchOutcome>;
}

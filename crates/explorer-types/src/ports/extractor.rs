//! Content Extractor port.

use crate::error::Result;
use crate::model::ScrapeResult;
use crate::ports::fetch::ContentKind;
use async_trait::async_trait;

/// Extracts title/description/main text from a fetched response body.
///
/// Malformed input is not fatal: implementations return `Err` only for
/// genuinely unsupported content (`ContentKind::Other`); a page that parses
/// but yields nothing usable returns `Ok(ScrapeResult)` with an empty `text`.
#[async_trait]
pub trait ContentExtractor: Send + Sync {
    async fn extract(&self, bytes: &[u8], kind: ContentKind, url: &str) -> Result<ScrapeResult>;
}

//! `ContentFetcher` adapter over [`explorer_reliability::HttpClientService`].

use async_trait::async_trait;
use explorer_reliability::{FetchOptions, HttpClientService, HttpConfig};
use explorer_types::ports::{ContentFetcher, ContentKind, FetchOutcome};
use explorer_types::{ExplorerError, Result};

/// Browser-like headers so search-discovered pages don't immediately bounce
/// off bot-detection middleware.
const USER_AGENT: &str =
    "Mozilla/5.0 (compatible; ExplorerEngine/0.1; +https://example.invalid/bot)";
const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,application/pdf;q=0.8,*/*;q=0.7";
const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

pub struct ReqwestContentFetcher {
    http: HttpClientService,
}

impl ReqwestContentFetcher {
    /// `timeout_secs` should fall in the 10-30s range.
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let config = HttpConfig {
            timeout_ms: timeout_secs * 1000,
            ..HttpConfig::default()
        };
        let http = HttpClientService::new(config)
            .map_err(|e| ExplorerError::Fetch {
                url: String::new(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { http })
    }
}

impl Default for ReqwestContentFetcher {
    fn default() -> Self {
        Self::new(20).expect("default HTTP client configuration is always valid")
    }
}

fn classify(content_type: Option<&str>, status: reqwest::StatusCode) -> ContentKind {
    if !status.is_success() && !status.is_redirection() {
        return ContentKind::Other;
    }
    match content_type {
        Some(ct) if ct.contains("application/pdf") => ContentKind::Pdf,
        _ => ContentKind::Html,
    }
}

#[async_trait]
impl ContentFetcher for ReqwestContentFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchOutcome> {
        let options = FetchOptions::default()
            .add_header("User-Agent".to_string(), USER_AGENT.to_string())
            .add_header("Accept".to_string(), ACCEPT.to_string())
            .add_header("Accept-Language".to_string(), ACCEPT_LANGUAGE.to_string());

        let response = match self.http.get(url, options).await {
            Ok(response) => response,
            Err(err) => {
                tracing::debug!(url, error = %err, "content fetch failed, returning status 0");
                return Ok(FetchOutcome::failure(0));
            }
        };

        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let kind = classify(content_type.as_deref(), status);

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(err) => {
                tracing::debug!(url, error = %err, "failed to read response body");
                return Ok(FetchOutcome::failure(status.as_u16()));
            }
        };

        Ok(FetchOutcome {
            bytes,
            kind,
            status: status.as_u16(),
        })
    }
}

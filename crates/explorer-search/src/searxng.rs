//! SearXNG-backed `SearchProvider`: a single `reqwest` client,
//! builder-style construction, throttle-then-retry control flow over
//! SearXNG's GET/query-string search API.

use crate::throttle::Throttle;
use async_trait::async_trait;
use explorer_types::ports::{SearchHit, SearchProvider};
use explorer_types::{ExplorerError, Result};
use serde::Deserialize;
use std::time::Duration;

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/129.0.0.0 Safari/537.36";

/// SearXNG client configuration. Distinct from the orchestrator's outer
/// `ExplorerConfig::max_retries` (default 5, the outer retrieval-retry
/// depth): this is the per-request retry budget for a single search call,
/// defaulting to 3.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub host: String,
    pub min_delay_between_requests: Duration,
    pub max_retries: u32,
    pub timeout: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:8080".to_string(),
            min_delay_between_requests: Duration::from_secs(5),
            max_retries: 3,
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearxngResponse {
    #[serde(default)]
    results: Vec<SearxngResult>,
}

#[derive(Debug, Deserialize)]
struct SearxngResult {
    #[serde(default)]
    url: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
}

pub struct SearxngProvider {
    config: SearchConfig,
    client: reqwest::Client,
    throttle: Throttle,
    search_url: String,
}

impl SearxngProvider {
    pub fn new(config: SearchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ExplorerError::Search(format!("failed to build HTTP client: {e}")))?;
        let search_url = if config.host.ends_with("/search") {
            config.host.clone()
        } else if config.host.ends_with('/') {
            format!("{}search", config.host)
        } else {
            format!("{}/search", config.host)
        };
        let throttle = Throttle::new(config.min_delay_between_requests);
        Ok(Self {
            config,
            client,
            throttle,
            search_url,
        })
    }
}

#[async_trait]
impl SearchProvider for SearxngProvider {
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<SearchHit>> {
        if query.trim().is_empty() {
            return Err(ExplorerError::InvalidArgument(
                "search query cannot be empty".to_string(),
            ));
        }

        for attempt in 0..self.config.max_retries {
            self.throttle.acquire().await;

            let response = self
                .client
                .get(&self.search_url)
                .header("User-Agent", USER_AGENT)
                .header("Accept", "application/json")
                .query(&[("q", query), ("format", "json"), ("safesearch", "0")])
                .send()
                .await;

            match response {
                Ok(response) if response.status().is_success() => {
                    let parsed: SearxngResponse = match response.json().await {
                        Ok(parsed) => parsed,
                        Err(err) => {
                            tracing::warn!(query, error = %err, "failed to parse SearXNG response");
                            return Ok(Vec::new());
                        }
                    };
                    let hits = parsed
                        .results
                        .into_iter()
                        .take(max_results as usize)
                        .map(|r| SearchHit {
                            url: r.url,
                            title: r.title,
                            snippet: r.content,
                        })
                        .collect();
                    return Ok(hits);
                }
                Ok(response) => {
                    tracing::debug!(query, status = %response.status(), attempt, "SearXNG returned non-2xx");
                }
                Err(err) => {
                    tracing::debug!(query, error = %err, attempt, "SearXNG request failed");
                }
            }

            if attempt + 1 < self.config.max_retries {
                let backoff = Duration::from_secs(5 * 2u64.pow(attempt));
                tokio::time::sleep(backoff).await;
            }
        }

        tracing::warn!(query, max_retries = self.config.max_retries, "search exhausted retries");
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_config(host: String) -> SearchConfig {
        SearchConfig {
            host,
            min_delay_between_requests: Duration::from_millis(1),
            max_retries: 2,
            timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn parses_results_and_applies_max_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "rust async"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [
                    {"url": "https://a.test", "title": "A", "content": "about a"},
                    {"url": "https://b.test", "title": "B", "content": "about b"},
                ]
            })))
            .mount(&server)
            .await;

        let provider = SearxngProvider::new(fast_config(server.uri())).unwrap();
        let hits = provider.search("rust async", 1).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].url, "https://a.test");
    }

    #[tokio::test]
    async fn empty_query_is_rejected() {
        let provider = SearxngProvider::new(fast_config("http://127.0.0.1:1".to_string())).unwrap();
        let result = provider.search("  ", 5).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn exhausting_retries_returns_empty_list_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let provider = SearxngProvider::new(fast_config(server.uri())).unwrap();
        let hits = provider.search("anything", 5).await.unwrap();
        assert!(hits.is_empty());
    }
}

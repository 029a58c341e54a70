//! Configuration for the Explorer Engine, loaded from `EXPLORER_*`
//! environment variables.

mod env;

pub use env::{EnvConfigLoader, EnvError};

use std::time::Duration;

/// Every configuration key the Explorer Engine exposes, with its default
/// value (or the midpoint of a stated range).
#[derive(Debug, Clone)]
pub struct ExplorerConfig {
    pub searxng_host: String,
    pub vector_index_name: String,
    pub chunk_size: u32,
    pub overlap: u32,
    pub ingest_similarity_threshold: f32,
    pub retrieve_score_threshold: f32,
    pub max_retries: u32,
    pub query_batch_size: usize,
    pub max_concurrent_urls: usize,
    pub min_delay_between_requests: Duration,
    pub upsert_batch_size: usize,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            searxng_host: "http://localhost:8080".to_string(),
            vector_index_name: "Search".to_string(),
            chunk_size: 400,
            overlap: 50,
            ingest_similarity_threshold: 0.38,
            retrieve_score_threshold: 0.50,
            max_retries: 5,
            query_batch_size: 10,
            max_concurrent_urls: 30,
            min_delay_between_requests: Duration::from_secs(5),
            upsert_batch_size: 96,
        }
    }
}

impl ExplorerConfig {
    /// Load configuration from `EXPLORER_*` environment variables, falling
    /// back to the default for anything unset.
    pub fn from_env() -> Result<Self, EnvError> {
        let defaults = Self::default();
        let loader = EnvConfigLoader::new("EXPLORER_")
            .default("searxng_host", &defaults.searxng_host)
            .default("vector_index_name", &defaults.vector_index_name)
            .default("chunk_size", defaults.chunk_size.to_string())
            .default("overlap", defaults.overlap.to_string())
            .default(
                "ingest_similarity_threshold",
                defaults.ingest_similarity_threshold.to_string(),
            )
            .default(
                "retrieve_score_threshold",
                defaults.retrieve_score_threshold.to_string(),
            )
            .default("max_retries", defaults.max_retries.to_string())
            .default("query_batch_size", defaults.query_batch_size.to_string())
            .default(
                "max_concurrent_urls",
                defaults.max_concurrent_urls.to_string(),
            )
            .default(
                "min_delay_between_requests",
                defaults.min_delay_between_requests.as_secs().to_string(),
            )
            .default("upsert_batch_size", defaults.upsert_batch_size.to_string());

        Ok(Self {
            searxng_host: loader.get("searxng_host")?,
            vector_index_name: loader.get("vector_index_name")?,
            chunk_size: loader.get_u32("chunk_size")?,
            overlap: loader.get_u32("overlap")?,
            ingest_similarity_threshold: loader.get_f32("ingest_similarity_threshold")?,
            retrieve_score_threshold: loader.get_f32("retrieve_score_threshold")?,
            max_retries: loader.get_u32("max_retries")?,
            query_batch_size: loader.get_usize("query_batch_size")?,
            max_concurrent_urls: loader.get_usize("max_concurrent_urls")?,
            min_delay_between_requests: loader.get_duration_secs("min_delay_between_requests")?,
            upsert_batch_size: loader.get_usize("upsert_batch_size")?,
        })
    }
}

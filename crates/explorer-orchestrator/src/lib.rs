//! The Explorer Orchestrator: per-query lookup → ingest → retry loop,
//! batched query fan-out, and semaphore-bounded per-URL fan-out within a
//! query.
//!
//! A struct wrapping shared collaborators and exposing a single high-level
//! `async fn run`, with internal helper methods per pipeline stage and
//! `tracing` at each stage boundary. `run` is an explicit iterative loop
//! over a `retry` counter rather than recursion, to bound stack depth.

use explorer_config::ExplorerConfig;
use explorer_extraction::chunking::ChunkingStrategy;
use explorer_extraction::TextChunker;
use explorer_types::ports::{
    ContentExtractor, ContentFetcher, EmbeddingService, SearchProvider, StoreFilter, VectorStore,
};
use explorer_types::ids::chunk_zero_id;
use explorer_types::{ChunkRecord, ExplorerResult, Result, WorkspaceId};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Answer mode for [`Explorer::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerMode {
    Retrieve,
    IngestOnly,
}

/// Logical partition inside the vector index. This workspace uses a single
/// namespace for all tenants, multiplexed by `unique_id`.
pub const NAMESPACE: &str = "Search";

const SEARCH_TOP_K: u32 = 3;

/// Holds every collaborator the Explorer Engine composes plus its own
/// configuration, and drives the retrieve/ingest/retry algorithm.
pub struct Explorer {
    store: Arc<dyn VectorStore>,
    search: Arc<dyn SearchProvider>,
    fetcher: Arc<dyn ContentFetcher>,
    extractor: Arc<dyn ContentExtractor>,
    embedder: Arc<dyn EmbeddingService>,
    chunker: TextChunker,
    config: ExplorerConfig,
}

impl Explorer {
    pub fn new(
        store: Arc<dyn VectorStore>,
        search: Arc<dyn SearchProvider>,
        fetcher: Arc<dyn ContentFetcher>,
        extractor: Arc<dyn ContentExtractor>,
        embedder: Arc<dyn EmbeddingService>,
        config: ExplorerConfig,
    ) -> Self {
        let chunker = TextChunker::new(config.chunk_size, config.overlap);
        Self {
            store,
            search,
            fetcher,
            extractor,
            embedder,
            chunker,
            config,
        }
    }

    /// Public operation `run`. Empty `queries` returns an empty result
    /// without touching the network.
    pub async fn run(
        &self,
        queries: Vec<String>,
        workspace_id: &WorkspaceId,
        answer_mode: AnswerMode,
        max_results: u32,
    ) -> Vec<ExplorerResult> {
        if queries.is_empty() {
            return Vec::new();
        }

        if answer_mode == AnswerMode::IngestOnly {
            self.ingest(&queries, workspace_id, max_results).await;
            return Vec::new();
        }

        let mut to_process = queries;
        let mut answers = Vec::new();
        let mut retry = 0u32;

        loop {
            let filter = StoreFilter::workspace(workspace_id.as_str());
            let lookups = stream::iter(to_process.iter().cloned())
                .map(|query| {
                    let store = Arc::clone(&self.store);
                    let filter = filter.clone();
                    async move {
                        let hits = match store.search(NAMESPACE, &query, SEARCH_TOP_K, &filter).await {
                            Ok(hits) => hits,
                            Err(err) => {
                                // A vector store read failure is treated as no hits
                                // for the affected query; it joins needs_data.
                                warn!(%query, error = %err, "vector store search failed, treating as no hits");
                                Vec::new()
                            }
                        };
                        let filtered: Vec<ExplorerResult> = hits
                            .into_iter()
                            .filter(|hit| {
                                hit.score >= self.config.retrieve_score_threshold
                                    && !hit.record.chunk_text.is_empty()
                            })
                            .map(|hit| ExplorerResult::from_record(hit.record, hit.score))
                            .collect();
                        (query, filtered)
                    }
                })
                .buffer_unordered(to_process.len().max(1))
                .collect::<Vec<_>>()
                .await;

            let mut needs_data = Vec::new();
            for (query, filtered) in lookups {
                if filtered.is_empty() {
                    needs_data.push(query);
                } else {
                    answers.extend(filtered);
                }
            }

            if needs_data.is_empty() || retry >= self.config.max_retries {
                if !needs_data.is_empty() {
                    info!(
                        remaining = needs_data.len(),
                        retry, "retry budget exhausted, returning partial results"
                    );
                }
                break;
            }

            self.ingest(&needs_data, workspace_id, max_results).await;
            to_process = needs_data;
            retry += 1;
        }

        answers
    }

    /// Deletes all records for a workspace.
    pub async fn purge_workspace(&self, workspace_id: &WorkspaceId) -> Result<()> {
        let filter = StoreFilter::workspace(workspace_id.as_str());
        self.store.delete(NAMESPACE, &filter).await
    }

    /// `ingest(queries)`: batched query fan-out, each batch internally
    /// fanning out over discovered URLs with a `MAX_CONCURRENT_URLS`
    /// semaphore.
    async fn ingest(&self, queries: &[String], workspace_id: &WorkspaceId, max_results: u32) {
        for batch in queries.chunks(self.config.query_batch_size) {
            stream::iter(batch.iter().cloned())
                .map(|query| self.ingest_query(query, workspace_id.clone(), max_results))
                .buffer_unordered(batch.len().max(1))
                .collect::<Vec<_>>()
                .await;
        }
    }

    async fn ingest_query(&self, query: String, workspace_id: WorkspaceId, max_results: u32) {
        let hits = match self.search.search(&query, max_results).await {
            Ok(hits) => hits,
            Err(err) => {
                // Search failure is already retried with backoff inside the
                // provider; exhaustion surfaces here as an error or an empty
                // list. Either way the query yields nothing new.
                warn!(%query, error = %err, "search failed for ingestion");
                Vec::new()
            }
        };

        let mut new_urls = Vec::new();
        for hit in hits {
            match self.url_already_ingested(&hit.url, &workspace_id).await {
                Ok(true) => debug!(url = %hit.url, "already ingested for this workspace, skipping"),
                Ok(false) => new_urls.push(hit.url),
                Err(err) => {
                    warn!(url = %hit.url, error = %err, "existence check failed, fetching anyway");
                    new_urls.push(hit.url);
                }
            }
        }

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_urls));
        stream::iter(new_urls.into_iter())
            .map(|url| {
                let semaphore = Arc::clone(&semaphore);
                let query = query.clone();
                let workspace_id = workspace_id.clone();
                async move {
                    let _permit = semaphore
                        .acquire()
                        .await
                        .expect("semaphore is never closed while Explorer is alive");
                    self.ingest_url(&url, &query, &workspace_id).await;
                }
            })
            .buffer_unordered(self.config.max_concurrent_urls)
            .collect::<Vec<_>>()
            .await;
    }

    async fn url_already_ingested(&self, url: &str, workspace_id: &WorkspaceId) -> Result<bool> {
        let id0 = chunk_zero_id(url);
        let records = self.store.fetch_by_id(NAMESPACE, &[id0]).await?;
        Ok(matches!(records.into_iter().next(), Some(Some(record)) if record.unique_id == workspace_id.as_str()))
    }

    async fn ingest_url(&self, url: &str, query: &str, workspace_id: &WorkspaceId) {
        let outcome = match self.fetcher.fetch(url).await {
            Ok(outcome) if outcome.is_success() => outcome,
            Ok(outcome) => {
                debug!(url, status = outcome.status, "fetch did not succeed, skipping");
                return;
            }
            Err(err) => {
                warn!(url, error = %err, "fetch failed, skipping");
                return;
            }
        };

        let scrape = match self.extractor.extract(&outcome.bytes, outcome.kind, url).await {
            Ok(scrape) => scrape,
            Err(err) => {
                warn!(url, error = %err, "extraction failed, skipping");
                return;
            }
        };

        if scrape.text.trim().is_empty() {
            debug!(url, "extraction yielded no usable text, skipping");
            return;
        }

        let chunks = self.chunker.chunk(&scrape.text).await;
        if chunks.is_empty() {
            return;
        }

        let query_vec = match self.embedder.embed_query(query).await {
            Ok(vec) => vec,
            Err(err) => {
                warn!(url, error = %err, "query embedding failed, skipping url");
                return;
            }
        };
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let doc_vecs = match self
            .embedder
            .embed_documents(&texts, self.config.upsert_batch_size)
            .await
        {
            Ok(vecs) => vecs,
            Err(err) => {
                warn!(url, error = %err, "document embedding failed, skipping url");
                return;
            }
        };
        let similarities = self.embedder.similarity(&query_vec, &doc_vecs);

        let records: Vec<ChunkRecord> = chunks
            .into_iter()
            .zip(similarities)
            .filter(|(_, sim)| *sim >= self.config.ingest_similarity_threshold)
            .map(|(chunk, _)| {
                ChunkRecord::new(workspace_id, url, scrape.title.clone(), scrape.description.clone(), &chunk)
            })
            .collect();

        if records.is_empty() {
            debug!(url, "no chunks cleared the ingest similarity threshold");
            return;
        }

        for batch in records.chunks(self.config.upsert_batch_size) {
            if let Err(err) = self.store.upsert(NAMESPACE, batch.to_vec()).await {
                // An upsert batch failure is logged; the loop continues with
                // the next batch. Data loss is accepted at this granularity.
                warn!(url, error = %err, "upsert batch failed, continuing");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use explorer_embed::HashEmbeddingService;
    use explorer_types::ports::{ContentKind, FetchOutcome, SearchHit};
    use explorer_types::{Chunk, ScrapeResult};
    use explorer_vectorstore::MemoryStore;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// A `SearchProvider` returning a fixed URL list per query, counting
    /// calls so tests can assert on network-touch behavior.
    struct FakeSearch {
        results: HashMap<String, Vec<String>>,
        calls: AtomicUsize,
    }

    impl FakeSearch {
        fn new(results: HashMap<String, Vec<String>>) -> Self {
            Self {
                results,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SearchProvider for FakeSearch {
        async fn search(&self, query: &str, max_results: u32) -> Result<Vec<SearchHit>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let urls = self.results.get(query).cloned().unwrap_or_default();
            Ok(urls
                .into_iter()
                .take(max_results as usize)
                .map(|url| SearchHit {
                    url,
                    title: "title".to_string(),
                    snippet: "snippet".to_string(),
                })
                .collect())
        }
    }

    /// A `ContentFetcher` that always "succeeds" with empty bytes (the fake
    /// `ContentExtractor` below ignores bytes and keys off the URL), and
    /// counts fetches per URL.
    struct FakeFetcher {
        calls: tokio::sync::Mutex<HashMap<String, usize>>,
    }

    impl FakeFetcher {
        fn new() -> Self {
            Self {
                calls: tokio::sync::Mutex::new(HashMap::new()),
            }
        }

        async fn call_count(&self, url: &str) -> usize {
            *self.calls.lock().await.get(url).unwrap_or(&0)
        }
    }

    #[async_trait]
    impl ContentFetcher for FakeFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchOutcome> {
            *self.calls.lock().await.entry(url.to_string()).or_insert(0) += 1;
            Ok(FetchOutcome {
                bytes: vec![1],
                kind: ContentKind::Html,
                status: 200,
            })
        }
    }

    /// A `ContentExtractor` that maps a URL straight to canned page text.
    struct FakeExtractor {
        pages: HashMap<String, String>,
    }

    #[async_trait]
    impl ContentExtractor for FakeExtractor {
        async fn extract(&self, _bytes: &[u8], _kind: ContentKind, url: &str) -> Result<ScrapeResult> {
            Ok(ScrapeResult {
                url: url.to_string(),
                title: "Page".to_string(),
                description: "Description".to_string(),
                text: self.pages.get(url).cloned().unwrap_or_default(),
            })
        }
    }

    fn test_config() -> ExplorerConfig {
        ExplorerConfig {
            max_retries: 2,
            query_batch_size: 10,
            max_concurrent_urls: 10,
            ..ExplorerConfig::default()
        }
    }

    #[tokio::test]
    async fn cache_hit_makes_zero_fetches_and_zero_searches() {
        let embedder: Arc<dyn EmbeddingService> = Arc::new(HashEmbeddingService::new());
        let store: Arc<dyn VectorStore> = Arc::new(MemoryStore::new(Arc::clone(&embedder)));
        let ws = WorkspaceId::new("ws-cache-hit");

        let chunk = Chunk::new(0, "The capital of France is Paris.".to_string(), 10);
        let record = ChunkRecord::new(&ws, "https://example.com/paris", "Paris", "desc", &chunk);
        store.upsert(NAMESPACE, vec![record]).await.unwrap();

        let search = Arc::new(FakeSearch::new(HashMap::new()));
        let fetcher = Arc::new(FakeFetcher::new());
        let extractor: Arc<dyn ContentExtractor> = Arc::new(FakeExtractor { pages: HashMap::new() });

        let explorer = Explorer::new(
            store,
            search.clone(),
            fetcher.clone(),
            extractor,
            embedder,
            test_config(),
        );

        let results = explorer
            .run(vec!["capital of France".to_string()], &ws, AnswerMode::Retrieve, 5)
            .await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk_text, "The capital of France is Paris.");
        assert!(results[0].score >= 0.5);
        assert_eq!(search.calls.load(Ordering::SeqCst), 0);
        assert_eq!(fetcher.call_count("https://example.com/paris").await, 0);
    }

    #[tokio::test]
    async fn cold_ingest_then_retrieve_finds_newly_stored_chunks() {
        let embedder: Arc<dyn EmbeddingService> = Arc::new(HashEmbeddingService::new());
        let store: Arc<dyn VectorStore> = Arc::new(MemoryStore::new(Arc::clone(&embedder)));
        let ws = WorkspaceId::new("ws-cold-ingest");

        let query = "capital of France".to_string();
        let mut search_results = HashMap::new();
        search_results.insert(
            query.clone(),
            vec!["https://a.example/paris".to_string(), "https://b.example/paris".to_string()],
        );
        let search = Arc::new(FakeSearch::new(search_results));

        let fetcher = Arc::new(FakeFetcher::new());
        let mut pages = HashMap::new();
        pages.insert(
            "https://a.example/paris".to_string(),
            "Capital of France is Paris. Paris is the capital of France.".to_string(),
        );
        pages.insert(
            "https://b.example/paris".to_string(),
            "Capital of France is Paris, a major European city.".to_string(),
        );
        let extractor: Arc<dyn ContentExtractor> = Arc::new(FakeExtractor { pages });

        let explorer = Explorer::new(
            store,
            search.clone(),
            fetcher.clone(),
            extractor,
            embedder,
            test_config(),
        );

        let results = explorer.run(vec![query], &ws, AnswerMode::Retrieve, 5).await;

        assert!(!results.is_empty(), "expected ingested content to satisfy the retry");
        assert!(results.iter().all(|r| r.score >= 0.5));
        assert_eq!(fetcher.call_count("https://a.example/paris").await, 1);
        assert_eq!(fetcher.call_count("https://b.example/paris").await, 1);
    }

    #[tokio::test]
    async fn partial_retry_only_re_queries_the_query_that_missed() {
        let embedder: Arc<dyn EmbeddingService> = Arc::new(HashEmbeddingService::new());
        let store: Arc<dyn VectorStore> = Arc::new(MemoryStore::new(Arc::clone(&embedder)));
        let ws = WorkspaceId::new("ws-partial-retry");

        let cached_chunk = Chunk::new(0, "The capital of France is Paris.".to_string(), 10);
        let cached_record = ChunkRecord::new(&ws, "https://example.com/paris", "Paris", "desc", &cached_chunk);
        store.upsert(NAMESPACE, vec![cached_record]).await.unwrap();

        let miss_query = "tallest mountain on earth".to_string();
        let mut search_results = HashMap::new();
        search_results.insert(miss_query.clone(), vec!["https://example.com/everest".to_string()]);
        let search = Arc::new(FakeSearch::new(search_results));

        let fetcher = Arc::new(FakeFetcher::new());
        let mut pages = HashMap::new();
        pages.insert(
            "https://example.com/everest".to_string(),
            "Mount Everest is the tallest mountain on earth above sea level.".to_string(),
        );
        let extractor: Arc<dyn ContentExtractor> = Arc::new(FakeExtractor { pages });

        let explorer = Explorer::new(
            store,
            search.clone(),
            fetcher.clone(),
            extractor,
            embedder,
            test_config(),
        );

        let results = explorer
            .run(
                vec!["capital of France".to_string(), miss_query],
                &ws,
                AnswerMode::Retrieve,
                5,
            )
            .await;

        assert!(results.iter().any(|r| r.chunk_text.contains("Paris")));
        assert!(results.iter().any(|r| r.chunk_text.to_lowercase().contains("everest")));
        // The cache hit never drove a fetch; only the missed query's URL was crawled.
        assert_eq!(fetcher.call_count("https://example.com/everest").await, 1);
    }

    #[tokio::test]
    async fn already_ingested_url_is_not_refetched_on_a_later_run() {
        let embedder: Arc<dyn EmbeddingService> = Arc::new(HashEmbeddingService::new());
        let store: Arc<dyn VectorStore> = Arc::new(MemoryStore::new(Arc::clone(&embedder)));
        let ws = WorkspaceId::new("ws-dedup");

        let url = "https://example.com/everest".to_string();
        let mut search_results = HashMap::new();
        search_results.insert("tallest mountain".to_string(), vec![url.clone()]);
        search_results.insert("highest peak".to_string(), vec![url.clone()]);
        let search = Arc::new(FakeSearch::new(search_results));

        let fetcher = Arc::new(FakeFetcher::new());
        let mut pages = HashMap::new();
        pages.insert(url.clone(), "The tallest mountain is Mount Everest.".to_string());
        let extractor: Arc<dyn ContentExtractor> = Arc::new(FakeExtractor { pages });

        let explorer = Explorer::new(
            Arc::clone(&store),
            search.clone(),
            fetcher.clone(),
            extractor,
            embedder,
            test_config(),
        );

        explorer
            .run(vec!["tallest mountain".to_string()], &ws, AnswerMode::Retrieve, 5)
            .await;
        assert_eq!(fetcher.call_count(&url).await, 1);

        explorer
            .run(vec!["highest peak".to_string()], &ws, AnswerMode::Retrieve, 5)
            .await;
        // Same URL, same workspace: the chunk-0 existence check must skip the fetch.
        assert_eq!(fetcher.call_count(&url).await, 1);
    }

    #[tokio::test]
    async fn workspace_isolation_purge_leaves_other_workspaces_intact() {
        let embedder: Arc<dyn EmbeddingService> = Arc::new(HashEmbeddingService::new());
        let store: Arc<dyn VectorStore> = Arc::new(MemoryStore::new(Arc::clone(&embedder)));
        let ws1 = WorkspaceId::new("ws-1");
        let ws2 = WorkspaceId::new("ws-2");

        let chunk = Chunk::new(0, "The capital of France is Paris.".to_string(), 10);
        let record1 = ChunkRecord::new(&ws1, "https://example.com/paris", "Paris", "desc", &chunk);
        let record2 = ChunkRecord::new(&ws2, "https://example.com/paris", "Paris", "desc", &chunk);
        store.upsert(NAMESPACE, vec![record1]).await.unwrap();
        store.upsert(NAMESPACE, vec![record2]).await.unwrap();

        let search = Arc::new(FakeSearch::new(HashMap::new()));
        let fetcher = Arc::new(FakeFetcher::new());
        let extractor: Arc<dyn ContentExtractor> = Arc::new(FakeExtractor { pages: HashMap::new() });

        let explorer = Explorer::new(
            Arc::clone(&store),
            search,
            fetcher,
            extractor,
            Arc::clone(&embedder),
            test_config(),
        );

        explorer.purge_workspace(&ws1).await.unwrap();

        let ws1_results = explorer
            .run(vec!["capital of France".to_string()], &ws1, AnswerMode::Retrieve, 5)
            .await;
        let ws2_results = explorer
            .run(vec!["capital of France".to_string()], &ws2, AnswerMode::Retrieve, 5)
            .await;

        assert!(ws1_results.is_empty());
        assert_eq!(ws2_results.len(), 1);
    }

    #[tokio::test]
    async fn empty_queries_returns_empty_without_touching_collaborators() {
        let embedder: Arc<dyn EmbeddingService> = Arc::new(HashEmbeddingService::new());
        let store: Arc<dyn VectorStore> = Arc::new(MemoryStore::new(Arc::clone(&embedder)));
        let search = Arc::new(FakeSearch::new(HashMap::new()));
        let fetcher = Arc::new(FakeFetcher::new());
        let extractor: Arc<dyn ContentExtractor> = Arc::new(FakeExtractor { pages: HashMap::new() });

        let explorer = Explorer::new(store, search.clone(), fetcher, extractor, embedder, test_config());
        let results = explorer
            .run(Vec::new(), &WorkspaceId::new("ws-empty"), AnswerMode::Retrieve, 5)
            .await;

        assert!(results.is_empty());
        assert_eq!(search.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn ingest_only_mode_stores_but_returns_nothing() {
        let embedder: Arc<dyn EmbeddingService> = Arc::new(HashEmbeddingService::new());
        let store: Arc<dyn VectorStore> = Arc::new(MemoryStore::new(Arc::clone(&embedder)));
        let ws = WorkspaceId::new("ws-ingest-only");

        let query = "capital of France".to_string();
        let mut search_results = HashMap::new();
        search_results.insert(query.clone(), vec!["https://a.example/paris".to_string()]);
        let search = Arc::new(FakeSearch::new(search_results));

        let fetcher = Arc::new(FakeFetcher::new());
        let mut pages = HashMap::new();
        pages.insert(
            "https://a.example/paris".to_string(),
            "Capital of France is Paris, the capital city of France.".to_string(),
        );
        let extractor: Arc<dyn ContentExtractor> = Arc::new(FakeExtractor { pages });

        let explorer = Explorer::new(
            Arc::clone(&store),
            search,
            fetcher,
            extractor,
            Arc::clone(&embedder),
            test_config(),
        );

        let results = explorer.run(vec![query], &ws, AnswerMode::IngestOnly, 5).await;
        assert!(results.is_empty());

        let direct_hits = store
            .search(NAMESPACE, "capital of France", 3, &StoreFilter::workspace(ws.as_str()))
            .await
            .unwrap();
        assert!(!direct_hits.is_empty(), "ingest-only mode should still populate the store");
    }
}

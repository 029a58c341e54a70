//! An in-memory `VectorStore` test double: a trivial in-process stand-in
//! for a port trait, used so the orchestrator's scenario tests don't need
//! a LanceDB directory or a downloaded embedding model.
//!
//! Scoring is computed from an injected `EmbeddingService` (typically
//! `explorer_embed::HashEmbeddingService` in tests), kept independent of
//! whatever embedder ingested the records, the same way the real store's
//! search-time similarity is independent of the ingest-time gate.

use async_trait::async_trait;
use explorer_types::ports::{cosine_similarity, EmbeddingService, StoreFilter, VectorHit, VectorStore};
use explorer_types::{ChunkRecord, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Namespace {
    records: HashMap<String, ChunkRecord>,
    vectors: HashMap<String, Vec<f32>>,
}

pub struct MemoryStore {
    embedder: Arc<dyn EmbeddingService>,
    namespaces: RwLock<HashMap<String, Namespace>>,
}

impl MemoryStore {
    pub fn new(embedder: Arc<dyn EmbeddingService>) -> Self {
        Self {
            embedder,
            namespaces: RwLock::new(HashMap::new()),
        }
    }

    /// Total record count across all namespaces, for assertions in tests.
    pub async fn len(&self) -> usize {
        self.namespaces.read().await.values().map(|n| n.records.len()).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl VectorStore for MemoryStore {
    async fn ensure_index(&self) -> Result<()> {
        Ok(())
    }

    async fn upsert(&self, namespace: &str, records: Vec<ChunkRecord>) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let texts: Vec<String> = records.iter().map(|r| r.chunk_text.clone()).collect();
        let vectors = self.embedder.embed_documents(&texts, texts.len().max(1)).await?;

        let mut namespaces = self.namespaces.write().await;
        let ns = namespaces.entry(namespace.to_string()).or_default();
        for (record, vector) in records.into_iter().zip(vectors.into_iter()) {
            ns.vectors.insert(record.id.clone(), vector);
            ns.records.insert(record.id.clone(), record);
        }
        Ok(())
    }

    async fn search(
        &self,
        namespace: &str,
        query_text: &str,
        top_k: u32,
        filter: &StoreFilter,
    ) -> Result<Vec<VectorHit>> {
        assert!(
            !filter.unique_id.is_empty(),
            "VectorStore::search called without a tenant filter — this is a programming error"
        );

        let namespaces = self.namespaces.read().await;
        let Some(ns) = namespaces.get(namespace) else {
            return Ok(Vec::new());
        };
        let query_vector = self.embedder.embed_query(query_text).await?;

        let mut hits: Vec<VectorHit> = ns
            .records
            .values()
            .filter(|record| record.unique_id == filter.unique_id)
            .filter_map(|record| {
                let vector = ns.vectors.get(&record.id)?;
                let score = cosine_similarity(&query_vector, vector);
                Some(VectorHit {
                    record: record.clone(),
                    score,
                })
            })
            .collect();

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(top_k as usize);
        Ok(hits)
    }

    async fn fetch_by_id(&self, namespace: &str, ids: &[String]) -> Result<Vec<Option<ChunkRecord>>> {
        let namespaces = self.namespaces.read().await;
        let Some(ns) = namespaces.get(namespace) else {
            return Ok(ids.iter().map(|_| None).collect());
        };
        Ok(ids.iter().map(|id| ns.records.get(id).cloned()).collect())
    }

    async fn delete(&self, namespace: &str, filter: &StoreFilter) -> Result<()> {
        assert!(
            !filter.unique_id.is_empty(),
            "VectorStore::delete called without a tenant filter — this is a programming error"
        );
        let mut namespaces = self.namespaces.write().await;
        if let Some(ns) = namespaces.get_mut(namespace) {
            let dead_ids: Vec<String> = ns
                .records
                .values()
                .filter(|record| record.unique_id == filter.unique_id)
                .map(|record| record.id.clone())
                .collect();
            for id in dead_ids {
                ns.records.remove(&id);
                ns.vectors.remove(&id);
            }
        }
        Ok(())
    }
}

//! The Embedding Service: sentence embeddings used *locally* by the
//! Explorer for the ingest-time relevance gate, independent of the Vector
//! Store's own server-side embeddings.
//!
//! Built on `fastembed` for local, deterministic, sub-300M-parameter
//! sentence embedding: a MiniLM-class encoder rather than a decoder-only
//! LLM embedder, wrapping a singleton ONNX-runtime model behind a mutex for
//! a `&self`-shaped embed call.

use explorer_types::ports::EmbeddingService;
pub use explorer_types::ports::cosine_similarity;
use explorer_types::{ExplorerError, Result};
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::sync::Mutex;

/// Default model: MiniLM-class, sub-300M parameters, deterministic in eval
/// mode.
pub const DEFAULT_MODEL: EmbeddingModel = EmbeddingModel::AllMiniLML6V2;

/// Output dimensionality of [`DEFAULT_MODEL`]. Vector store adapters that
/// need a fixed-width column (e.g. `explorer_vectorstore::LanceVectorStore`)
/// size themselves from this constant rather than probing the model at
/// startup.
pub const DEFAULT_DIM: usize = 384;

/// `fastembed`-backed `EmbeddingService`.
///
/// `TextEmbedding::embed` takes `&mut self` internally (session state in the
/// ONNX runtime), so the model is held behind a `std::sync::Mutex` — CPU-bound
/// inference work is short relative to the surrounding I/O, so it runs
/// inline on the task rather than on a dedicated thread.
pub struct FastEmbedService {
    model: Mutex<TextEmbedding>,
}

impl FastEmbedService {
    pub fn new() -> Result<Self> {
        Self::with_model(DEFAULT_MODEL)
    }

    pub fn with_model(model: EmbeddingModel) -> Result<Self> {
        let init = InitOptions::new(model).with_show_download_progress(false);
        let model = TextEmbedding::try_new(init)
            .map_err(|e| ExplorerError::Embed(format!("failed to initialize model: {e}")))?;
        Ok(Self {
            model: Mutex::new(model),
        })
    }

    fn embed_batch(&self, texts: Vec<String>, batch_size: usize) -> Result<Vec<Vec<f32>>> {
        let mut model = self
            .model
            .lock()
            .map_err(|_| ExplorerError::Embed("embedding model mutex poisoned".to_string()))?;
        model
            .embed(texts, Some(batch_size))
            .map_err(|e| ExplorerError::Embed(format!("embedding failed: {e}")))
    }
}

#[async_trait::async_trait]
impl EmbeddingService for FastEmbedService {
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        // Inline, not `spawn_blocking`: a single-string embedding is short
        // enough not to need a dedicated thread.
        let vectors = self.embed_batch(vec![text.to_string()], 1)?;
        vectors
            .into_iter()
            .next()
            .ok_or_else(|| ExplorerError::Embed("empty embedding result for query".to_string()))
    }

    async fn embed_documents(&self, texts: &[String], batch_size: usize) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.embed_batch(texts.to_vec(), batch_size.max(1))
    }
}

/// A deterministic, model-free `EmbeddingService` for tests and offline
/// use: a trivial in-process stand-in for a port trait. Embeds a string as
/// a bag-of-words hash vector so that texts sharing vocabulary score a
/// higher cosine similarity than unrelated ones, without pulling in
/// `fastembed`'s ONNX runtime or a model download.
#[derive(Debug, Default, Clone, Copy)]
pub struct HashEmbeddingService {
    dims: usize,
}

impl HashEmbeddingService {
    pub const DEFAULT_DIMS: usize = 64;

    pub fn new() -> Self {
        Self {
            dims: Self::DEFAULT_DIMS,
        }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dims];
        for word in text.to_lowercase().split_whitespace() {
            let mut hasher = std::collections::hash_map::DefaultHasher::new();
            std::hash::Hash::hash(word, &mut hasher);
            let bucket = (std::hash::Hasher::finish(&hasher) as usize) % self.dims;
            vector[bucket] += 1.0;
        }
        vector
    }
}

#[async_trait::async_trait]
impl EmbeddingService for HashEmbeddingService {
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_one(text))
    }

    async fn embed_documents(&self, texts: &[String], _batch_size: usize) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

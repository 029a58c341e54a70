//! Core data model: `ScrapeResult`, `Chunk`, `ChunkRecord`, `ExplorerResult`.

use crate::ids::{chunk_record_id, WorkspaceId};
use serde::{Deserialize, Serialize};

/// Extracted page content, produced by a `ContentExtractor`.
///
/// `text` may be empty if extraction yielded nothing usable — this is not an
/// error condition; the orchestrator treats an empty `text` as "nothing to
/// chunk" and moves on.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScrapeResult {
    pub url: String,
    pub title: String,
    pub description: String,
    pub text: String,
}

/// A single chunk produced by the text chunker. `chunk_id` is unique only
/// within the `ScrapeResult` that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub chunk_id: u32,
    pub text: String,
    pub token_count: u32,
}

impl Chunk {
    pub fn new(chunk_id: u32, text: impl Into<String>, token_count: u32) -> Self {
        Self {
            chunk_id,
            text: text.into(),
            token_count,
        }
    }
}

/// The storage unit persisted in the vector store.
///
/// `_id` is globally unique (`md5(url) || "_chunk_" || chunk_id`); `unique_id`
/// is the tenant filter applied on every read and write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub id: String,
    pub unique_id: String,
    pub url: String,
    pub title: String,
    pub description: String,
    pub chunk_id: u32,
    pub chunk_text: String,
}

impl ChunkRecord {
    pub fn new(
        workspace: &WorkspaceId,
        url: &str,
        title: impl Into<String>,
        description: impl Into<String>,
        chunk: &Chunk,
    ) -> Self {
        Self {
            id: chunk_record_id(url, chunk.chunk_id),
            unique_id: workspace.as_str().to_string(),
            url: url.to_string(),
            title: title.into(),
            description: description.into(),
            chunk_id: chunk.chunk_id,
            chunk_text: chunk.text.clone(),
        }
    }

    pub fn is_chunk_zero(&self) -> bool {
        self.chunk_id == 0
    }
}

/// A single row returned to the outer system by `Explorer::run` in retrieve
/// mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorerResult {
    pub url: String,
    pub title: String,
    pub description: String,
    pub chunk_text: String,
    pub score: f32,
}

impl ExplorerResult {
    pub fn from_record(record: ChunkRecord, score: f32) -> Self {
        Self {
            url: record.url,
            title: record.title,
            description: record.description,
            chunk_text: record.chunk_text,
            score,
        }
    }
}

//! Shared domain types and port traits for the Explorer Engine.
//!
//! This crate has no business logic of its own. It exists so that every
//! other `explorer-*` crate can depend on the same vocabulary (`Query`,
//! `WorkspaceId`, `ChunkRecord`, ...) and the same collaborator contracts
//! (`SearchProvider`, `VectorStore`, ...) without depending on each other.

pub mod error;
pub mod ids;
pub mod model;
pub mod ports;

pub use error::{ExplorerError, Result};
pub use ids::{normalize_url, Query, WorkspaceId};
pub use model::{Chunk, ChunkRecord, ExplorerResult, ScrapeResult};
pub use ports::{
    ContentExtractor, ContentFetcher, ContentKind, EmbeddingService, FetchOutcome,
    JsRenderFallback, NoopFilter, ResultFilter, SearchHit, SearchProvider, StoreFilter,
    VectorHit, VectorStore,
};

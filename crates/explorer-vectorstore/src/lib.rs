//! Vector Store Adapter: tenant-scoped, content-addressed storage of
//! `ChunkRecord`s with approximate nearest-neighbor search.
//!
//! Two implementations: [`LanceVectorStore`], the real adapter backed by an
//! embedded `lancedb` table, and [`MemoryStore`], an in-process test double
//! used by the orchestrator's scenario tests.

mod lance;
mod memory;

pub use explorer_types::ports::{StoreFilter, VectorHit, VectorStore};
pub use lance::{LanceVectorStore, UPSERT_BATCH_SIZE};
pub use memory::MemoryStore;

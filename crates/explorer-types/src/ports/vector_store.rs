//! Vector Store Adapter port.

use crate::error::Result;
use crate::model::ChunkRecord;
use async_trait::async_trait;

/// Equality filter applied to every read and write. The tenant filter is
/// mandatory — there is deliberately no variant of `search` or `delete`
/// that omits it.
#[derive(Debug, Clone)]
pub struct StoreFilter {
    pub unique_id: String,
}

impl StoreFilter {
    pub fn workspace(unique_id: impl Into<String>) -> Self {
        Self {
            unique_id: unique_id.into(),
        }
    }
}

/// A single search hit: the stored record plus the index's reported score.
#[derive(Debug, Clone)]
pub struct VectorHit {
    pub record: ChunkRecord,
    pub score: f32,
}

/// Namespaced, content-addressed storage of `ChunkRecord`s with approximate
/// nearest-neighbor lookup by text.
///
/// Every implementation MUST treat a missing or mismatched `unique_id` on
/// `search`/`delete` as a programming error — not a silently-scoped-to-all
/// query. Concrete adapters are expected to enforce this with an assertion
/// or equivalent.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Creates the backing index/table on first use. Idempotent.
    async fn ensure_index(&self) -> Result<()>;

    /// Insert-or-replace by `_id`, batched internally to at most
    /// `UPSERT_BATCH_SIZE` records per underlying write.
    async fn upsert(&self, namespace: &str, records: Vec<ChunkRecord>) -> Result<()>;

    /// Top-k search by the index's own embedding of `query_text`, filtered by
    /// `filter`.
    async fn search(
        &self,
        namespace: &str,
        query_text: &str,
        top_k: u32,
        filter: &StoreFilter,
    ) -> Result<Vec<VectorHit>>;

    /// Exact lookup by id. Missing ids map to `None` in the result vector,
    /// in the same order as the input ids.
    async fn fetch_by_id(&self, namespace: &str, ids: &[String]) -> Result<Vec<Option<ChunkRecord>>>;

    /// Removes every record matching `filter`.
    async fn delete(&self, namespace: &str, filter: &StoreFilter) -> Result<()>;
}

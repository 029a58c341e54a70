//! LanceDB-backed `VectorStore`: an embedded, content-addressed, ANN-indexed
//! table opened once per process, with rows built from Arrow
//! `RecordBatch`es and vector search via
//! `table.query().nearest_to(..).distance_type(Cosine)`.
//!
//! The adapter wraps a server-side embedding model over the `chunk_text`
//! field so callers pass plain text, not vectors. `lancedb`'s Rust client
//! has no built-in text-embedding registration (unlike its Python client),
//! so this adapter holds its own `Arc<dyn EmbeddingService>` and embeds
//! text internally at the query boundary, keeping the "callers pass text"
//! contract from the caller's point of view.

use arrow_array::{
    types::Float32Type, Array, FixedSizeListArray, Int32Array, RecordBatch, RecordBatchIterator,
    StringArray,
};
use arrow_schema::{DataType, Field, Schema};
use async_trait::async_trait;
use explorer_types::ports::{EmbeddingService, StoreFilter, VectorHit, VectorStore};
use explorer_types::{ChunkRecord, ExplorerError, Result};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{Connection, Table};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

const DEFAULT_NAMESPACE: &str = "Search";

/// Batches writes to at most this many records per underlying `add` call.
pub const UPSERT_BATCH_SIZE: usize = 96;

pub struct LanceVectorStore {
    db: Connection,
    embedder: Arc<dyn EmbeddingService>,
    embedding_dim: i32,
    tables: RwLock<HashMap<String, Table>>,
}

impl LanceVectorStore {
    pub async fn connect(uri: &str, embedder: Arc<dyn EmbeddingService>, embedding_dim: usize) -> Result<Self> {
        let db = lancedb::connect(uri)
            .execute()
            .await
            .map_err(|e| ExplorerError::Store(format!("failed to connect to LanceDB at {uri}: {e}")))?;
        Ok(Self {
            db,
            embedder,
            embedding_dim: embedding_dim as i32,
            tables: RwLock::new(HashMap::new()),
        })
    }

    fn schema(embedding_dim: i32) -> Schema {
        Schema::new(vec![
            Field::new("_id", DataType::Utf8, false),
            Field::new("unique_id", DataType::Utf8, false),
            Field::new("url", DataType::Utf8, false),
            Field::new("title", DataType::Utf8, true),
            Field::new("description", DataType::Utf8, true),
            Field::new("chunk_id", DataType::Int32, false),
            Field::new("chunk_text", DataType::Utf8, false),
            Field::new(
                "vector",
                DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), embedding_dim),
                true,
            ),
        ])
    }

    async fn get_or_create_table(&self, namespace: &str) -> Result<Table> {
        if let Some(table) = self.tables.read().await.get(namespace) {
            return Ok(table.clone());
        }
        let mut tables = self.tables.write().await;
        if let Some(table) = tables.get(namespace) {
            return Ok(table.clone());
        }

        let schema = Arc::new(Self::schema(self.embedding_dim));
        let table = match self.db.open_table(namespace).execute().await {
            Ok(table) => table,
            Err(lancedb::Error::TableNotFound { .. }) => self
                .db
                .create_empty_table(namespace, schema)
                .execute()
                .await
                .map_err(|e| ExplorerError::Store(format!("failed to create table {namespace}: {e}")))?,
            Err(e) => return Err(ExplorerError::Store(format!("failed to open table {namespace}: {e}"))),
        };

        if let Err(e) = table.create_index(&["vector"], lancedb::index::Index::Auto).execute().await {
            tracing::debug!(namespace, error = %e, "vector index creation skipped (flat search still works)");
        }

        tables.insert(namespace.to_string(), table.clone());
        Ok(table)
    }

    async fn write_batch(&self, table: &Table, records: &[ChunkRecord], vectors: &[Vec<f32>]) -> Result<()> {
        let ids: Vec<String> = records.iter().map(|r| r.id.clone()).collect();
        let escaped: Vec<String> = ids.iter().map(|id| format!("'{}'", id.replace('\'', "''"))).collect();
        let delete_predicate = format!("_id IN ({})", escaped.join(","));
        // Insert-or-replace by `_id`: delete any existing rows with these ids
        // first, then append. `lancedb`'s Rust client has no transactional
        // upsert primitive as direct as Python's `merge_insert`.
        if let Err(e) = table.delete(&delete_predicate).await {
            tracing::debug!(error = %e, "no existing rows to replace for this batch");
        }

        let schema = Arc::new(Self::schema(self.embedding_dim));
        let id_array = StringArray::from(ids);
        let unique_id_array = StringArray::from(records.iter().map(|r| r.unique_id.clone()).collect::<Vec<_>>());
        let url_array = StringArray::from(records.iter().map(|r| r.url.clone()).collect::<Vec<_>>());
        let title_array = StringArray::from(records.iter().map(|r| r.title.clone()).collect::<Vec<_>>());
        let description_array =
            StringArray::from(records.iter().map(|r| r.description.clone()).collect::<Vec<_>>());
        let chunk_id_array = Int32Array::from(records.iter().map(|r| r.chunk_id as i32).collect::<Vec<_>>());
        let chunk_text_array = StringArray::from(records.iter().map(|r| r.chunk_text.clone()).collect::<Vec<_>>());
        let vector_array = FixedSizeListArray::from_iter_primitive::<Float32Type, _, _>(
            vectors
                .iter()
                .map(|v| Some(v.iter().map(|x| Some(*x)).collect::<Vec<_>>())),
            self.embedding_dim,
        );

        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(id_array),
                Arc::new(unique_id_array),
                Arc::new(url_array),
                Arc::new(title_array),
                Arc::new(description_array),
                Arc::new(chunk_id_array),
                Arc::new(chunk_text_array),
                Arc::new(vector_array),
            ],
        )
        .map_err(|e| ExplorerError::Store(format!("failed to build record batch: {e}")))?;

        let batches = RecordBatchIterator::new(vec![Ok(batch)].into_iter(), schema);
        table
            .add(batches)
            .execute()
            .await
            .map_err(|e| ExplorerError::Store(format!("failed to write batch: {e}")))?;
        Ok(())
    }

    fn row_to_record(batch: &RecordBatch, row: usize) -> Option<ChunkRecord> {
        let col = |name: &str| -> Option<&StringArray> {
            batch.column_by_name(name)?.as_any().downcast_ref::<StringArray>()
        };
        let chunk_id_col = batch
            .column_by_name("chunk_id")?
            .as_any()
            .downcast_ref::<Int32Array>()?;

        Some(ChunkRecord {
            id: col("_id")?.value(row).to_string(),
            unique_id: col("unique_id")?.value(row).to_string(),
            url: col("url")?.value(row).to_string(),
            title: col("title")?.value(row).to_string(),
            description: col("description")?.value(row).to_string(),
            chunk_id: chunk_id_col.value(row) as u32,
            chunk_text: col("chunk_text")?.value(row).to_string(),
        })
    }
}

#[async_trait]
impl VectorStore for LanceVectorStore {
    async fn ensure_index(&self) -> Result<()> {
        self.get_or_create_table(DEFAULT_NAMESPACE).await.map(|_| ())
    }

    async fn upsert(&self, namespace: &str, records: Vec<ChunkRecord>) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let table = self.get_or_create_table(namespace).await?;
        for batch in records.chunks(UPSERT_BATCH_SIZE) {
            let texts: Vec<String> = batch.iter().map(|r| r.chunk_text.clone()).collect();
            let vectors = self
                .embedder
                .embed_documents(&texts, UPSERT_BATCH_SIZE)
                .await
                .map_err(|e| ExplorerError::Store(format!("failed to embed batch for upsert: {e}")))?;
            self.write_batch(&table, batch, &vectors).await?;
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

        let table = self.get_or_create_table(namespace).await?;
        let query_vec = self
            .embedder
            .embed_query(query_text)
            .await
            .map_err(|e| ExplorerError::Store(format!("failed to embed query: {e}")))?;

        let escaped_unique_id = filter.unique_id.replace('\'', "''");
        let stream = table
            .query()
            .nearest_to(query_vec.as_slice())
            .map_err(|e| ExplorerError::Store(format!("failed to build vector query: {e}")))?
            .distance_type(lancedb::DistanceType::Cosine)
            .only_if(format!("unique_id = '{escaped_unique_id}'"))
            .limit(top_k as usize)
            .execute()
            .await
            .map_err(|e| ExplorerError::Store(format!("vector search failed: {e}")))?;

        let batches: Vec<RecordBatch> = stream
            .try_collect()
            .await
            .map_err(|e| ExplorerError::Store(format!("failed to read search results: {e}")))?;

        let mut hits = Vec::new();
        for batch in &batches {
            let distance_col = batch
                .column_by_name("_distance")
                .and_then(|a| a.as_any().downcast_ref::<arrow_array::Float32Array>());
            for row in 0..batch.num_rows() {
                let Some(record) = Self::row_to_record(batch, row) else {
                    continue;
                };
                let score = distance_col
                    .map(|d| (1.0 - d.value(row)).clamp(0.0, 1.0))
                    .unwrap_or(0.0);
                hits.push(VectorHit { record, score });
            }
        }
        Ok(hits)
    }

    async fn fetch_by_id(&self, namespace: &str, ids: &[String]) -> Result<Vec<Option<ChunkRecord>>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let table = self.get_or_create_table(namespace).await?;
        let escaped: Vec<String> = ids.iter().map(|id| format!("'{}'", id.replace('\'', "''"))).collect();
        let predicate = format!("_id IN ({})", escaped.join(","));

        let stream = table
            .query()
            .only_if(predicate)
            .execute()
            .await
            .map_err(|e| ExplorerError::Store(format!("fetch_by_id query failed: {e}")))?;
        let batches: Vec<RecordBatch> = stream
            .try_collect()
            .await
            .map_err(|e| ExplorerError::Store(format!("failed to read fetch_by_id results: {e}")))?;

        let mut found: HashMap<String, ChunkRecord> = HashMap::new();
        for batch in &batches {
            for row in 0..batch.num_rows() {
                if let Some(record) = Self::row_to_record(batch, row) {
                    found.insert(record.id.clone(), record);
                }
            }
        }

        Ok(ids.iter().map(|id| found.remove(id)).collect())
    }

    async fn delete(&self, namespace: &str, filter: &StoreFilter) -> Result<()> {
        assert!(
            !filter.unique_id.is_empty(),
            "VectorStore::delete called without a tenant filter — this is a programming error"
        );
        let table = self.get_or_create_table(namespace).await?;
        let escaped_unique_id = filter.unique_id.replace('\'', "''");
        table
            .delete(&format!("unique_id = '{escaped_unique_id}'"))
            .await
            .map_err(|e| ExplorerError::Store(format!("delete failed: {e}")))?;
        Ok(())
    }
}

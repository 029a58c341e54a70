//! Embedding Service port.
//!
//! Used locally by the Explorer for the ingest-time relevance gate,
//! independent of the Vector Store's own server-side embeddings.

use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Embed a single query string.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of document strings, `batch_size` at a time.
    async fn embed_documents(&self, texts: &[String], batch_size: usize) -> Result<Vec<Vec<f32>>>;

    /// Cosine similarity between a query vector and each row of a document
    /// matrix, in `[-1, 1]`.
    fn similarity(&self, query_vec: &[f32], doc_matrix: &[Vec<f32>]) -> Vec<f32> {
        doc_matrix
            .iter()
            .map(|doc_vec| cosine_similarity(query_vec, doc_vec))
            .collect()
    }
}

/// Plain cosine similarity. Returns `0.0` for a zero vector rather than
/// `NaN`, since a zero-length embedding has no meaningful direction to
/// compare against a relevance threshold.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let len = a.len().min(b.len());
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for i in 0..len {
        dot += a[i] * b[i];
        norm_a += a[i] * a[i];
        norm_b += b[i] * b[i];
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_similarity_identical_vectors_is_one() {
        let v = vec![1.0, 2.0, 3.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_similarity_orthogonal_vectors_is_zero() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn cosine_similarity_zero_vector_is_zero_not_nan() {
        let a = vec![0.0, 0.0];
        let b = vec![1.0, 2.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }
}

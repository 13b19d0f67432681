//! ABOUTME: VectorStore port — insert/search/delete vectors by collection (spec §4.B)

pub mod embedded;
pub mod remote;

use async_trait::async_trait;
use docbro_core::prelude::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single vector point to upsert: opaque id, fixed-length embedding, and an
/// arbitrary JSON payload (chunk metadata, in DocBro's case).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorPoint {
    pub id: String,
    pub vector: Vec<f32>,
    pub payload: HashMap<String, serde_json::Value>,
}

/// A single scored search hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorHit {
    pub id: String,
    pub score: f32,
    pub payload: HashMap<String, serde_json::Value>,
}

/// Equality filter over payload fields, applied at `search` and
/// `delete_by_filter` time (e.g. `{"box_id": "<uuid>"}`).
pub type VectorFilter = HashMap<String, serde_json::Value>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorHealth {
    pub ok: bool,
    pub backend: String,
}

/// Contract (collection = box) per spec §4.B. Two drivers implement this:
/// `embedded` (single-file HNSW index co-located with MetaStore) and
/// `remote` (HTTP client to an external vector service).
#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn ensure_collection(&self, name: &str, dim: usize) -> Result<()>;

    /// Batched insert/update. Dimension mismatch is fatal (`VectorDimError`).
    async fn upsert(&self, name: &str, points: Vec<VectorPoint>) -> Result<()>;

    /// Ordered by descending cosine similarity.
    async fn search(
        &self,
        name: &str,
        query_vector: &[f32],
        top_k: usize,
        filter: Option<VectorFilter>,
    ) -> Result<Vec<VectorHit>>;

    async fn delete_by_filter(&self, name: &str, filter: VectorFilter) -> Result<()>;

    async fn health(&self) -> VectorHealth;
}

/// Cosine similarity between two equal-length vectors.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Whether `payload` satisfies every key/value pair in `filter`.
#[must_use]
pub fn payload_matches(payload: &HashMap<String, serde_json::Value>, filter: &VectorFilter) -> bool {
    filter.iter().all(|(k, v)| payload.get(k) == Some(v))
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
    fn cosine_similarity_orthogonal_is_zero() {
        assert!((cosine_similarity(&[1.0, 0.0], &[0.0, 1.0])).abs() < 1e-6);
    }

    #[test]
    fn payload_matches_requires_all_filter_keys() {
        let mut payload = HashMap::new();
        payload.insert("box_id".to_string(), serde_json::json!("b1"));
        payload.insert("page_id".to_string(), serde_json::json!("p1"));
        let mut filter = HashMap::new();
        filter.insert("box_id".to_string(), serde_json::json!("b1"));
        assert!(payload_matches(&payload, &filter));
        filter.insert("page_id".to_string(), serde_json::json!("other"));
        assert!(!payload_matches(&payload, &filter));
    }
}

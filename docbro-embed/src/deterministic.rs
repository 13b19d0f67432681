//! ABOUTME: Deterministic hash-based embedder for the embedded/offline configuration

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use docbro_core::prelude::Result;

use crate::traits::{Embedder, EmbedderHealth};

/// Bit-identical, hash-derived unit vectors. No network dependency; used when
/// no `embedder_url` is configured, and in tests.
#[derive(Debug)]
pub struct DeterministicEmbedder {
    model_id: String,
    dimensions: usize,
}

impl DeterministicEmbedder {
    #[must_use]
    pub fn new(model_id: impl Into<String>, dimensions: usize) -> Self {
        Self { model_id: model_id.into(), dimensions }
    }

    #[allow(clippy::cast_precision_loss)]
    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let seed = hasher.finish();

        let mut embedding = Vec::with_capacity(self.dimensions);
        for i in 0..self.dimensions {
            let value = (((seed.wrapping_mul(i as u64 + 1)) % 2000) as f32 / 1000.0) - 1.0;
            embedding.push(value);
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }
        embedding
    }
}

#[async_trait]
impl Embedder for DeterministicEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }

    fn dim(&self) -> usize {
        self.dimensions
    }

    async fn health(&self) -> EmbedderHealth {
        EmbedderHealth { ok: true, model: self.model_id.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn identical_input_yields_identical_output() {
        let embedder = DeterministicEmbedder::new("mxbai-embed-large", 8);
        let texts = vec!["hello world".to_string()];
        let a = embedder.embed_batch(&texts).await.unwrap();
        let b = embedder.embed_batch(&texts).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn different_input_yields_different_output() {
        let embedder = DeterministicEmbedder::new("mxbai-embed-large", 8);
        let a = embedder.embed_batch(&["alpha".to_string()]).await.unwrap();
        let b = embedder.embed_batch(&["beta".to_string()]).await.unwrap();
        assert_ne!(a[0], b[0]);
    }

    #[tokio::test]
    async fn output_is_unit_normalized() {
        let embedder = DeterministicEmbedder::new("mxbai-embed-large", 16);
        let out = embedder.embed_batch(&["normalize me".to_string()]).await.unwrap();
        let norm: f32 = out[0].iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }

    #[tokio::test]
    async fn preserves_order() {
        let embedder = DeterministicEmbedder::new("mxbai-embed-large", 4);
        let texts = vec!["one".to_string(), "two".to_string(), "three".to_string()];
        let out = embedder.embed_batch(&texts).await.unwrap();
        assert_eq!(out.len(), 3);
        assert_ne!(out[0], out[1]);
        assert_ne!(out[1], out[2]);
    }
}

//! ABOUTME: Caching wrapper around an Embedder — SHA-256(text) → vector (spec §4.C)

use std::sync::Arc;

use async_trait::async_trait;
use docbro_core::prelude::Result;
use docbro_utils::prelude::sha256_hex;

use crate::cache::EmbeddingCache;
use crate::traits::{Embedder, EmbedderHealth};

/// Wraps any [`Embedder`] with a process-wide LRU cache keyed by
/// `sha256(text)`. Cache misses are embedded in one batch call (preserving
/// order); hits are spliced back in at their original position.
pub struct CachedEmbedder<E: Embedder> {
    inner: E,
    cache: Arc<EmbeddingCache>,
}

impl<E: Embedder> CachedEmbedder<E> {
    #[must_use]
    pub fn new(inner: E, cache: Arc<EmbeddingCache>) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl<E: Embedder> Embedder for CachedEmbedder<E> {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let keys: Vec<String> = texts.iter().map(|t| sha256_hex(t)).collect();
        let mut results: Vec<Option<Vec<f32>>> = Vec::with_capacity(texts.len());
        let mut miss_texts = Vec::new();
        let mut miss_positions = Vec::new();

        for (i, key) in keys.iter().enumerate() {
            if let Some(vector) = self.cache.get(key) {
                results.push(Some(vector));
            } else {
                results.push(None);
                miss_texts.push(texts[i].clone());
                miss_positions.push(i);
            }
        }

        if !miss_texts.is_empty() {
            let embedded = self.inner.embed_batch(&miss_texts).await?;
            for (pos, (vector, key_idx)) in embedded.into_iter().zip(miss_positions.iter()).enumerate() {
                let key = keys[*key_idx].clone();
                self.cache.put(key, vector.clone());
                results[miss_positions[pos]] = Some(vector);
            }
        }

        Ok(results.into_iter().map(|v| v.expect("every position filled by hit or miss path")).collect())
    }

    fn dim(&self) -> usize {
        self.inner.dim()
    }

    async fn health(&self) -> EmbedderHealth {
        self.inner.health().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deterministic::DeterministicEmbedder;

    #[tokio::test]
    async fn repeated_text_is_served_from_cache() {
        let cache = Arc::new(EmbeddingCache::new(16));
        let embedder = CachedEmbedder::new(DeterministicEmbedder::new("m", 4), cache.clone());
        let texts = vec!["same text".to_string(), "same text".to_string()];
        let out = embedder.embed_batch(&texts).await.unwrap();
        assert_eq!(out[0], out[1]);
        assert_eq!(cache.len(), 1);
        let (hits, misses) = cache.stats();
        assert_eq!(hits, 1);
        assert_eq!(misses, 1);
    }

    #[tokio::test]
    async fn preserves_order_across_hits_and_misses() {
        let cache = Arc::new(EmbeddingCache::new(16));
        let inner = DeterministicEmbedder::new("m", 4);
        let direct_a = inner.embed_batch(&["a".to_string()]).await.unwrap();
        cache.put(sha256_hex("a"), direct_a[0].clone());

        let embedder = CachedEmbedder::new(DeterministicEmbedder::new("m", 4), cache);
        let out = embedder.embed_batch(&["a".to_string(), "b".to_string(), "a".to_string()]).await.unwrap();
        assert_eq!(out[0], direct_a[0]);
        assert_eq!(out[2], direct_a[0]);
        assert_ne!(out[1], direct_a[0]);
    }
}

//! ABOUTME: Embedder port — deterministic text-to-vector with batch API (spec §4.C)

use async_trait::async_trait;
use docbro_core::prelude::Result;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct EmbedderHealth {
    pub ok: bool,
    pub model: String,
}

/// Narrow seam the rest of DocBro depends on; `embed_batch` must be a pure
/// function of its input text within a process (bit-identical output for
/// identical input), so callers may cache by content hash.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
    fn dim(&self) -> usize;
    async fn health(&self) -> EmbedderHealth;
}

/// Lets call sites that are generic over `E: Embedder` (e.g. `docbro-catalog`'s
/// `Indexer<E>`) be instantiated with a type-erased `Arc<dyn Embedder>`, which
/// is what server processes hold once the configured backend is resolved at
/// startup.
#[async_trait]
impl Embedder for std::sync::Arc<dyn Embedder> {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.as_ref().embed_batch(texts).await
    }

    fn dim(&self) -> usize {
        self.as_ref().dim()
    }

    async fn health(&self) -> EmbedderHealth {
        self.as_ref().health().await
    }
}

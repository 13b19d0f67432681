//! ABOUTME: Embedder port — deterministic and remote drivers, LRU cache, adaptive batch sizing

pub mod batch;
pub mod cache;
pub mod cached;
pub mod deterministic;
pub mod remote;
pub mod traits;

pub mod prelude {
    pub use crate::batch::AdaptiveBatchSize;
    pub use crate::cache::EmbeddingCache;
    pub use crate::cached::CachedEmbedder;
    pub use crate::deterministic::DeterministicEmbedder;
    pub use crate::remote::RemoteEmbedder;
    pub use crate::traits::{Embedder, EmbedderHealth};
}

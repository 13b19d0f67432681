//! ABOUTME: Query transformation, strategy execution, RRF, and the fast multi-signal reranker

pub mod candidate;
pub mod query_transform;
pub mod reranker;
pub mod rrf;
pub mod strategy;

pub mod prelude {
    pub use crate::candidate::RetrievedChunk;
    pub use crate::query_transform::expand_query;
    pub use crate::reranker::{rerank, RankedResult, Signals};
    pub use crate::rrf::{reciprocal_rank_fusion, DEFAULT_K};
    pub use crate::strategy::{retrieve, RetrievalStrategy};
}

//! ABOUTME: Persistence layer — MetaStore (sled) plus the VectorStore port and its drivers

pub mod metastore;
pub mod vector;

pub mod prelude {
    pub use crate::metastore::{MetaStore, SharedMetaStore};
    pub use crate::vector::embedded::EmbeddedVectorStore;
    pub use crate::vector::remote::RemoteVectorStore;
    pub use crate::vector::{
        cosine_similarity, payload_matches, VectorFilter, VectorHealth, VectorHit, VectorPoint, VectorStore,
    };
}

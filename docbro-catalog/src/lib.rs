//! ABOUTME: Shelf/Box catalog service and the chunk-embed-index pipeline

pub mod indexer;
pub mod service;
pub mod sink;

pub mod prelude {
    pub use crate::indexer::{FetchedPage, Indexer};
    pub use crate::service::CatalogService;
    pub use crate::sink::CatalogPageSink;
}

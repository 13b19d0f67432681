//! ABOUTME: Shared domain types and error taxonomy for DocBro
//! ABOUTME: No component owns mutable global state; everything here is a plain value type

pub mod boxes;
pub mod chunk;
pub mod context;
pub mod crawl;
pub mod error;
pub mod ids;
pub mod membership;
pub mod shelf;

pub mod prelude {
    pub use crate::boxes::{BagConfig, BoxConfig, ConfigurationState, DocBox, DragConfig, RagConfig};
    pub use crate::chunk::{CharSpan, Chunk};
    pub use crate::context::Context;
    pub use crate::crawl::{CrawlSession, CrawlStatus, ErrorKind, ErrorLedger, ErrorLedgerEntry, Page};
    pub use crate::error::{DocBroError, Result};
    pub use crate::ids::{BoxId, ChunkId, CrawlSessionId, PageId, ShelfId, WizardSessionId};
    pub use crate::membership::Membership;
    pub use crate::shelf::{is_valid_entity_name, BoxType, Shelf};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn version_is_set() {
        assert!(!super::VERSION.is_empty());
    }
}

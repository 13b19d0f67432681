//! ABOUTME: Context Engine — cached existence/emptiness/configuration queries

pub mod cache;
pub mod engine;

pub mod prelude {
    pub use crate::cache::{CacheKey, CacheStats, ContextCache, QueryKind};
    pub use crate::engine::ContextEngine;
}

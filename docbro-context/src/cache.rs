//! ABOUTME: TTL-keyed context cache — (kind, name, shelf) -> (Context, expires_at) (spec §4.I)

use std::collections::HashMap;
use std::time::{Duration, Instant};

use docbro_core::context::Context;
use parking_lot::RwLock;

const TTL: Duration = Duration::from_secs(300);
const MAX_ENTRIES: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Shelf,
    Box,
    Status,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub kind: QueryKind,
    pub name: String,
    pub shelf: Option<String>,
}

impl CacheKey {
    #[must_use]
    pub fn new(kind: QueryKind, name: impl Into<String>, shelf: Option<String>) -> Self {
        Self { kind, name: name.into(), shelf }
    }
}

struct Entry {
    context: Context,
    expires_at: Instant,
    inserted_at: Instant,
}

/// Grounded on `llmspell-rag`'s embedding cache shape (an `Arc<RwLock<HashMap<..>>>`
/// plus a stats struct), repurposed from LRU-by-capacity to TTL-by-`expires_at`:
/// entries expire after 300s regardless of access pattern, and an over-capacity
/// insert evicts the single oldest entry rather than tracking recency.
#[derive(Default)]
pub struct ContextCache {
    entries: RwLock<HashMap<CacheKey, Entry>>,
    stats: RwLock<CacheStats>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl ContextCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<Context> {
        let mut entries = self.entries.write();
        let mut stats = self.stats.write();
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => {
                stats.hits += 1;
                Some(entry.context.clone())
            }
            Some(_) => {
                entries.remove(key);
                stats.misses += 1;
                None
            }
            None => {
                stats.misses += 1;
                None
            }
        }
    }

    pub fn put(&self, key: CacheKey, context: Context) {
        let now = Instant::now();
        let mut entries = self.entries.write();
        if entries.len() >= MAX_ENTRIES && !entries.contains_key(&key) {
            if let Some(oldest_key) = entries.iter().min_by_key(|(_, e)| e.inserted_at).map(|(k, _)| k.clone()) {
                entries.remove(&oldest_key);
                self.stats.write().evictions += 1;
            }
        }
        entries.insert(key, Entry { context, expires_at: now + TTL, inserted_at: now });
    }

    /// Drops every cached entry matching `name` (and, if present, `shelf`) —
    /// called by the Catalog write hook so a mutation never serves a stale
    /// answer (spec §4.I "invalidated proactively by Catalog writes").
    pub fn invalidate(&self, name: &str) {
        self.entries.write().retain(|key, _| key.name != name);
    }

    pub fn invalidate_all(&self) {
        self.entries.write().clear();
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        *self.stats.read()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> Context {
        Context { exists: true, is_empty: false, configuration_state: None, summary: None, suggested_actions: vec![] }
    }

    #[test]
    fn miss_on_absent_key() {
        let cache = ContextCache::new();
        let key = CacheKey::new(QueryKind::Shelf, "docs", None);
        assert!(cache.get(&key).is_none());
    }

    #[test]
    fn put_then_get_hits() {
        let cache = ContextCache::new();
        let key = CacheKey::new(QueryKind::Shelf, "docs", None);
        cache.put(key.clone(), context());
        assert!(cache.get(&key).is_some());
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn invalidate_drops_matching_entries_regardless_of_kind() {
        let cache = ContextCache::new();
        cache.put(CacheKey::new(QueryKind::Shelf, "docs", None), context());
        cache.put(CacheKey::new(QueryKind::Box, "docs", Some("shelf-a".to_string())), context());
        cache.invalidate("docs");
        assert!(cache.is_empty());
    }

    #[test]
    fn distinct_shelf_scoping_is_a_distinct_key() {
        let cache = ContextCache::new();
        let key_a = CacheKey::new(QueryKind::Box, "x", Some("a".to_string()));
        let key_b = CacheKey::new(QueryKind::Box, "x", Some("b".to_string()));
        cache.put(key_a.clone(), context());
        assert!(cache.get(&key_b).is_none());
        assert!(cache.get(&key_a).is_some());
    }
}

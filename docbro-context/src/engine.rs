//! ABOUTME: Context Engine — cached existence/emptiness/configuration queries (spec §4.I)

use docbro_core::prelude::*;
use docbro_storage::prelude::SharedMetaStore;
use tracing::debug;

use crate::cache::{CacheKey, ContextCache, QueryKind};

pub struct ContextEngine {
    store: SharedMetaStore,
    cache: ContextCache,
}

impl ContextEngine {
    #[must_use]
    pub fn new(store: SharedMetaStore) -> Self {
        Self { store, cache: ContextCache::new() }
    }

    #[must_use]
    pub fn cache(&self) -> &ContextCache {
        &self.cache
    }

    /// "Does shelf `name` exist? Is it empty? Is it configured?"
    pub fn check_shelf(&self, name: &str) -> Result<Context> {
        let key = CacheKey::new(QueryKind::Shelf, name, None);
        if let Some(cached) = self.cache.get(&key) {
            debug!(event = "context_cache_hit", kind = "shelf", name);
            return Ok(cached);
        }

        let context = match self.store.shelf_get_by_name(name) {
            Ok(shelf) => {
                let boxes = self.store.box_list(Some(name), None)?;
                let is_empty = boxes.is_empty();
                let mut suggested = Vec::new();
                if is_empty {
                    suggested.push("create a box".to_string());
                }
                Context {
                    exists: true,
                    is_empty,
                    configuration_state: None,
                    summary: Some(format!("shelf '{}' has {} box(es)", shelf.name, boxes.len())),
                    suggested_actions: suggested,
                }
            }
            Err(DocBroError::NotFound { .. }) => {
                Context::missing(vec![format!("create shelf '{name}'")])
            }
            Err(err) => return Err(err),
        };

        self.cache.put(key, context.clone());
        Ok(context)
    }

    /// "Does box `name` (optionally scoped to `shelf`) exist? Is it empty?
    /// Is it configured?"
    pub fn check_box(&self, name: &str, shelf: Option<&str>) -> Result<Context> {
        let key = CacheKey::new(QueryKind::Box, name, shelf.map(ToString::to_string));
        if let Some(cached) = self.cache.get(&key) {
            debug!(event = "context_cache_hit", kind = "box", name);
            return Ok(cached);
        }

        let context = match self.store.box_get_by_name(name) {
            Ok(dbox) => {
                if let Some(shelf_name) = shelf {
                    let member_boxes = self.store.box_list(Some(shelf_name), None)?;
                    if !member_boxes.iter().any(|b| b.id == dbox.id) {
                        let context = Context::missing(vec![format!(
                            "add box '{name}' to shelf '{shelf_name}'"
                        )]);
                        self.cache.put(key, context.clone());
                        return Ok(context);
                    }
                }
                let is_empty = !dbox.configuration_state.has_content;
                let mut suggested = Vec::new();
                if !dbox.configuration_state.is_configured {
                    suggested.push("run setup wizard".to_string());
                } else if is_empty {
                    suggested.push("provide a source URL".to_string());
                }
                Context {
                    exists: true,
                    is_empty,
                    configuration_state: Some(dbox.configuration_state.clone()),
                    summary: Some(format!("box '{}' ({})", dbox.name, dbox.box_type())),
                    suggested_actions: suggested,
                }
            }
            Err(DocBroError::NotFound { .. }) => Context::missing(vec![format!("create box '{name}'")]),
            Err(err) => return Err(err),
        };

        self.cache.put(key, context.clone());
        Ok(context)
    }

    /// `status_of` — `check_box` plus content counts in the summary.
    pub fn status_of(&self, name: &str) -> Result<Context> {
        let key = CacheKey::new(QueryKind::Status, name, None);
        if let Some(cached) = self.cache.get(&key) {
            debug!(event = "context_cache_hit", kind = "status", name);
            return Ok(cached);
        }

        let context = match self.store.box_get_by_name(name) {
            Ok(dbox) => {
                let chunk_count = self.store.chunk_count_for_box(dbox.id)?;
                let is_empty = chunk_count == 0;
                let mut suggested = Vec::new();
                if !dbox.configuration_state.is_configured {
                    suggested.push("run setup wizard".to_string());
                } else if is_empty {
                    suggested.push("provide a source URL".to_string());
                }
                Context {
                    exists: true,
                    is_empty,
                    configuration_state: Some(dbox.configuration_state.clone()),
                    summary: Some(format!("box '{}' has {chunk_count} chunk(s)", dbox.name)),
                    suggested_actions: suggested,
                }
            }
            Err(DocBroError::NotFound { .. }) => Context::missing(vec![format!("create box '{name}'")]),
            Err(err) => return Err(err),
        };

        self.cache.put(key, context.clone());
        Ok(context)
    }

    /// Called by the Catalog write hook: drops every cached answer naming
    /// `entity_name` so the next query recomputes (spec §4.I).
    pub fn invalidate(&self, entity_name: &str) {
        self.cache.invalidate(entity_name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn engine() -> ContextEngine {
        ContextEngine::new(Arc::new(docbro_storage::metastore::MetaStore::open_temporary()))
    }

    #[test]
    fn missing_shelf_suggests_creation() {
        let engine = engine();
        let ctx = engine.check_shelf("nope").unwrap();
        assert!(!ctx.exists);
        assert_eq!(ctx.suggested_actions, vec!["create shelf 'nope'"]);
    }

    #[test]
    fn empty_shelf_suggests_creating_a_box() {
        let engine = engine();
        engine.store.shelf_create("docs", None, BoxType::Rag, false, vec![], false).unwrap();
        let ctx = engine.check_shelf("docs").unwrap();
        assert!(ctx.exists);
        assert!(ctx.is_empty);
        assert_eq!(ctx.suggested_actions, vec!["create a box"]);
    }

    #[test]
    fn second_lookup_is_served_from_cache() {
        let engine = engine();
        engine.check_shelf("nope").ok();
        engine.check_shelf("nope").ok();
        assert_eq!(engine.cache.stats().hits, 1);
    }

    #[test]
    fn invalidate_forces_a_recompute() {
        let engine = engine();
        engine.store.shelf_create("docs", None, BoxType::Rag, false, vec![], false).unwrap();
        engine.check_shelf("docs").unwrap();
        engine.invalidate("docs");
        engine.check_shelf("docs").unwrap();
        assert_eq!(engine.cache.stats().misses, 2);
    }

    #[test]
    fn box_not_on_named_shelf_reports_missing() {
        let engine = engine();
        engine.store.shelf_create("a", None, BoxType::Rag, false, vec![], false).unwrap();
        engine.store.shelf_create("b", None, BoxType::Rag, false, vec![], false).unwrap();
        let shelf_a = engine.store.shelf_get_by_name("a").unwrap();
        let dbox = engine
            .store
            .box_create("x", BoxConfig::Rag(RagConfig::default()), None)
            .unwrap();
        engine.store.membership_add(shelf_a.id, dbox.id).unwrap();

        let ctx = engine.check_box("x", Some("b")).unwrap();
        assert!(!ctx.exists);
    }

    #[test]
    fn status_of_reports_chunk_count_in_summary() {
        let engine = engine();
        let dbox = engine
            .store
            .box_create("x", BoxConfig::Rag(RagConfig::default()), None)
            .unwrap();
        let ctx = engine.status_of("x").unwrap();
        assert!(ctx.summary.unwrap().contains("0 chunk(s)"));
        let _ = dbox;
    }
}

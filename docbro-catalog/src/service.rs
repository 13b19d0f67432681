//! ABOUTME: Catalog service — Shelf/Box CRUD with cross-entity invariants (spec §4.H)

use std::sync::Arc;

use docbro_context::prelude::ContextEngine;
use docbro_core::prelude::*;
use docbro_storage::prelude::SharedMetaStore;

const MAX_DESCRIPTION_CHARS: usize = 500;

/// Thin orchestration layer over `MetaStore`'s row-level operations: adds
/// the invariants that span more than one row (membership wiring on box
/// creation, description-length validation) that `MetaStore` itself doesn't
/// own, and proactively invalidates the Context Engine's cache on every
/// mutation (spec §4.I "invalidated proactively by Catalog writes").
pub struct CatalogService {
    store: SharedMetaStore,
    context: Option<Arc<ContextEngine>>,
}

impl CatalogService {
    #[must_use]
    pub fn new(store: SharedMetaStore) -> Self {
        Self { store, context: None }
    }

    #[must_use]
    pub fn with_context_engine(store: SharedMetaStore, context: Arc<ContextEngine>) -> Self {
        Self { store, context: Some(context) }
    }

    fn invalidate(&self, name: &str) {
        if let Some(context) = &self.context {
            context.invalidate(name);
        }
    }

    fn validate_description(description: &Option<String>) -> Result<()> {
        if let Some(d) = description {
            if d.chars().count() > MAX_DESCRIPTION_CHARS {
                return Err(DocBroError::InvalidInput {
                    message: format!("description exceeds {MAX_DESCRIPTION_CHARS} chars"),
                });
            }
        }
        Ok(())
    }

    pub fn create_shelf(
        &self,
        name: &str,
        description: Option<String>,
        default_box_type: BoxType,
        auto_fill: bool,
        tags: Vec<String>,
        set_current: bool,
    ) -> Result<Shelf> {
        Self::validate_description(&description)?;
        let shelf = self.store.shelf_create(name, description, default_box_type, auto_fill, tags, set_current)?;
        self.invalidate(name);
        Ok(shelf)
    }

    pub fn list_shelves(&self, current_only: bool, limit: Option<usize>) -> Result<Vec<Shelf>> {
        self.store.shelf_list(current_only, limit)
    }

    pub fn current_shelf(&self) -> Result<Shelf> {
        self.store.shelf_current()
    }

    pub fn rename_shelf(&self, old_name: &str, new_name: &str) -> Result<Shelf> {
        let shelf = self.store.shelf_rename(old_name, new_name)?;
        self.invalidate(old_name);
        self.invalidate(new_name);
        Ok(shelf)
    }

    pub fn delete_shelf(&self, name: &str, force: bool) -> Result<()> {
        self.store.shelf_delete(name, force)?;
        self.invalidate(name);
        Ok(())
    }

    pub fn set_current_shelf(&self, name: &str) -> Result<()> {
        self.store.shelf_set_current(name)?;
        self.invalidate(name);
        Ok(())
    }

    /// Creates a box and adds it to `shelf_name` in one step (spec §4.H
    /// `box.add` semantics — a box always belongs to at least one shelf at
    /// creation time).
    pub fn create_box(
        &self,
        name: &str,
        config: BoxConfig,
        description: Option<String>,
        shelf_name: &str,
    ) -> Result<DocBox> {
        Self::validate_description(&description)?;
        let shelf = self.store.shelf_get_by_name(shelf_name)?;
        let dbox = self.store.box_create(name, config, description)?;
        self.store.membership_add(shelf.id, dbox.id)?;
        self.invalidate(shelf_name);
        self.invalidate(name);
        Ok(dbox)
    }

    pub fn add_box_to_shelf(&self, box_name: &str, shelf_name: &str) -> Result<()> {
        let shelf = self.store.shelf_get_by_name(shelf_name)?;
        let dbox = self.store.box_get_by_name(box_name)?;
        self.store.membership_add(shelf.id, dbox.id)?;
        self.invalidate(shelf_name);
        self.invalidate(box_name);
        Ok(())
    }

    pub fn remove_box_from_shelf(&self, box_name: &str, shelf_name: &str) -> Result<()> {
        let shelf = self.store.shelf_get_by_name(shelf_name)?;
        let dbox = self.store.box_get_by_name(box_name)?;
        self.store.membership_remove(shelf.id, dbox.id)?;
        self.invalidate(shelf_name);
        self.invalidate(box_name);
        Ok(())
    }

    pub fn list_boxes(&self, shelf: Option<&str>, box_type: Option<BoxType>) -> Result<Vec<DocBox>> {
        self.store.box_list(shelf, box_type)
    }

    pub fn get_box(&self, name: &str) -> Result<DocBox> {
        self.store.box_get_by_name(name)
    }

    pub fn rename_box(&self, old_name: &str, new_name: &str) -> Result<DocBox> {
        let dbox = self.store.box_rename(old_name, new_name)?;
        self.invalidate(old_name);
        self.invalidate(new_name);
        Ok(dbox)
    }

    pub fn delete_box(&self, name: &str, force: bool) -> Result<BoxId> {
        let id = self.store.box_delete(name, force)?;
        self.invalidate(name);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn service() -> CatalogService {
        CatalogService::new(Arc::new(docbro_storage::metastore::MetaStore::open_temporary()))
    }

    #[test]
    fn creating_a_box_adds_it_to_the_named_shelf() {
        let service = service();
        service
            .create_shelf("docs", None, BoxType::Rag, false, vec![], false)
            .unwrap();
        service
            .create_box("py-docs", BoxConfig::Rag(RagConfig::default()), None, "docs")
            .unwrap();
        let boxes = service.list_boxes(Some("docs"), None).unwrap();
        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0].name, "py-docs");
    }

    #[test]
    fn description_over_500_chars_is_rejected() {
        let service = service();
        let description = "a".repeat(501);
        let err = service
            .create_shelf("docs", Some(description), BoxType::Rag, false, vec![], false)
            .unwrap_err();
        assert_eq!(err.code(), "invalid_param");
    }

    #[test]
    fn moving_a_box_between_shelves_updates_membership() {
        let service = service();
        service.create_shelf("a", None, BoxType::Rag, false, vec![], false).unwrap();
        service.create_shelf("b", None, BoxType::Rag, false, vec![], false).unwrap();
        service
            .create_box("x", BoxConfig::Rag(RagConfig::default()), None, "a")
            .unwrap();
        service.add_box_to_shelf("x", "b").unwrap();
        service.remove_box_from_shelf("x", "a").unwrap();
        assert!(service.list_boxes(Some("a"), None).unwrap().is_empty());
        assert_eq!(service.list_boxes(Some("b"), None).unwrap().len(), 1);
    }
}

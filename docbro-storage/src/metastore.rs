//! ABOUTME: MetaStore — transactional relational persistence for shelves, boxes,
//! ABOUTME: memberships, pages, chunks, crawl sessions, wizard sessions, and settings (spec §4.A)

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use docbro_core::prelude::*;
use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Serialize};

/// Single-writer-per-row semantics (spec §4.A) are provided here by one
/// global write mutex guarding every mutating operation. `sled`'s own trees
/// already serialize individual key writes; the mutex additionally
/// serializes the multi-key operations (uniqueness-index + row) that must
/// appear atomic to readers, which is the "or equivalent" spec §4.A allows
/// in place of per-row locking.
pub struct MetaStore {
    db: sled::Db,
    write_lock: Mutex<()>,
}

fn to_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| DocBroError::Internal { message: e.to_string() })
}

fn from_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| DocBroError::Internal { message: e.to_string() })
}

impl MetaStore {
    pub fn open(path: &Path) -> Result<Self> {
        let db = sled::open(path).map_err(|e| DocBroError::Internal { message: format!("sled open failed: {e}") })?;
        let store = Self { db, write_lock: Mutex::new(()) };
        store.ensure_system_default_shelf()?;
        Ok(store)
    }

    #[must_use]
    pub fn open_temporary() -> Self {
        let db = sled::Config::new().temporary(true).open().expect("temporary sled db");
        let store = Self { db, write_lock: Mutex::new(()) };
        store.ensure_system_default_shelf().expect("seed default shelf");
        store
    }

    fn tree(&self, name: &str) -> Result<sled::Tree> {
        self.db.open_tree(name).map_err(|e| DocBroError::Internal { message: e.to_string() })
    }

    fn ensure_system_default_shelf(&self) -> Result<()> {
        let by_name = self.tree("shelves_by_name")?;
        if by_name.get("default").ok().flatten().is_some() {
            return Ok(());
        }
        let shelf = Shelf::system_default();
        self.insert_shelf_row(&shelf)
    }

    fn insert_shelf_row(&self, shelf: &Shelf) -> Result<()> {
        let shelves = self.tree("shelves")?;
        let by_name = self.tree("shelves_by_name")?;
        shelves
            .insert(shelf.id.to_string(), to_bytes(shelf)?)
            .map_err(|e| DocBroError::Internal { message: e.to_string() })?;
        by_name
            .insert(shelf.name.to_lowercase(), shelf.id.to_string().as_bytes())
            .map_err(|e| DocBroError::Internal { message: e.to_string() })?;
        Ok(())
    }

    // ---- Shelf operations ------------------------------------------------

    pub fn shelf_create(
        &self,
        name: &str,
        description: Option<String>,
        default_box_type: BoxType,
        auto_fill: bool,
        tags: Vec<String>,
        set_current: bool,
    ) -> Result<Shelf> {
        if !is_valid_entity_name(name) {
            return Err(DocBroError::InvalidInput { message: format!("invalid shelf name '{name}'") });
        }
        let _guard = self.write_lock.lock();
        let by_name = self.tree("shelves_by_name")?;
        if by_name.get(name.to_lowercase()).ok().flatten().is_some() {
            return Err(DocBroError::NameTaken { name: name.to_string() });
        }
        let mut shelf = Shelf::new(name);
        shelf.description = description;
        shelf.default_box_type = default_box_type;
        shelf.auto_fill = auto_fill;
        shelf.tags = tags;
        self.insert_shelf_row(&shelf)?;
        if set_current {
            self.shelf_set_current_locked(&shelf.name)?;
            shelf.is_current = true;
        }
        Ok(shelf)
    }

    pub fn shelf_get_by_name(&self, name: &str) -> Result<Shelf> {
        let by_name = self.tree("shelves_by_name")?;
        let id_bytes = by_name
            .get(name.to_lowercase())
            .map_err(|e| DocBroError::Internal { message: e.to_string() })?
            .ok_or_else(|| DocBroError::NotFound { kind: "shelf".to_string(), name: name.to_string() })?;
        let id = String::from_utf8_lossy(&id_bytes).to_string();
        let shelves = self.tree("shelves")?;
        let bytes = shelves
            .get(&id)
            .map_err(|e| DocBroError::Internal { message: e.to_string() })?
            .ok_or_else(|| DocBroError::NotFound { kind: "shelf".to_string(), name: name.to_string() })?;
        from_bytes(&bytes)
    }

    pub fn shelf_list(&self, current_only: bool, limit: Option<usize>) -> Result<Vec<Shelf>> {
        let shelves = self.tree("shelves")?;
        let mut all: Vec<Shelf> = shelves
            .iter()
            .values()
            .filter_map(std::result::Result::ok)
            .filter_map(|bytes| from_bytes::<Shelf>(&bytes).ok())
            .filter(|s| !current_only || s.is_current)
            .collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = limit {
            all.truncate(limit);
        }
        Ok(all)
    }

    pub fn shelf_rename(&self, old_name: &str, new_name: &str) -> Result<Shelf> {
        if !is_valid_entity_name(new_name) {
            return Err(DocBroError::InvalidInput { message: format!("invalid shelf name '{new_name}'") });
        }
        let _guard = self.write_lock.lock();
        let mut shelf = self.shelf_get_by_name(old_name)?;
        if shelf.protected {
            return Err(DocBroError::Protected { name: old_name.to_string() });
        }
        let by_name = self.tree("shelves_by_name")?;
        if old_name.eq_ignore_ascii_case(new_name) {
            // rename to the same name (modulo case) - no-op beyond touch
        } else if by_name.get(new_name.to_lowercase()).ok().flatten().is_some() {
            return Err(DocBroError::NameTaken { name: new_name.to_string() });
        }
        by_name.remove(old_name.to_lowercase()).map_err(|e| DocBroError::Internal { message: e.to_string() })?;
        shelf.name = new_name.to_string();
        shelf.touch();
        self.insert_shelf_row(&shelf)?;
        Ok(shelf)
    }

    pub fn shelf_delete(&self, name: &str, force: bool) -> Result<()> {
        let _guard = self.write_lock.lock();
        let shelf = self.shelf_get_by_name(name)?;
        if shelf.protected {
            return Err(DocBroError::Protected { name: name.to_string() });
        }
        if !force {
            return Err(DocBroError::InvalidInput { message: "shelf delete requires --force".to_string() });
        }
        let shelves = self.tree("shelves")?;
        let by_name = self.tree("shelves_by_name")?;
        shelves.remove(shelf.id.to_string()).map_err(|e| DocBroError::Internal { message: e.to_string() })?;
        by_name.remove(name.to_lowercase()).map_err(|e| DocBroError::Internal { message: e.to_string() })?;

        // Remove membership rows; boxes themselves survive (spec §3 Invariants).
        let memberships = self.tree("memberships")?;
        let prefix = format!("{}:", shelf.id);
        for key in memberships.scan_prefix(prefix.as_bytes()).keys().filter_map(std::result::Result::ok) {
            let _ = memberships.remove(key);
        }

        if shelf.is_current {
            self.shelf_set_current_locked("default")?;
        }
        Ok(())
    }

    fn shelf_set_current_locked(&self, name: &str) -> Result<()> {
        let shelves = self.tree("shelves")?;
        let mut all: Vec<Shelf> = shelves
            .iter()
            .values()
            .filter_map(std::result::Result::ok)
            .filter_map(|bytes| from_bytes::<Shelf>(&bytes).ok())
            .collect();
        let mut found = false;
        for shelf in &mut all {
            if shelf.matches_name(name) {
                shelf.is_current = true;
                shelf.touch();
                found = true;
            } else if shelf.is_current {
                shelf.is_current = false;
                shelf.touch();
            }
        }
        if !found {
            return Err(DocBroError::NotFound { kind: "shelf".to_string(), name: name.to_string() });
        }
        for shelf in &all {
            shelves
                .insert(shelf.id.to_string(), to_bytes(shelf)?)
                .map_err(|e| DocBroError::Internal { message: e.to_string() })?;
        }
        Ok(())
    }

    pub fn shelf_set_current(&self, name: &str) -> Result<()> {
        let _guard = self.write_lock.lock();
        self.shelf_set_current_locked(name)
    }

    pub fn shelf_current(&self) -> Result<Shelf> {
        self.shelf_list(true, Some(1))?
            .into_iter()
            .next()
            .ok_or_else(|| DocBroError::NotFound { kind: "shelf".to_string(), name: "<current>".to_string() })
    }

    // ---- Box operations ----------------------------------------------------

    pub fn box_create(&self, name: &str, config: BoxConfig, description: Option<String>) -> Result<DocBox> {
        if !is_valid_entity_name(name) {
            return Err(DocBroError::InvalidInput { message: format!("invalid box name '{name}'") });
        }
        let _guard = self.write_lock.lock();
        let by_name = self.tree("boxes_by_name")?;
        if by_name.get(name).ok().flatten().is_some() {
            return Err(DocBroError::NameTaken { name: name.to_string() });
        }
        let mut dbox = DocBox::new(name, config);
        dbox.description = description;
        self.insert_box_row(&dbox)?;
        Ok(dbox)
    }

    fn insert_box_row(&self, dbox: &DocBox) -> Result<()> {
        let boxes = self.tree("boxes")?;
        let by_name = self.tree("boxes_by_name")?;
        boxes
            .insert(dbox.id.to_string(), to_bytes(dbox)?)
            .map_err(|e| DocBroError::Internal { message: e.to_string() })?;
        by_name
            .insert(dbox.name.as_str(), dbox.id.to_string().as_bytes())
            .map_err(|e| DocBroError::Internal { message: e.to_string() })?;
        Ok(())
    }

    /// Persist a box row in place (name/id unchanged) — used by the indexer
    /// to flip `configuration_state` flags after a fill.
    pub fn box_save(&self, dbox: &DocBox) -> Result<()> {
        let _guard = self.write_lock.lock();
        let boxes = self.tree("boxes")?;
        boxes
            .insert(dbox.id.to_string(), to_bytes(dbox)?)
            .map_err(|e| DocBroError::Internal { message: e.to_string() })?;
        Ok(())
    }

    pub fn box_get_by_name(&self, name: &str) -> Result<DocBox> {
        let by_name = self.tree("boxes_by_name")?;
        let id_bytes = by_name
            .get(name)
            .map_err(|e| DocBroError::Internal { message: e.to_string() })?
            .ok_or_else(|| DocBroError::NotFound { kind: "box".to_string(), name: name.to_string() })?;
        let id = String::from_utf8_lossy(&id_bytes).to_string();
        self.box_get(&id)
    }

    pub fn box_get(&self, id: &str) -> Result<DocBox> {
        let boxes = self.tree("boxes")?;
        let bytes = boxes
            .get(id)
            .map_err(|e| DocBroError::Internal { message: e.to_string() })?
            .ok_or_else(|| DocBroError::NotFound { kind: "box".to_string(), name: id.to_string() })?;
        from_bytes(&bytes)
    }

    pub fn box_list(&self, shelf: Option<&str>, box_type: Option<BoxType>) -> Result<Vec<DocBox>> {
        let boxes = self.tree("boxes")?;
        let mut all: Vec<DocBox> = boxes
            .iter()
            .values()
            .filter_map(std::result::Result::ok)
            .filter_map(|bytes| from_bytes::<DocBox>(&bytes).ok())
            .filter(|b| box_type.map_or(true, |t| b.box_type() == t))
            .collect();
        if let Some(shelf_name) = shelf {
            let shelf = self.shelf_get_by_name(shelf_name)?;
            let member_ids = self.membership_box_ids_for_shelf(shelf.id)?;
            all.retain(|b| member_ids.contains(&b.id));
        }
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    pub fn box_rename(&self, old_name: &str, new_name: &str) -> Result<DocBox> {
        if !is_valid_entity_name(new_name) {
            return Err(DocBroError::InvalidInput { message: format!("invalid box name '{new_name}'") });
        }
        let _guard = self.write_lock.lock();
        let mut dbox = self.box_get_by_name(old_name)?;
        let by_name = self.tree("boxes_by_name")?;
        if old_name != new_name && by_name.get(new_name).ok().flatten().is_some() {
            return Err(DocBroError::NameTaken { name: new_name.to_string() });
        }
        by_name.remove(old_name).map_err(|e| DocBroError::Internal { message: e.to_string() })?;
        dbox.name = new_name.to_string();
        dbox.touch();
        self.insert_box_row(&dbox)?;
        Ok(dbox)
    }

    pub fn box_delete(&self, name: &str, force: bool) -> Result<BoxId> {
        if !force {
            return Err(DocBroError::InvalidInput { message: "box delete requires --force".to_string() });
        }
        let _guard = self.write_lock.lock();
        let dbox = self.box_get_by_name(name)?;
        let boxes = self.tree("boxes")?;
        let by_name = self.tree("boxes_by_name")?;
        boxes.remove(dbox.id.to_string()).map_err(|e| DocBroError::Internal { message: e.to_string() })?;
        by_name.remove(name).map_err(|e| DocBroError::Internal { message: e.to_string() })?;

        let memberships = self.tree("memberships")?;
        for key in memberships.iter().keys().filter_map(std::result::Result::ok) {
            let key_str = String::from_utf8_lossy(&key).to_string();
            if key_str.ends_with(&format!(":{}", dbox.id)) {
                let _ = memberships.remove(key);
            }
        }

        // Deleting a box deletes its chunks (spec §3 Invariants); vector
        // deletion is the caller's (catalog service's) responsibility since
        // it requires the VectorStore port.
        self.chunk_delete_for_box(dbox.id)?;
        let pages = self.tree("pages")?;
        let prefix = format!("{}:", dbox.id);
        for key in pages.scan_prefix(prefix.as_bytes()).keys().filter_map(std::result::Result::ok) {
            let _ = pages.remove(key);
        }

        Ok(dbox.id)
    }

    // ---- Membership ---------------------------------------------------------

    pub fn membership_add(&self, shelf_id: ShelfId, box_id: BoxId) -> Result<()> {
        let _guard = self.write_lock.lock();
        let memberships = self.tree("memberships")?;
        let key = format!("{shelf_id}:{box_id}");
        memberships.insert(key.as_bytes(), &[]).map_err(|e| DocBroError::Internal { message: e.to_string() })?;
        Ok(())
    }

    pub fn membership_remove(&self, shelf_id: ShelfId, box_id: BoxId) -> Result<()> {
        let _guard = self.write_lock.lock();
        let memberships = self.tree("memberships")?;
        let key = format!("{shelf_id}:{box_id}");
        memberships.remove(key.as_bytes()).map_err(|e| DocBroError::Internal { message: e.to_string() })?;
        Ok(())
    }

    pub fn membership_box_ids_for_shelf(&self, shelf_id: ShelfId) -> Result<Vec<BoxId>> {
        let memberships = self.tree("memberships")?;
        let prefix = format!("{shelf_id}:");
        let ids = memberships
            .scan_prefix(prefix.as_bytes())
            .keys()
            .filter_map(std::result::Result::ok)
            .filter_map(|key| {
                let key_str = String::from_utf8_lossy(&key).to_string();
                key_str.split_once(':').and_then(|(_, box_part)| box_part.parse().ok())
            })
            .collect();
        Ok(ids)
    }

    // ---- Pages --------------------------------------------------------------

    /// Upsert a page, keyed by `(box_id, url)` per spec §4.A.
    pub fn page_upsert(&self, page: Page) -> Result<Page> {
        let _guard = self.write_lock.lock();
        let pages = self.tree("pages")?;
        let key = Self::page_key(page.box_id, &page.url);
        pages.insert(key.as_bytes(), to_bytes(&page)?).map_err(|e| DocBroError::Internal { message: e.to_string() })?;
        Ok(page)
    }

    pub fn page_get(&self, box_id: BoxId, url: &str) -> Result<Option<Page>> {
        let pages = self.tree("pages")?;
        let key = Self::page_key(box_id, url);
        match pages.get(key.as_bytes()).map_err(|e| DocBroError::Internal { message: e.to_string() })? {
            Some(bytes) => Ok(Some(from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    fn page_key(box_id: BoxId, url: &str) -> String {
        format!("{box_id}:{}", docbro_core_hash_url(url))
    }

    // ---- Chunks ---------------------------------------------------------------

    pub fn chunk_insert_batch(&self, chunks: &[Chunk]) -> Result<()> {
        let _guard = self.write_lock.lock();
        let tree = self.tree("chunks")?;
        let by_page = self.tree("chunks_by_page")?;
        let by_box = self.tree("chunks_by_box")?;
        for chunk in chunks {
            tree.insert(chunk.id.to_string(), to_bytes(chunk)?).map_err(|e| DocBroError::Internal { message: e.to_string() })?;
            by_page
                .insert(format!("{}:{}", chunk.page_id, chunk.id), &[])
                .map_err(|e| DocBroError::Internal { message: e.to_string() })?;
            by_box
                .insert(format!("{}:{}", chunk.box_id, chunk.id), &[])
                .map_err(|e| DocBroError::Internal { message: e.to_string() })?;
        }
        Ok(())
    }

    pub fn chunk_list_for_page(&self, page_id: PageId) -> Result<Vec<Chunk>> {
        let tree = self.tree("chunks")?;
        let by_page = self.tree("chunks_by_page")?;
        let prefix = format!("{page_id}:");
        let mut chunks = Vec::new();
        for key in by_page.scan_prefix(prefix.as_bytes()).keys().filter_map(std::result::Result::ok) {
            let key_str = String::from_utf8_lossy(&key).to_string();
            if let Some((_, chunk_id)) = key_str.split_once(':') {
                if let Some(bytes) = tree.get(chunk_id).ok().flatten() {
                    chunks.push(from_bytes(&bytes)?);
                }
            }
        }
        Ok(chunks)
    }

    pub fn chunk_count_for_box(&self, box_id: BoxId) -> Result<usize> {
        let by_box = self.tree("chunks_by_box")?;
        let prefix = format!("{box_id}:");
        Ok(by_box.scan_prefix(prefix.as_bytes()).count())
    }

    /// Deletes all chunk rows for a page, returning the deleted chunks' ids
    /// (the caller uses these to delete the matching vector points).
    pub fn chunk_delete_for_page(&self, page_id: PageId) -> Result<Vec<ChunkId>> {
        let _guard = self.write_lock.lock();
        let tree = self.tree("chunks")?;
        let by_page = self.tree("chunks_by_page")?;
        let by_box = self.tree("chunks_by_box")?;
        let prefix = format!("{page_id}:");
        let mut deleted = Vec::new();
        let keys: Vec<_> = by_page.scan_prefix(prefix.as_bytes()).keys().filter_map(std::result::Result::ok).collect();
        for key in keys {
            let key_str = String::from_utf8_lossy(&key).to_string();
            if let Some((_, chunk_id_str)) = key_str.split_once(':') {
                if let Some(bytes) = tree.get(chunk_id_str).ok().flatten() {
                    if let Ok(chunk) = from_bytes::<Chunk>(&bytes) {
                        let _ = by_box.remove(format!("{}:{}", chunk.box_id, chunk.id));
                        deleted.push(chunk.id);
                    }
                }
                let _ = tree.remove(chunk_id_str);
            }
            let _ = by_page.remove(&key);
        }
        Ok(deleted)
    }

    fn chunk_delete_for_box(&self, box_id: BoxId) -> Result<()> {
        let tree = self.tree("chunks")?;
        let by_page = self.tree("chunks_by_page")?;
        let by_box = self.tree("chunks_by_box")?;
        let prefix = format!("{box_id}:");
        let keys: Vec<_> = by_box.scan_prefix(prefix.as_bytes()).keys().filter_map(std::result::Result::ok).collect();
        for key in keys {
            let key_str = String::from_utf8_lossy(&key).to_string();
            if let Some((_, chunk_id_str)) = key_str.split_once(':') {
                if let Some(bytes) = tree.get(chunk_id_str).ok().flatten() {
                    if let Ok(chunk) = from_bytes::<Chunk>(&bytes) {
                        let _ = by_page.remove(format!("{}:{}", chunk.page_id, chunk.id));
                    }
                }
                let _ = tree.remove(chunk_id_str);
            }
            let _ = by_box.remove(&key);
        }
        Ok(())
    }

    // ---- Crawl sessions -------------------------------------------------------

    pub fn crawl_session_save(&self, session: &CrawlSession) -> Result<()> {
        let _guard = self.write_lock.lock();
        let tree = self.tree("crawl_sessions")?;
        tree.insert(session.id.to_string(), to_bytes(session)?).map_err(|e| DocBroError::Internal { message: e.to_string() })?;
        Ok(())
    }

    pub fn crawl_session_get(&self, id: CrawlSessionId) -> Result<CrawlSession> {
        let tree = self.tree("crawl_sessions")?;
        let bytes = tree
            .get(id.to_string())
            .map_err(|e| DocBroError::Internal { message: e.to_string() })?
            .ok_or_else(|| DocBroError::NotFound { kind: "crawl_session".to_string(), name: id.to_string() })?;
        from_bytes(&bytes)
    }

    // ---- Wizard sessions (generic blob storage; typed wrapper lives upstream) -

    pub fn wizard_session_save<T: Serialize>(&self, id: &str, updated_at: DateTime<Utc>, value: &T) -> Result<()> {
        let _guard = self.write_lock.lock();
        let tree = self.tree("wizard_sessions")?;
        let timestamps = self.tree("wizard_session_timestamps")?;
        tree.insert(id, to_bytes(value)?).map_err(|e| DocBroError::Internal { message: e.to_string() })?;
        timestamps
            .insert(id, updated_at.timestamp().to_le_bytes().to_vec())
            .map_err(|e| DocBroError::Internal { message: e.to_string() })?;
        Ok(())
    }

    pub fn wizard_session_load<T: DeserializeOwned>(&self, id: &str) -> Result<Option<T>> {
        let tree = self.tree("wizard_sessions")?;
        match tree.get(id).map_err(|e| DocBroError::Internal { message: e.to_string() })? {
            Some(bytes) => Ok(Some(from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn wizard_session_delete(&self, id: &str) -> Result<()> {
        let _guard = self.write_lock.lock();
        let tree = self.tree("wizard_sessions")?;
        let timestamps = self.tree("wizard_session_timestamps")?;
        tree.remove(id).map_err(|e| DocBroError::Internal { message: e.to_string() })?;
        timestamps.remove(id).map_err(|e| DocBroError::Internal { message: e.to_string() })?;
        Ok(())
    }

    pub fn wizard_session_count(&self) -> Result<usize> {
        let tree = self.tree("wizard_sessions")?;
        Ok(tree.len())
    }

    /// Drops sessions whose recorded `updated_at` is older than `max_age_secs`
    /// (spec §4.J `sweep_expired`: 30 minutes). Returns the ids dropped.
    pub fn wizard_session_sweep_expired(&self, now: DateTime<Utc>, max_age_secs: i64) -> Result<Vec<String>> {
        let _guard = self.write_lock.lock();
        let timestamps = self.tree("wizard_session_timestamps")?;
        let tree = self.tree("wizard_sessions")?;
        let mut dropped = Vec::new();
        for entry in timestamps.iter().filter_map(std::result::Result::ok) {
            let (key, value) = entry;
            let id = String::from_utf8_lossy(&key).to_string();
            let mut ts_bytes = [0u8; 8];
            ts_bytes.copy_from_slice(&value[..8]);
            let updated_at = i64::from_le_bytes(ts_bytes);
            if now.timestamp() - updated_at > max_age_secs {
                let _ = tree.remove(&id);
                let _ = timestamps.remove(&id);
                dropped.push(id);
            }
        }
        Ok(dropped)
    }

    // ---- Settings (raw key-value overrides, distinct from the YAML file) -----

    pub fn setting_get(&self, key: &str) -> Result<Option<String>> {
        let tree = self.tree("settings")?;
        match tree.get(key).map_err(|e| DocBroError::Internal { message: e.to_string() })? {
            Some(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).to_string())),
            None => Ok(None),
        }
    }

    pub fn setting_set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.write_lock.lock();
        let tree = self.tree("settings")?;
        tree.insert(key, value.as_bytes()).map_err(|e| DocBroError::Internal { message: e.to_string() })?;
        Ok(())
    }
}

fn docbro_core_hash_url(url: &str) -> String {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    url.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

pub type SharedMetaStore = Arc<MetaStore>;

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MetaStore {
        MetaStore::open_temporary()
    }

    #[test]
    fn system_default_shelf_seeded() {
        let store = store();
        let shelf = store.shelf_get_by_name("default").unwrap();
        assert!(shelf.protected);
        assert!(shelf.is_current);
    }

    #[test]
    fn duplicate_shelf_name_rejected() {
        let store = store();
        store.shelf_create("docs", None, BoxType::Rag, false, vec![], false).unwrap();
        let err = store.shelf_create("docs", None, BoxType::Rag, false, vec![], false).unwrap_err();
        assert_eq!(err.code(), "name_taken");
        assert_eq!(store.shelf_list(false, None).unwrap().iter().filter(|s| s.name == "docs").count(), 1);
    }

    #[test]
    fn shelf_rename_round_trip_is_idempotent() {
        let store = store();
        store.shelf_create("n", None, BoxType::Rag, false, vec![], false).unwrap();
        store.shelf_rename("n", "m").unwrap();
        store.shelf_rename("m", "n").unwrap();
        let shelf = store.shelf_get_by_name("n").unwrap();
        assert_eq!(shelf.name, "n");
    }

    #[test]
    fn deleting_current_shelf_promotes_default() {
        let store = store();
        store.shelf_create("docs", None, BoxType::Rag, false, vec![], true).unwrap();
        store.shelf_delete("docs", true).unwrap();
        let current = store.shelf_current().unwrap();
        assert_eq!(current.name, "default");
    }

    #[test]
    fn protected_shelf_cannot_be_deleted() {
        let store = store();
        let err = store.shelf_delete("default", true).unwrap_err();
        assert_eq!(err.code(), "protected");
    }

    #[test]
    fn box_create_and_membership() {
        let store = store();
        let shelf = store.shelf_get_by_name("default").unwrap();
        let dbox = store
            .box_create("py-docs", BoxConfig::Rag(RagConfig::default()), None)
            .unwrap();
        store.membership_add(shelf.id, dbox.id).unwrap();
        let boxes = store.box_list(Some("default"), None).unwrap();
        assert_eq!(boxes.len(), 1);
        store.membership_remove(shelf.id, dbox.id).unwrap();
        let boxes = store.box_list(Some("default"), None).unwrap();
        assert!(boxes.is_empty());
    }

    #[test]
    fn box_delete_removes_chunks() {
        let store = store();
        let dbox = store.box_create("b", BoxConfig::Rag(RagConfig::default()), None).unwrap();
        let page = Page {
            id: PageId::new(),
            box_id: dbox.id,
            url: "https://x/1".to_string(),
            fetched_at: chrono::Utc::now(),
            status_code: 200,
            etag: None,
            content_hash: "h".to_string(),
            title: "t".to_string(),
            depth: 0,
        };
        let page = store.page_upsert(page).unwrap();
        let chunk = Chunk::new(page.id, dbox.id, 0, "hello", CharSpan { start: 0, end: 5 });
        store.chunk_insert_batch(&[chunk]).unwrap();
        assert_eq!(store.chunk_count_for_box(dbox.id).unwrap(), 1);
        store.box_delete("b", true).unwrap();
        assert_eq!(store.chunk_count_for_box(dbox.id).unwrap(), 0);
    }

    #[test]
    fn box_save_persists_configuration_state_changes() {
        let store = store();
        let mut dbox = store.box_create("b2", BoxConfig::Rag(RagConfig::default()), None).unwrap();
        assert!(!dbox.configuration_state.has_content);
        dbox.mark_has_content();
        store.box_save(&dbox).unwrap();
        let reloaded = store.box_get_by_name("b2").unwrap();
        assert!(reloaded.configuration_state.has_content);
    }

    #[test]
    fn wizard_session_sweep_drops_stale_entries() {
        let store = store();
        let old = Utc::now() - chrono::Duration::minutes(31);
        store.wizard_session_save("sess-1", old, &serde_json::json!({"step": 1})).unwrap();
        let dropped = store.wizard_session_sweep_expired(Utc::now(), 30 * 60).unwrap();
        assert_eq!(dropped, vec!["sess-1".to_string()]);
        assert!(store.wizard_session_load::<serde_json::Value>("sess-1").unwrap().is_none());
    }
}

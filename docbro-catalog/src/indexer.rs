//! ABOUTME: Indexer — chunk -> embed -> vector-upsert -> metadata-insert pipeline (spec §4.G)

use std::collections::HashMap;
use std::sync::Arc;

use docbro_chunk::{chunk_page, ChunkStrategy};
use docbro_context::prelude::ContextEngine;
use docbro_core::prelude::*;
use docbro_embed::batch::AdaptiveBatchSize;
use docbro_embed::traits::Embedder;
use docbro_storage::prelude::{SharedMetaStore, VectorPoint, VectorStore};
use tracing::{info, warn};

/// A freshly-fetched page awaiting indexing.
pub struct FetchedPage {
    pub url: String,
    pub status_code: u16,
    pub etag: Option<String>,
    pub title: String,
    pub text: String,
    pub depth: u32,
}

/// Orchestrates the per-page pipeline named in spec §4.G: chunk, embed (with
/// adaptive batching), vector-upsert, then metadata-insert — in that order,
/// so a crash between steps 3 and 4 never leaves a chunk row pointing at a
/// vector that doesn't exist.
pub struct Indexer<E: Embedder> {
    store: SharedMetaStore,
    vector_store: Arc<dyn VectorStore>,
    embedder: E,
    context: Option<Arc<ContextEngine>>,
}

impl<E: Embedder> Indexer<E> {
    #[must_use]
    pub fn new(store: SharedMetaStore, vector_store: Arc<dyn VectorStore>, embedder: E) -> Self {
        Self { store, vector_store, embedder, context: None }
    }

    #[must_use]
    pub fn with_context_engine(mut self, context: Arc<ContextEngine>) -> Self {
        self.context = Some(context);
        self
    }

    /// Returns the number of chunks newly created (0 if the page's content
    /// was unchanged — spec §4.G idempotence).
    pub async fn index_page(
        &self,
        dbox: &DocBox,
        page: FetchedPage,
        project: &str,
        chunk_strategy: ChunkStrategy,
        chunk_size: usize,
        chunk_overlap: usize,
        heading_trail: &[String],
    ) -> Result<usize> {
        let content_hash = docbro_utils::prelude::sha256_hex(&page.text);
        let existing = self.store.page_get(dbox.id, &page.url)?;
        if let Some(existing) = &existing {
            if existing.content_hash == content_hash {
                info!(event = "index_skip_unchanged", url = %page.url);
                return Ok(0);
            }
            self.delete_page_chunks(dbox.id, existing.id).await?;
        }

        let page_id = existing.as_ref().map_or_else(PageId::new, |p| p.id);
        let page_row = Page {
            id: page_id,
            box_id: dbox.id,
            url: page.url.clone(),
            fetched_at: chrono::Utc::now(),
            status_code: page.status_code,
            etag: page.etag,
            content_hash,
            title: page.title.clone(),
            depth: page.depth,
        };
        let page_row = self.store.page_upsert(page_row)?;

        let mut chunks = chunk_page(
            &self.embedder,
            chunk_strategy,
            &page.text,
            chunk_size,
            chunk_overlap,
            page_row.id,
            dbox.id,
            project,
            &page.title,
            heading_trail,
        )
        .await;

        if chunks.is_empty() {
            return Ok(0);
        }

        let embeddings = self.embed_all(&chunks).await?;
        let collection = dbox.id.to_string();
        self.vector_store.ensure_collection(&collection, self.embedder.dim()).await?;

        let mut points = Vec::with_capacity(chunks.len());
        for (chunk, embedding) in chunks.iter().zip(embeddings.iter()) {
            let vector_id = chunk.id.to_string();
            let mut payload = HashMap::new();
            payload.insert("chunk_id".to_string(), serde_json::json!(chunk.id.to_string()));
            payload.insert("page_id".to_string(), serde_json::json!(page_row.id.to_string()));
            payload.insert("box_id".to_string(), serde_json::json!(dbox.id.to_string()));
            payload.insert("page_url".to_string(), serde_json::json!(page_row.url));
            payload.insert("title".to_string(), serde_json::json!(page_row.title));
            payload.insert("text".to_string(), serde_json::json!(chunk.text));
            payload.insert("fetched_at".to_string(), serde_json::json!(page_row.fetched_at.to_rfc3339()));
            points.push(VectorPoint { id: vector_id, vector: embedding.clone(), payload });
        }

        // Vector-insert precedes metadata-insert (spec §4.G).
        self.vector_store.upsert(&collection, points).await?;

        for chunk in &mut chunks {
            chunk.embedding_ref = Some(chunk.id.to_string());
        }
        self.store.chunk_insert_batch(&chunks)?;

        let mut updated_box = dbox.clone();
        updated_box.mark_has_content();
        self.store.box_save(&updated_box)?;
        if let Some(context) = &self.context {
            context.invalidate(&updated_box.name);
        }

        Ok(chunks.len())
    }

    async fn delete_page_chunks(&self, box_id: BoxId, page_id: PageId) -> Result<()> {
        let deleted_ids = self.store.chunk_delete_for_page(page_id)?;
        if deleted_ids.is_empty() {
            return Ok(());
        }
        let mut filter = HashMap::new();
        filter.insert("page_id".to_string(), serde_json::json!(page_id.to_string()));
        self.vector_store.delete_by_filter(&box_id.to_string(), filter).await
    }

    async fn embed_all(&self, chunks: &[Chunk]) -> Result<Vec<Vec<f32>>> {
        let mut batch_size = AdaptiveBatchSize::new();
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let mut embeddings = Vec::with_capacity(texts.len());
        let mut offset = 0;
        while offset < texts.len() {
            let end = (offset + batch_size.current()).min(texts.len());
            match self.embedder.embed_batch(&texts[offset..end]).await {
                Ok(batch_embeddings) => {
                    embeddings.extend(batch_embeddings);
                    batch_size.record_success();
                    offset = end;
                }
                Err(err) => {
                    warn!(event = "embed_batch_failed", error = %err, batch_len = end - offset);
                    batch_size.record_failure();
                    if batch_size.current() == end - offset {
                        return Err(err);
                    }
                }
            }
        }
        Ok(embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docbro_core::boxes::RagConfig;
    use docbro_embed::deterministic::DeterministicEmbedder;
    use docbro_storage::metastore::MetaStore;
    use docbro_storage::vector::embedded::EmbeddedVectorStore;

    fn fixtures() -> (Indexer<DeterministicEmbedder>, SharedMetaStore, DocBox) {
        let store: SharedMetaStore = Arc::new(MetaStore::open_temporary());
        let dbox = store.box_create("b", BoxConfig::Rag(RagConfig::default()), None).unwrap();
        let tmp = tempfile::tempdir().unwrap();
        let vector_store: Arc<dyn VectorStore> = Arc::new(EmbeddedVectorStore::new(tmp.path().to_path_buf()));
        let embedder = DeterministicEmbedder::new("m", 8);
        let indexer = Indexer::new(store.clone(), vector_store, embedder);
        (indexer, store, dbox)
    }

    #[tokio::test]
    async fn indexing_a_new_page_creates_chunks_and_marks_has_content() {
        let (indexer, store, dbox) = fixtures();
        let page = FetchedPage {
            url: "https://docs.example.com/a".to_string(),
            status_code: 200,
            etag: None,
            title: "Intro".to_string(),
            text: "hello world ".repeat(50),
            depth: 0,
        };
        let count = indexer
            .index_page(&dbox, page, "proj", ChunkStrategy::Character, 100, 20, &[])
            .await
            .unwrap();
        assert!(count > 0);
        let reloaded = store.box_get_by_name("b").unwrap();
        assert!(reloaded.configuration_state.has_content);
    }

    #[tokio::test]
    async fn reindexing_unchanged_content_is_a_no_op() {
        let (indexer, _store, dbox) = fixtures();
        let text = "same content ".repeat(30);
        let page1 = FetchedPage {
            url: "https://docs.example.com/a".to_string(),
            status_code: 200,
            etag: None,
            title: "Intro".to_string(),
            text: text.clone(),
            depth: 0,
        };
        let first = indexer
            .index_page(&dbox, page1, "proj", ChunkStrategy::Character, 100, 20, &[])
            .await
            .unwrap();
        assert!(first > 0);

        let page2 = FetchedPage {
            url: "https://docs.example.com/a".to_string(),
            status_code: 200,
            etag: None,
            title: "Intro".to_string(),
            text,
            depth: 0,
        };
        let second = indexer
            .index_page(&dbox, page2, "proj", ChunkStrategy::Character, 100, 20, &[])
            .await
            .unwrap();
        assert_eq!(second, 0);
    }

    #[tokio::test]
    async fn reindexing_changed_content_replaces_old_chunks() {
        let (indexer, store, dbox) = fixtures();
        let page1 = FetchedPage {
            url: "https://docs.example.com/a".to_string(),
            status_code: 200,
            etag: None,
            title: "Intro".to_string(),
            text: "version one ".repeat(30),
            depth: 0,
        };
        indexer
            .index_page(&dbox, page1, "proj", ChunkStrategy::Character, 100, 20, &[])
            .await
            .unwrap();
        let page_id_1 = store.page_get(dbox.id, "https://docs.example.com/a").unwrap().unwrap().id;
        let chunks_before = store.chunk_list_for_page(page_id_1).unwrap().len();

        let page2 = FetchedPage {
            url: "https://docs.example.com/a".to_string(),
            status_code: 200,
            etag: None,
            title: "Intro".to_string(),
            text: "version two is different and longer ".repeat(30),
            depth: 0,
        };
        let second = indexer
            .index_page(&dbox, page2, "proj", ChunkStrategy::Character, 100, 20, &[])
            .await
            .unwrap();
        assert!(second > 0);
        let chunks_after = store.chunk_list_for_page(page_id_1).unwrap().len();
        assert_eq!(chunks_after, second);
        assert_ne!(chunks_before, 0);
    }
}

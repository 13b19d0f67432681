//! ABOUTME: Bridges crawler output into the indexer via `docbro_crawler::PageSink`

use async_trait::async_trait;
use docbro_chunk::ChunkStrategy;
use docbro_core::crawl::Page;
use docbro_core::error::Result;
use docbro_core::prelude::DocBox;
use docbro_crawler::prelude::PageSink;
use docbro_embed::traits::Embedder;

use crate::indexer::{FetchedPage, Indexer};

/// Adapts a fixed `(box, chunking config)` pair to the crawler's `PageSink`
/// port, so `docbro-crawler` never has to know about chunking, embedding, or
/// storage.
pub struct CatalogPageSink<E: Embedder> {
    indexer: Indexer<E>,
    dbox: DocBox,
    project: String,
    chunk_strategy: ChunkStrategy,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl<E: Embedder> CatalogPageSink<E> {
    #[must_use]
    pub fn new(
        indexer: Indexer<E>,
        dbox: DocBox,
        project: String,
        chunk_strategy: ChunkStrategy,
        chunk_size: usize,
        chunk_overlap: usize,
    ) -> Self {
        Self { indexer, dbox, project, chunk_strategy, chunk_size, chunk_overlap }
    }
}

#[async_trait]
impl<E: Embedder> PageSink for CatalogPageSink<E> {
    async fn accept(&self, page: Page, body_text: String, title: String) -> Result<()> {
        let fetched = FetchedPage {
            url: page.url,
            status_code: page.status_code,
            etag: page.etag,
            title,
            text: body_text,
            depth: page.depth,
        };
        self.indexer
            .index_page(&self.dbox, fetched, &self.project, self.chunk_strategy, self.chunk_size, self.chunk_overlap, &[])
            .await?;
        Ok(())
    }
}

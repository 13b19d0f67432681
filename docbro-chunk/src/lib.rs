//! ABOUTME: Character and semantic chunking strategies, assembled into domain `Chunk` rows

pub mod character;
pub mod semantic;
pub mod sentence;

use chrono::Utc;
use docbro_core::chunk::Chunk;
use docbro_core::ids::{BoxId, ChunkId, PageId};
use docbro_embed::traits::Embedder;

pub use character::{character_chunk, RawChunk};
pub use semantic::semantic_chunk;

/// Selectable per indexing call (spec §4.D).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkStrategy {
    Character,
    Semantic,
}

impl Default for ChunkStrategy {
    fn default() -> Self {
        Self::Character
    }
}

/// Runs the selected strategy and assembles the resulting `RawChunk`s into
/// ordered, header-prefixed `Chunk` domain rows.
pub async fn chunk_page<E: Embedder>(
    embedder: &E,
    strategy: ChunkStrategy,
    text: &str,
    chunk_size: usize,
    chunk_overlap: usize,
    page_id: PageId,
    box_id: BoxId,
    project: &str,
    title: &str,
    heading_trail: &[String],
) -> Vec<Chunk> {
    let raw_chunks = match strategy {
        ChunkStrategy::Character => character_chunk(text, chunk_size, chunk_overlap),
        ChunkStrategy::Semantic => semantic_chunk(embedder, text, chunk_size, chunk_overlap).await,
    };

    let header_context = Chunk::build_header_context(project, title, heading_trail);

    raw_chunks
        .into_iter()
        .enumerate()
        .map(|(ordinal, raw)| {
            Chunk {
                id: ChunkId::new(),
                page_id,
                box_id,
                ordinal: ordinal as u32,
                text: raw.text,
                header_context: header_context.clone(),
                char_span: raw.char_span,
                embedding_ref: None,
                created_at: Utc::now(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use docbro_embed::deterministic::DeterministicEmbedder;

    #[tokio::test]
    async fn character_strategy_assigns_sequential_ordinals() {
        let embedder = DeterministicEmbedder::new("m", 8);
        let page_id = PageId::new();
        let box_id = BoxId::new();
        let text = "a".repeat(250);
        let heading_trail = vec!["h1".to_string(), "h2".to_string()];
        let chunks = chunk_page(&embedder, ChunkStrategy::Character, &text, 100, 20, page_id, box_id, "proj", "Title", &heading_trail).await;
        assert!(chunks.len() > 1);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.ordinal, i as u32);
            assert!(chunk.header_context.starts_with("[proj/Title]"));
            assert_eq!(chunk.page_id, page_id);
            assert_eq!(chunk.box_id, box_id);
        }
    }

    #[tokio::test]
    async fn empty_document_yields_zero_chunks_for_either_strategy() {
        let embedder = DeterministicEmbedder::new("m", 8);
        let page_id = PageId::new();
        let box_id = BoxId::new();
        let character = chunk_page(&embedder, ChunkStrategy::Character, "", 500, 50, page_id, box_id, "p", "t", &[]).await;
        let semantic = chunk_page(&embedder, ChunkStrategy::Semantic, "", 500, 50, page_id, box_id, "p", "t", &[]).await;
        assert!(character.is_empty());
        assert!(semantic.is_empty());
    }
}

//! ABOUTME: Chunk domain type — a contiguous text slice of a page that owns one embedding

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{BoxId, ChunkId, PageId};

/// Byte or character offsets into the page's extracted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharSpan {
    pub start: usize,
    pub end: usize,
}

/// A contiguous text slice of a page, with a prefixed contextual header,
/// that owns one embedding (spec §3 Chunk, Glossary).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub id: ChunkId,
    pub page_id: PageId,
    pub box_id: BoxId,
    pub ordinal: u32,
    pub text: String,
    pub header_context: String,
    pub char_span: CharSpan,
    /// Opaque pointer into the VectorStore; identifies the chunk's vector
    /// point. `None` until the indexer has confirmed the vector-insert
    /// (spec §4.G: vector-insert precedes metadata-insert).
    pub embedding_ref: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Chunk {
    #[must_use]
    pub fn new(page_id: PageId, box_id: BoxId, ordinal: u32, text: impl Into<String>, span: CharSpan) -> Self {
        Self {
            id: ChunkId::new(),
            page_id,
            box_id,
            ordinal,
            text: text.into(),
            header_context: String::new(),
            char_span: span,
            embedding_ref: None,
            created_at: Utc::now(),
        }
    }

    /// `"[{project}/{title}] > {heading_trail} :: "` prefix, truncated to
    /// 300 chars total (spec §4.D Contextual header).
    #[must_use]
    pub fn build_header_context(project: &str, title: &str, heading_trail: &[String]) -> String {
        let trail = heading_trail.join(" > ");
        let header = format!("[{project}/{title}] > {trail} :: ");
        if header.chars().count() <= 300 {
            header
        } else {
            header.chars().take(300).collect()
        }
    }

    #[must_use]
    pub fn with_header_context(mut self, header: impl Into<String>) -> Self {
        self.header_context = header.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_context_truncated_to_300_chars() {
        let trail: Vec<String> = (0..100).map(|i| format!("heading-{i}")).collect();
        let header = Chunk::build_header_context("proj", "title", &trail);
        assert!(header.chars().count() <= 300);
    }

    #[test]
    fn header_context_format() {
        let header = Chunk::build_header_context("docbro", "Intro", &["Setup".to_string(), "Install".to_string()]);
        assert_eq!(header, "[docbro/Intro] > Setup > Install :: ");
    }
}

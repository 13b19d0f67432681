//! ABOUTME: Embedding-similarity chunking with a 5-second timeout fallback (spec §4.D)

use std::time::Duration;

use docbro_core::prelude::DocBroError;
use docbro_embed::traits::Embedder;

use crate::character::{character_chunk, RawChunk};
use crate::sentence::split_sentences_with_byte_offsets;

const SIMILARITY_THRESHOLD: f32 = 0.75;
const TIMEOUT: Duration = Duration::from_secs(5);

/// Groups adjacent sentences into chunks by running-centroid cosine
/// similarity. Falls back to character chunking (and logs
/// `semantic_timeout_fallback`) if grouping takes longer than
/// [`TIMEOUT`] or the embedder itself fails.
pub async fn semantic_chunk<E: Embedder>(embedder: &E, text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<RawChunk> {
    if text.is_empty() {
        return Vec::new();
    }

    match tokio::time::timeout(TIMEOUT, group_by_similarity(embedder, text, chunk_size)).await {
        Ok(Ok(chunks)) => chunks,
        Ok(Err(err)) => {
            tracing::warn!(event = "semantic_chunk_embed_failed", error = %err, "falling back to character chunking");
            character_chunk(text, chunk_size, chunk_overlap)
        }
        Err(_) => {
            tracing::warn!(event = "semantic_timeout_fallback", timeout_secs = TIMEOUT.as_secs(), "falling back to character chunking");
            character_chunk(text, chunk_size, chunk_overlap)
        }
    }
}

async fn group_by_similarity<E: Embedder>(
    embedder: &E,
    text: &str,
    chunk_size: usize,
) -> Result<Vec<RawChunk>, DocBroError> {
    let sentences = split_sentences_with_byte_offsets(text);
    if sentences.is_empty() {
        return Ok(Vec::new());
    }
    if sentences.len() == 1 {
        let (_, start_byte, end_byte) = sentences[0];
        return Ok(vec![RawChunk {
            text: text[start_byte..end_byte].to_string(),
            char_span: byte_span_to_char_span(text, start_byte, end_byte),
        }]);
    }

    let sentence_texts: Vec<String> = sentences.iter().map(|(s, _, _)| (*s).to_string()).collect();
    let embeddings = embedder.embed_batch(&sentence_texts).await?;

    let mut chunks = Vec::new();
    let mut group_start = 0usize;
    let mut centroid = embeddings[0].clone();
    let mut group_char_len = sentences[0].0.chars().count();

    for i in 1..sentences.len() {
        let similarity = cosine_similarity(&centroid, &embeddings[i]);
        let would_exceed_size = group_char_len + sentences[i].0.chars().count() > chunk_size;

        if similarity < SIMILARITY_THRESHOLD || would_exceed_size {
            chunks.push(build_group_chunk(text, &sentences, group_start, i));
            group_start = i;
            centroid = embeddings[i].clone();
            group_char_len = sentences[i].0.chars().count();
        } else {
            centroid = running_average(&centroid, &embeddings[i], i - group_start + 1);
            group_char_len += sentences[i].0.chars().count();
        }
    }
    chunks.push(build_group_chunk(text, &sentences, group_start, sentences.len()));

    Ok(chunks)
}

fn build_group_chunk(text: &str, sentences: &[(&str, usize, usize)], from: usize, to: usize) -> RawChunk {
    let start_byte = sentences[from].1;
    let end_byte = sentences[to - 1].2;
    RawChunk { text: text[start_byte..end_byte].to_string(), char_span: byte_span_to_char_span(text, start_byte, end_byte) }
}

fn byte_span_to_char_span(text: &str, start_byte: usize, end_byte: usize) -> docbro_core::chunk::CharSpan {
    let start = text[..start_byte].chars().count();
    let end = text[..end_byte].chars().count();
    docbro_core::chunk::CharSpan { start, end }
}

#[allow(clippy::cast_precision_loss)]
fn running_average(centroid: &[f32], next: &[f32], count: usize) -> Vec<f32> {
    let n = count as f32;
    centroid.iter().zip(next).map(|(c, v)| (c * (n - 1.0) + v) / n).collect()
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docbro_embed::deterministic::DeterministicEmbedder;

    #[tokio::test]
    async fn empty_document_yields_zero_chunks() {
        let embedder = DeterministicEmbedder::new("m", 8);
        let chunks = semantic_chunk(&embedder, "", 500, 50).await;
        assert!(chunks.is_empty());
    }

    #[tokio::test]
    async fn single_sentence_document_yields_one_chunk() {
        let embedder = DeterministicEmbedder::new("m", 8);
        let chunks = semantic_chunk(&embedder, "Just one sentence.", 500, 50).await;
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Just one sentence.");
    }

    #[tokio::test]
    async fn chunk_size_limit_forces_a_split() {
        let embedder = DeterministicEmbedder::new("m", 8);
        let text = "Sentence one is here. Sentence two follows. Sentence three continues. Sentence four closes.";
        let chunks = semantic_chunk(&embedder, text, 30, 0).await;
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.char_span.end > chunk.char_span.start);
        }
    }
}

//! ABOUTME: Strategy enumeration and execution — semantic/hybrid/fusion/advanced (spec §4.E)

use std::collections::HashMap;

use docbro_config::synonyms::SynonymMap;
use docbro_core::prelude::{DocBroError, Result};
use docbro_embed::traits::Embedder;
use docbro_storage::prelude::VectorStore;
use docbro_utils::prelude::{term_overlap, tokenize};
use serde::{Deserialize, Serialize};

use crate::candidate::{from_vector_hit, RetrievedChunk};
use crate::query_transform::expand_query;
use crate::rrf::{reciprocal_rank_fusion, DEFAULT_K};

/// Over-fetch factor so the keyword branch has a real pool to filter; DocBro
/// has no separate inverted index, so "keyword search" re-scores the same
/// vector-backed candidate pool by term overlap rather than scanning the
/// whole corpus.
const KEYWORD_POOL_MULTIPLIER: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalStrategy {
    Semantic,
    Hybrid,
    Fusion,
    Advanced,
}

async fn embed_query(embedder: &dyn Embedder, query: &str) -> Result<Vec<f32>> {
    let mut vectors = embedder.embed_batch(&[query.to_string()]).await?;
    vectors.pop().ok_or_else(|| DocBroError::Internal { message: "embedder returned no vector".to_string() })
}

async fn vector_search(
    embedder: &dyn Embedder,
    vector_store: &dyn VectorStore,
    collection: &str,
    query: &str,
    top_k: usize,
) -> Result<Vec<RetrievedChunk>> {
    let vector = embed_query(embedder, query).await?;
    let hits = vector_store.search(collection, &vector, top_k, None).await?;
    Ok(hits.into_iter().filter_map(from_vector_hit).collect())
}

fn keyword_rescore(pool: &[RetrievedChunk], query: &str, top_k: usize) -> Vec<RetrievedChunk> {
    let query_tokens = tokenize(query);
    let mut scored: Vec<(f64, &RetrievedChunk)> = pool
        .iter()
        .map(|c| (term_overlap(&query_tokens, &tokenize(&c.text)), c))
        .filter(|(score, _)| *score > 0.0)
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.into_iter().take(top_k).map(|(_, c)| c.clone()).collect()
}

fn union_by_chunk_id(lists: Vec<Vec<RetrievedChunk>>) -> Vec<RetrievedChunk> {
    let mut seen = std::collections::HashSet::new();
    let mut merged = Vec::new();
    for list in lists {
        for chunk in list {
            if seen.insert(chunk.chunk_id.clone()) {
                merged.push(chunk);
            }
        }
    }
    merged
}

async fn semantic(
    embedder: &dyn Embedder,
    vector_store: &dyn VectorStore,
    collection: &str,
    query: &str,
    top_k: usize,
) -> Result<Vec<RetrievedChunk>> {
    vector_search(embedder, vector_store, collection, query, top_k).await
}

async fn hybrid(
    embedder: &dyn Embedder,
    vector_store: &dyn VectorStore,
    collection: &str,
    query: &str,
    top_k: usize,
) -> Result<Vec<RetrievedChunk>> {
    let (semantic_hits, pool) = tokio::try_join!(
        vector_search(embedder, vector_store, collection, query, top_k),
        vector_search(embedder, vector_store, collection, query, top_k * KEYWORD_POOL_MULTIPLIER),
    )?;
    let keyword_hits = keyword_rescore(&pool, query, top_k);
    Ok(union_by_chunk_id(vec![semantic_hits, keyword_hits]))
}

async fn ranked_branch(
    embedder: &dyn Embedder,
    vector_store: &dyn VectorStore,
    collection: &str,
    variant: &str,
    top_k: usize,
    include_keyword: bool,
) -> Result<Vec<Vec<RetrievedChunk>>> {
    let semantic_hits = vector_search(embedder, vector_store, collection, variant, top_k).await?;
    if !include_keyword {
        return Ok(vec![semantic_hits]);
    }
    let pool = vector_search(embedder, vector_store, collection, variant, top_k * KEYWORD_POOL_MULTIPLIER).await?;
    let keyword_hits = keyword_rescore(&pool, variant, top_k);
    Ok(vec![semantic_hits, keyword_hits])
}

async fn fused(
    embedder: &dyn Embedder,
    vector_store: &dyn VectorStore,
    collection: &str,
    variants: &[String],
    top_k: usize,
    include_keyword: bool,
) -> Result<Vec<RetrievedChunk>> {
    let branch_futures = variants.iter().map(|variant| {
        ranked_branch(embedder, vector_store, collection, variant, top_k, include_keyword)
    });
    let branch_results = futures::future::try_join_all(branch_futures).await?;

    let mut by_id: HashMap<String, RetrievedChunk> = HashMap::new();
    let mut rankings = Vec::new();
    for branch in branch_results {
        for list in branch {
            rankings.push(list.iter().map(|c| c.chunk_id.clone()).collect());
            for chunk in list {
                by_id.entry(chunk.chunk_id.clone()).or_insert(chunk);
            }
        }
    }

    let fused_order = reciprocal_rank_fusion(&rankings, DEFAULT_K);
    Ok(fused_order.into_iter().filter_map(|(id, _)| by_id.get(&id).cloned()).take(top_k).collect())
}

/// Runs `strategy` against `collection` and returns candidates ordered by
/// the strategy's own ranking (reranking, if requested, happens downstream).
pub async fn retrieve(
    embedder: &dyn Embedder,
    vector_store: &dyn VectorStore,
    collection: &str,
    query: &str,
    top_k: usize,
    strategy: RetrievalStrategy,
    synonyms: Option<&SynonymMap>,
) -> Result<Vec<RetrievedChunk>> {
    match strategy {
        RetrievalStrategy::Semantic => semantic(embedder, vector_store, collection, query, top_k).await,
        RetrievalStrategy::Hybrid => hybrid(embedder, vector_store, collection, query, top_k).await,
        RetrievalStrategy::Fusion => {
            let variants = expand_query(query, synonyms);
            fused(embedder, vector_store, collection, &variants, top_k, true).await
        }
        RetrievalStrategy::Advanced => {
            let variants = expand_query(query, synonyms);
            fused(embedder, vector_store, collection, &variants, top_k, false).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docbro_embed::deterministic::DeterministicEmbedder;
    use docbro_storage::vector::embedded::EmbeddedVectorStore;
    use docbro_storage::vector::VectorPoint;

    async fn seeded_store(dir: &std::path::Path) -> EmbeddedVectorStore {
        let store = EmbeddedVectorStore::new(dir.to_path_buf());
        store.ensure_collection("box1", 8).await.unwrap();
        let embedder = DeterministicEmbedder::new("m", 8);
        let docs = [
            ("c1", "how to install the CLI", "Install Guide", "https://docs.example.com/install"),
            ("c2", "configuring rate limits", "Config Guide", "https://docs.example.com/config"),
            ("c3", "troubleshooting crawl errors", "Troubleshooting", "https://docs.example.com/ts"),
        ];
        let mut points = Vec::new();
        for (id, text, title, url) in docs {
            let vector = embedder.embed_batch(&[text.to_string()]).await.unwrap().remove(0);
            let mut payload = HashMap::new();
            payload.insert("page_url".to_string(), serde_json::json!(url));
            payload.insert("box_id".to_string(), serde_json::json!("box1"));
            payload.insert("title".to_string(), serde_json::json!(title));
            payload.insert("text".to_string(), serde_json::json!(text));
            points.push(VectorPoint { id: id.to_string(), vector, payload });
        }
        store.upsert("box1", points).await.unwrap();
        store
    }

    #[tokio::test]
    async fn semantic_strategy_returns_candidates() {
        let dir = tempfile::tempdir().unwrap();
        let store = seeded_store(dir.path()).await;
        let embedder = DeterministicEmbedder::new("m", 8);
        let results =
            retrieve(&embedder, &store, "box1", "how to install the CLI", 2, RetrievalStrategy::Semantic, None).await.unwrap();
        assert!(!results.is_empty());
        assert!(results.len() <= 2);
    }

    #[tokio::test]
    async fn hybrid_strategy_surfaces_keyword_matches() {
        let dir = tempfile::tempdir().unwrap();
        let store = seeded_store(dir.path()).await;
        let embedder = DeterministicEmbedder::new("m", 8);
        let results = retrieve(&embedder, &store, "box1", "troubleshooting crawl errors", 3, RetrievalStrategy::Hybrid, None)
            .await
            .unwrap();
        assert!(results.iter().any(|c| c.chunk_id == "c3"));
    }

    #[tokio::test]
    async fn fusion_strategy_deduplicates_across_variants() {
        let dir = tempfile::tempdir().unwrap();
        let store = seeded_store(dir.path()).await;
        let embedder = DeterministicEmbedder::new("m", 8);
        let results = retrieve(&embedder, &store, "box1", "install", 3, RetrievalStrategy::Fusion, None).await.unwrap();
        let mut ids: Vec<&str> = results.iter().map(|c| c.chunk_id.as_str()).collect();
        let before_len = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), before_len);
    }
}

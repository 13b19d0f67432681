//! ABOUTME: Fast multi-signal reranker applied after fusion (spec §4.E)

use chrono::Utc;
use docbro_config::settings::RerankWeights;
use docbro_utils::prelude::{term_overlap, tokenize};
use serde::{Deserialize, Serialize};

use crate::candidate::RetrievedChunk;

const FRESHNESS_HALF_LIFE_DAYS: f64 = 180.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signals {
    pub vector: f32,
    pub term: f64,
    pub title: f64,
    pub freshness: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedResult {
    pub score: f64,
    pub signals: Signals,
    pub chunk_id: String,
    pub page_url: String,
    pub box_id: String,
    pub text: String,
}

fn min_max_normalize(scores: &[f32]) -> Vec<f32> {
    let min = scores.iter().copied().fold(f32::INFINITY, f32::min);
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if !(max > min) {
        return vec![1.0; scores.len()];
    }
    scores.iter().map(|s| (s - min) / (max - min)).collect()
}

fn title_match(query_tokens: &std::collections::HashSet<String>, title: &str) -> f64 {
    let title_lower = title.to_lowercase();
    if query_tokens.iter().any(|t| title_lower.contains(t.as_str())) {
        1.0
    } else {
        0.0
    }
}

fn freshness(fetched_at: chrono::DateTime<Utc>) -> f64 {
    let delta_days = (Utc::now() - fetched_at).num_seconds() as f64 / 86_400.0;
    (-delta_days.max(0.0) / FRESHNESS_HALF_LIFE_DAYS).exp()
}

/// Scores and stable-sorts `candidates` (original order preserved as the
/// first tiebreak, `chunk_id` as the second).
#[must_use]
pub fn rerank(candidates: Vec<RetrievedChunk>, query: &str, weights: &RerankWeights) -> Vec<RankedResult> {
    if candidates.is_empty() {
        return Vec::new();
    }

    let vector_scores: Vec<f32> = candidates.iter().map(|c| c.vector_score).collect();
    let normalized_vector = min_max_normalize(&vector_scores);
    let query_tokens = tokenize(query);

    let mut ranked: Vec<(usize, RankedResult)> = candidates
        .into_iter()
        .enumerate()
        .map(|(original_rank, candidate)| {
            let term = term_overlap(&query_tokens, &tokenize(&candidate.text));
            let title = title_match(&query_tokens, &candidate.title);
            let fresh = freshness(candidate.fetched_at);
            let vector_norm = normalized_vector[original_rank];

            let score = weights.vector * f64::from(vector_norm)
                + weights.term_overlap * term
                + weights.title_match * title
                + weights.freshness * fresh;

            (
                original_rank,
                RankedResult {
                    score,
                    signals: Signals { vector: vector_norm, term, title, freshness: fresh },
                    chunk_id: candidate.chunk_id,
                    page_url: candidate.page_url,
                    box_id: candidate.box_id,
                    text: candidate.text,
                },
            )
        })
        .collect();

    ranked.sort_by(|(rank_a, a), (rank_b, b)| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| rank_a.cmp(rank_b))
            .then_with(|| a.chunk_id.cmp(&b.chunk_id))
    });

    ranked.into_iter().map(|(_, r)| r).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn candidate(id: &str, text: &str, title: &str, vector_score: f32, age_days: i64) -> RetrievedChunk {
        RetrievedChunk {
            chunk_id: id.to_string(),
            page_url: format!("https://docs.example.com/{id}"),
            box_id: "box1".to_string(),
            title: title.to_string(),
            text: text.to_string(),
            fetched_at: Utc::now() - Duration::days(age_days),
            vector_score,
        }
    }

    #[test]
    fn empty_candidates_yields_empty_results() {
        assert!(rerank(Vec::new(), "query", &RerankWeights::default()).is_empty());
    }

    #[test]
    fn higher_vector_score_and_term_overlap_ranks_first() {
        let candidates = vec![
            candidate("a", "installing the documentation tool", "Install", 0.9, 1),
            candidate("b", "unrelated content about cooking", "Recipes", 0.2, 1),
        ];
        let results = rerank(candidates, "installing documentation", &RerankWeights::default());
        assert_eq!(results[0].chunk_id, "a");
    }

    #[test]
    fn ties_break_by_original_rank_then_id() {
        let candidates = vec![candidate("z", "same text", "T", 0.5, 1), candidate("a", "same text", "T", 0.5, 1)];
        let results = rerank(candidates, "query with no overlap", &RerankWeights::default());
        assert_eq!(results[0].chunk_id, "z");
    }

    #[test]
    fn fresher_page_scores_higher_all_else_equal() {
        let candidates = vec![candidate("old", "content", "T", 0.5, 365), candidate("new", "content", "T", 0.5, 0)];
        let results = rerank(candidates, "query", &RerankWeights::default());
        let new_score = results.iter().find(|r| r.chunk_id == "new").unwrap().score;
        let old_score = results.iter().find(|r| r.chunk_id == "old").unwrap().score;
        assert!(new_score > old_score);
    }
}

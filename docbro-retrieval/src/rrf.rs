//! ABOUTME: Reciprocal Rank Fusion — combine multiple ranked id lists (spec §4.E)

use std::collections::HashMap;

pub const DEFAULT_K: u32 = 60;

/// `score(doc) = Σ 1 / (k + rank)` across every ranking the doc appears in
/// (`rank` is 1-based). Results are sorted descending by score, ties broken
/// by id for determinism.
#[must_use]
pub fn reciprocal_rank_fusion(rankings: &[Vec<String>], k: u32) -> Vec<(String, f64)> {
    let mut scores: HashMap<String, f64> = HashMap::new();
    for ranking in rankings {
        for (idx, id) in ranking.iter().enumerate() {
            let rank = idx + 1;
            *scores.entry(id.clone()).or_insert(0.0) += 1.0 / f64::from(k + rank as u32);
        }
    }
    let mut fused: Vec<(String, f64)> = scores.into_iter().collect();
    fused.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.0.cmp(&b.0)));
    fused
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doc_ranked_first_in_every_list_wins() {
        let rankings = vec![
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            vec!["a".to_string(), "c".to_string(), "b".to_string()],
        ];
        let fused = reciprocal_rank_fusion(&rankings, 60);
        assert_eq!(fused[0].0, "a");
    }

    #[test]
    fn doc_present_in_more_lists_outranks_single_list_top_rank() {
        let rankings = vec![
            vec!["a".to_string()],
            vec!["b".to_string(), "a".to_string()],
            vec!["b".to_string(), "a".to_string()],
        ];
        let fused = reciprocal_rank_fusion(&rankings, 60);
        let b_score = fused.iter().find(|(id, _)| id == "b").unwrap().1;
        let a_score = fused.iter().find(|(id, _)| id == "a").unwrap().1;
        assert!(b_score > a_score || (b_score - a_score).abs() < 1e-9);
    }

    #[test]
    fn ties_broken_by_id() {
        let rankings = vec![vec!["z".to_string(), "a".to_string()]];
        let fused = reciprocal_rank_fusion(&rankings, 60);
        // "z" ranked higher (rank 1) than "a" (rank 2) so no actual tie here;
        // verify distinct docs at the same rank across lists tie-break by id.
        let rankings2 = vec![vec!["z".to_string()], vec!["a".to_string()]];
        let fused2 = reciprocal_rank_fusion(&rankings2, 60);
        assert_eq!(fused2[0].0, "a");
        assert!(fused[0].1 >= fused[1].1);
    }
}

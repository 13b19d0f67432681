//! ABOUTME: Text tokenization for the reranker's term-overlap signal (spec §4.E)

use std::collections::HashSet;

const STOPWORDS: &[&str] = &[
    "a", "an", "the", "is", "are", "was", "were", "be", "been", "being", "of", "to", "in", "on",
    "for", "with", "and", "or", "but", "at", "by", "from", "as", "it", "this", "that", "these",
    "those", "do", "does", "did", "how", "what", "why", "when", "where",
];

/// Lowercase, strip punctuation, drop stopwords, split on whitespace — the
/// exact normalization spec §4.E's `term_overlap` signal requires.
#[must_use]
pub fn tokenize(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|s| !s.is_empty())
        .filter(|s| !STOPWORDS.contains(s))
        .map(str::to_string)
        .collect()
}

/// `|tokens(query) ∩ tokens(chunk)| / |tokens(query)|`, 0.0 if the query has
/// no tokens after stopword removal.
#[must_use]
pub fn term_overlap(query_tokens: &HashSet<String>, chunk_tokens: &HashSet<String>) -> f64 {
    if query_tokens.is_empty() {
        return 0.0;
    }
    let overlap = query_tokens.intersection(chunk_tokens).count();
    overlap as f64 / query_tokens.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_drops_stopwords_and_punctuation() {
        let tokens = tokenize("How do I install the package?");
        assert!(!tokens.contains("how"));
        assert!(!tokens.contains("the"));
        assert!(tokens.contains("install"));
        assert!(tokens.contains("package"));
    }

    #[test]
    fn term_overlap_full_match() {
        let q = tokenize("install package");
        let c = tokenize("install the package now");
        assert!((term_overlap(&q, &c) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn term_overlap_empty_query_is_zero() {
        let q = tokenize("the a an");
        let c = tokenize("install package");
        assert_eq!(term_overlap(&q, &c), 0.0);
    }
}

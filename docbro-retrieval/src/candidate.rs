//! ABOUTME: RetrievedChunk — a candidate surfaced by a retrieval strategy before reranking

use chrono::{DateTime, Utc};
use docbro_storage::prelude::VectorHit;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub chunk_id: String,
    pub page_url: String,
    pub box_id: String,
    pub title: String,
    pub text: String,
    pub fetched_at: DateTime<Utc>,
    pub vector_score: f32,
}

/// Builds a [`RetrievedChunk`] from a vector hit, reading the chunk/page
/// metadata the indexer stamped onto the point's payload at upsert time.
/// Returns `None` if required payload fields are missing (malformed point).
#[must_use]
pub fn from_vector_hit(hit: VectorHit) -> Option<RetrievedChunk> {
    let payload = hit.payload;
    let page_url = payload.get("page_url")?.as_str()?.to_string();
    let box_id = payload.get("box_id")?.as_str()?.to_string();
    let text = payload.get("text")?.as_str()?.to_string();
    let title = payload.get("title").and_then(|v| v.as_str()).unwrap_or_default().to_string();
    let fetched_at = payload
        .get("fetched_at")
        .and_then(|v| v.as_str())
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now);

    Some(RetrievedChunk { chunk_id: hit.id, page_url, box_id, title, text, fetched_at, vector_score: hit.score })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn missing_required_field_yields_none() {
        let hit = VectorHit { id: "c1".to_string(), score: 0.9, payload: HashMap::new() };
        assert!(from_vector_hit(hit).is_none());
    }

    #[test]
    fn parses_a_well_formed_payload() {
        let mut payload = HashMap::new();
        payload.insert("page_url".to_string(), serde_json::json!("https://docs.example.com/guide"));
        payload.insert("box_id".to_string(), serde_json::json!("b1"));
        payload.insert("text".to_string(), serde_json::json!("install steps"));
        payload.insert("title".to_string(), serde_json::json!("Guide"));
        let hit = VectorHit { id: "c1".to_string(), score: 0.9, payload };
        let chunk = from_vector_hit(hit).unwrap();
        assert_eq!(chunk.title, "Guide");
        assert_eq!(chunk.page_url, "https://docs.example.com/guide");
    }
}

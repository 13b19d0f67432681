//! ABOUTME: Crawl frontier — URL → {depth, enqueued_at, attempts}, deduped by normalized URL (spec §4.F)

use std::collections::{HashMap, HashSet, VecDeque};

use chrono::{DateTime, Utc};
use docbro_utils::prelude::normalize;

const DEFAULT_CAPACITY: usize = 10_000;

#[derive(Debug, Clone)]
pub struct FrontierEntry {
    pub url: String,
    pub depth: u32,
    pub enqueued_at: DateTime<Utc>,
    pub attempts: u32,
}

/// Bounded work queue with normalized-URL dedup. `enqueue` is a no-op (and
/// returns `false`) once `seen` already contains the normalized URL, or once
/// the frontier is at capacity — callers suspend (spec §5 backpressure)
/// rather than the frontier silently dropping work.
pub struct Frontier {
    queue: VecDeque<String>,
    entries: HashMap<String, FrontierEntry>,
    seen: HashSet<String>,
    capacity: usize,
}

impl Frontier {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self { queue: VecDeque::new(), entries: HashMap::new(), seen: HashSet::new(), capacity }
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.queue.len() >= self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Returns `true` if the URL was newly enqueued; `false` if it was a
    /// duplicate (by normalized form) or the frontier was full.
    pub fn enqueue(&mut self, url: &str, depth: u32) -> bool {
        let Some(normalized) = normalize(url) else { return false };
        if self.seen.contains(&normalized) || self.is_full() {
            return false;
        }
        self.seen.insert(normalized.clone());
        self.entries.insert(
            normalized.clone(),
            FrontierEntry { url: url.to_string(), depth, enqueued_at: Utc::now(), attempts: 0 },
        );
        self.queue.push_back(normalized);
        true
    }

    #[must_use]
    pub fn pop(&mut self) -> Option<FrontierEntry> {
        let normalized = self.queue.pop_front()?;
        self.entries.get(&normalized).cloned()
    }

    pub fn record_attempt(&mut self, url: &str) {
        if let Some(normalized) = normalize(url) {
            if let Some(entry) = self.entries.get_mut(&normalized) {
                entry.attempts += 1;
            }
        }
    }

    /// Re-queue an entry (e.g. after a retryable failure) without touching
    /// `seen`, since it was already registered there.
    pub fn requeue(&mut self, entry: &FrontierEntry) {
        if let Some(normalized) = normalize(&entry.url) {
            self.queue.push_back(normalized);
        }
    }
}

impl Default for Frontier {
    fn default() -> Self {
        Self::new()
    }
}

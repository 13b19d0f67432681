//! ABOUTME: Bounded LRU cache mapping SHA-256(text) to embedding vectors (spec §4.C)

use std::collections::HashMap;

use parking_lot::Mutex;

const DEFAULT_CAPACITY: usize = 10_000;

struct Node {
    key: String,
    value: Vec<f32>,
    prev: Option<usize>,
    next: Option<usize>,
}

/// O(1) get/put strict-LRU cache, keyed by the caller-supplied string (the
/// embedder hashes text with SHA-256 before calling in). Slots are a flat
/// `Vec<Node>` linked as a doubly-linked list so eviction never scans the
/// whole table, unlike a naive "`min_by_key(last_accessed)`" sweep.
struct Inner {
    capacity: usize,
    slots: Vec<Node>,
    index: HashMap<String, usize>,
    head: Option<usize>, // most recently used
    tail: Option<usize>, // least recently used
    free: Vec<usize>,
    hits: u64,
    misses: u64,
}

impl Inner {
    fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            slots: Vec::new(),
            index: HashMap::new(),
            head: None,
            tail: None,
            free: Vec::new(),
            hits: 0,
            misses: 0,
        }
    }

    fn detach(&mut self, idx: usize) {
        let (prev, next) = (self.slots[idx].prev, self.slots[idx].next);
        match prev {
            Some(p) => self.slots[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.slots[n].prev = prev,
            None => self.tail = prev,
        }
        self.slots[idx].prev = None;
        self.slots[idx].next = None;
    }

    fn push_front(&mut self, idx: usize) {
        self.slots[idx].prev = None;
        self.slots[idx].next = self.head;
        if let Some(old_head) = self.head {
            self.slots[old_head].prev = Some(idx);
        }
        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
    }

    fn touch(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }
        self.detach(idx);
        self.push_front(idx);
    }

    fn get(&mut self, key: &str) -> Option<Vec<f32>> {
        if let Some(&idx) = self.index.get(key) {
            self.touch(idx);
            self.hits += 1;
            Some(self.slots[idx].value.clone())
        } else {
            self.misses += 1;
            None
        }
    }

    fn put(&mut self, key: String, value: Vec<f32>) {
        if let Some(&idx) = self.index.get(&key) {
            self.slots[idx].value = value;
            self.touch(idx);
            return;
        }
        if self.index.len() >= self.capacity {
            if let Some(lru_idx) = self.tail {
                self.detach(lru_idx);
                self.index.remove(&self.slots[lru_idx].key);
                self.free.push(lru_idx);
            }
        }
        let node = Node { key: key.clone(), value, prev: None, next: None };
        let idx = if let Some(reused) = self.free.pop() {
            self.slots[reused] = node;
            reused
        } else {
            self.slots.push(node);
            self.slots.len() - 1
        };
        self.index.insert(key, idx);
        self.push_front(idx);
    }

    fn len(&self) -> usize {
        self.index.len()
    }
}

/// Thread-safe handle; cheap to clone via `Arc` at the call site.
pub struct EmbeddingCache {
    inner: Mutex<Inner>,
}

impl EmbeddingCache {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self { inner: Mutex::new(Inner::new(capacity)) }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<Vec<f32>> {
        self.inner.lock().get(key)
    }

    pub fn put(&self, key: String, value: Vec<f32>) {
        self.inner.lock().put(key, value);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn stats(&self) -> (u64, u64) {
        let inner = self.inner.lock();
        (inner.hits, inner.misses)
    }
}

impl Default for EmbeddingCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_get_hits() {
        let cache = EmbeddingCache::new(2);
        cache.put("a".to_string(), vec![1.0]);
        assert_eq!(cache.get("a"), Some(vec![1.0]));
        assert_eq!(cache.stats(), (1, 0));
    }

    #[test]
    fn miss_on_absent_key() {
        let cache = EmbeddingCache::new(2);
        assert_eq!(cache.get("missing"), None);
        assert_eq!(cache.stats(), (0, 1));
    }

    #[test]
    fn eviction_drops_least_recently_used() {
        let cache = EmbeddingCache::new(2);
        cache.put("a".to_string(), vec![1.0]);
        cache.put("b".to_string(), vec![2.0]);
        // touch "a" so "b" becomes the LRU entry
        assert_eq!(cache.get("a"), Some(vec![1.0]));
        cache.put("c".to_string(), vec![3.0]);
        assert_eq!(cache.get("b"), None);
        assert_eq!(cache.get("a"), Some(vec![1.0]));
        assert_eq!(cache.get("c"), Some(vec![3.0]));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn put_on_existing_key_updates_value_without_growing() {
        let cache = EmbeddingCache::new(2);
        cache.put("a".to_string(), vec![1.0]);
        cache.put("a".to_string(), vec![9.0]);
        assert_eq!(cache.get("a"), Some(vec![9.0]));
        assert_eq!(cache.len(), 1);
    }
}

//! ABOUTME: Embedded VectorStore driver — single-file HNSW index co-located with MetaStore
//! ABOUTME: Single-process access only (spec §4.B)

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use docbro_core::prelude::{DocBroError, Result};
use hnsw_rs::dist::DistCosine;
use hnsw_rs::hnsw::Hnsw;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::{cosine_similarity, payload_matches, VectorFilter, VectorHealth, VectorHit, VectorPoint, VectorStore};

const MAX_NB_CONNECTION: usize = 16;
const EF_CONSTRUCTION: usize = 200;
const MAX_LAYER: usize = 16;

#[derive(Serialize, Deserialize, Default, Clone)]
struct CollectionSnapshot {
    dim: usize,
    points: Vec<VectorPoint>,
}

struct Collection {
    dim: usize,
    points: Vec<VectorPoint>,
    index: Hnsw<'static, f32, DistCosine>,
}

impl Collection {
    fn new(dim: usize) -> Self {
        Self {
            dim,
            points: Vec::new(),
            index: Hnsw::new(MAX_NB_CONNECTION, 10_000, MAX_LAYER, EF_CONSTRUCTION, DistCosine {}),
        }
    }

    fn rebuild_index(&mut self) {
        self.index = Hnsw::new(MAX_NB_CONNECTION, self.points.len().max(16), MAX_LAYER, EF_CONSTRUCTION, DistCosine {});
        for (idx, point) in self.points.iter().enumerate() {
            self.index.insert((&point.vector, idx));
        }
    }

    fn upsert(&mut self, incoming: Vec<VectorPoint>) -> Result<()> {
        for point in incoming {
            if point.vector.len() != self.dim {
                return Err(DocBroError::VectorDimError { expected: self.dim, actual: point.vector.len() });
            }
            if let Some(existing) = self.points.iter_mut().find(|p| p.id == point.id) {
                *existing = point;
            } else {
                self.points.push(point);
            }
        }
        self.rebuild_index();
        Ok(())
    }

    fn delete_by_filter(&mut self, filter: &VectorFilter) {
        self.points.retain(|p| !payload_matches(&p.payload, filter));
        self.rebuild_index();
    }

    fn search(&self, query: &[f32], top_k: usize, filter: Option<&VectorFilter>) -> Vec<VectorHit> {
        if self.points.is_empty() || top_k == 0 {
            return Vec::new();
        }
        // ef_search scales with the candidate pool so filtered queries still
        // surface enough pre-filter neighbours.
        let ef_search = (top_k * 4).max(50);
        let neighbours = self.index.search(query, top_k.max(1) * 4, ef_search);
        let mut hits: Vec<VectorHit> = neighbours
            .into_iter()
            .filter_map(|n| self.points.get(n.d_id))
            .filter(|p| filter.is_none_or_matches(p))
            .map(|p| VectorHit {
                id: p.id.clone(),
                score: cosine_similarity(query, &p.vector),
                payload: p.payload.clone(),
            })
            .collect();
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(top_k);
        hits
    }
}

trait FilterExt {
    fn is_none_or_matches(&self, point: &VectorPoint) -> bool;
}

impl FilterExt for Option<&VectorFilter> {
    fn is_none_or_matches(&self, point: &VectorPoint) -> bool {
        match self {
            None => true,
            Some(filter) => payload_matches(&point.payload, filter),
        }
    }
}

/// Single-file embedded vector store: one snapshot file per collection under
/// `vectors_dir`, rewritten wholesale on mutation (append-only WAL-style
/// incremental persistence is future work; correctness over throughput for
/// an embedded single-process store).
pub struct EmbeddedVectorStore {
    vectors_dir: PathBuf,
    collections: DashMap<String, Arc<RwLock<Collection>>>,
}

impl EmbeddedVectorStore {
    #[must_use]
    pub fn new(vectors_dir: PathBuf) -> Self {
        let _ = std::fs::create_dir_all(&vectors_dir);
        Self { vectors_dir, collections: DashMap::new() }
    }

    fn snapshot_path(&self, name: &str) -> PathBuf {
        self.vectors_dir.join(format!("{name}.vecs"))
    }

    fn load_or_create(&self, name: &str, dim: usize) -> Arc<RwLock<Collection>> {
        if let Some(existing) = self.collections.get(name) {
            return existing.clone();
        }
        let path = self.snapshot_path(name);
        let mut collection = Collection::new(dim);
        if let Ok(bytes) = std::fs::read(&path) {
            if let Ok(snapshot) = rmp_serde::from_slice::<CollectionSnapshot>(&bytes) {
                collection.dim = snapshot.dim;
                collection.points = snapshot.points;
                collection.rebuild_index();
            }
        }
        let handle = Arc::new(RwLock::new(collection));
        self.collections.insert(name.to_string(), handle.clone());
        handle
    }

    fn persist(&self, name: &str, collection: &Collection) -> Result<()> {
        let snapshot = CollectionSnapshot { dim: collection.dim, points: collection.points.clone() };
        let bytes = rmp_serde::to_vec(&snapshot).map_err(|e| DocBroError::Internal { message: e.to_string() })?;
        std::fs::write(self.snapshot_path(name), bytes).map_err(|e| DocBroError::Internal { message: e.to_string() })?;
        Ok(())
    }
}

#[async_trait]
impl VectorStore for EmbeddedVectorStore {
    async fn ensure_collection(&self, name: &str, dim: usize) -> Result<()> {
        self.load_or_create(name, dim);
        Ok(())
    }

    async fn upsert(&self, name: &str, points: Vec<VectorPoint>) -> Result<()> {
        let dim = points.first().map_or(0, |p| p.vector.len());
        let handle = self.load_or_create(name, dim);
        let mut collection = handle.write();
        collection.upsert(points)?;
        self.persist(name, &collection)
    }

    async fn search(&self, name: &str, query_vector: &[f32], top_k: usize, filter: Option<VectorFilter>) -> Result<Vec<VectorHit>> {
        let Some(handle) = self.collections.get(name) else { return Ok(Vec::new()) };
        let collection = handle.read();
        Ok(collection.search(query_vector, top_k, filter.as_ref()))
    }

    async fn delete_by_filter(&self, name: &str, filter: VectorFilter) -> Result<()> {
        let Some(handle) = self.collections.get(name) else { return Ok(()) };
        let mut collection = handle.write();
        collection.delete_by_filter(&filter);
        self.persist(name, &collection)
    }

    async fn health(&self) -> VectorHealth {
        VectorHealth { ok: true, backend: "embedded".to_string() }
    }
}

//! ABOUTME: Runtime wiring — loads `EffectiveSettings` and constructs the shared service graph
//! ABOUTME: Grounded on `llmspell-cli`'s `load_runtime_config` plus `llmspell-web`'s `AppState` construction

use std::path::PathBuf;
use std::sync::Arc;

use docbro_catalog::prelude::CatalogService;
use docbro_config::prelude::{EffectiveSettings, VectorBackendKind, XdgPaths};
use docbro_context::prelude::ContextEngine;
use docbro_embed::prelude::{CachedEmbedder, DeterministicEmbedder, EmbeddingCache, Embedder, RemoteEmbedder};
use docbro_security::prelude::AuditLogger;
use docbro_storage::prelude::{EmbeddedVectorStore, MetaStore, RemoteVectorStore, SharedMetaStore, VectorStore};
use docbro_wizard::prelude::WizardOrchestrator;

/// Embedding dimension for the deterministic, offline-default embedder.
/// Matches `mxbai-embed-large`'s published output size so a switch to the
/// real remote model later doesn't change a box's vector collection shape.
const DEFAULT_DIM: usize = 1024;
const EMBEDDING_CACHE_CAPACITY: usize = 10_000;

/// The service graph every CLI command operates against — the same fields
/// `docbro-mcp`'s `AppState` carries, built once at process start.
pub struct Runtime {
    pub store: SharedMetaStore,
    pub catalog: Arc<CatalogService>,
    pub context: Arc<ContextEngine>,
    pub wizard: Arc<WizardOrchestrator>,
    pub embedder: Arc<dyn Embedder>,
    pub vector_store: Arc<dyn VectorStore>,
    pub settings: Arc<EffectiveSettings>,
    pub audit: Arc<AuditLogger>,
    pub paths: XdgPaths,
}

impl Runtime {
    /// Loads settings from `config_path` (or the XDG default), ensures the
    /// data directory exists, and wires up every downstream service.
    pub fn build(config_path: Option<PathBuf>) -> anyhow::Result<Self> {
        let paths = XdgPaths::resolve();
        let settings_path = config_path.unwrap_or_else(|| paths.settings_file());
        let settings = EffectiveSettings::load(&settings_path)?;

        std::fs::create_dir_all(paths.data_dir())?;
        let store: SharedMetaStore = Arc::new(MetaStore::open(&paths.metastore_file())?);

        let embedder: Arc<dyn Embedder> = match &settings.embedder_url {
            Some(url) => {
                let remote = RemoteEmbedder::new(url.clone(), settings.embedder_model.clone(), DEFAULT_DIM);
                let cache = Arc::new(EmbeddingCache::new(EMBEDDING_CACHE_CAPACITY));
                Arc::new(CachedEmbedder::new(remote, cache))
            }
            None => Arc::new(DeterministicEmbedder::new(settings.embedder_model.clone(), DEFAULT_DIM)),
        };

        let vector_store: Arc<dyn VectorStore> = match settings.vector_backend {
            VectorBackendKind::Embedded => Arc::new(EmbeddedVectorStore::new(paths.vectors_dir())),
            VectorBackendKind::Remote => {
                let url = settings
                    .remote_vector_url
                    .clone()
                    .ok_or_else(|| anyhow::anyhow!("remote_vector_url is required when vector_backend=remote"))?;
                Arc::new(RemoteVectorStore::new(url))
            }
        };

        let context = Arc::new(ContextEngine::new(store.clone()));
        let catalog = Arc::new(CatalogService::with_context_engine(store.clone(), context.clone()));
        let wizard = Arc::new(WizardOrchestrator::new(store.clone(), CatalogService::with_context_engine(store.clone(), context.clone())));
        let audit = Arc::new(AuditLogger::new());

        Ok(Self {
            store,
            catalog,
            context,
            wizard,
            embedder,
            vector_store,
            settings: Arc::new(settings),
            audit,
            paths,
        })
    }

    /// `docbro --init`: create the XDG directories and a default settings
    /// file if one doesn't already exist. Idempotent.
    pub fn init_xdg(paths: &XdgPaths) -> anyhow::Result<bool> {
        std::fs::create_dir_all(paths.config_dir())?;
        std::fs::create_dir_all(paths.data_dir())?;
        std::fs::create_dir_all(paths.cache_dir())?;
        std::fs::create_dir_all(paths.logs_dir())?;
        let settings_path = paths.settings_file();
        if settings_path.exists() {
            return Ok(false);
        }
        let defaults = EffectiveSettings::default();
        let yaml = serde_yaml::to_string(&defaults)?;
        std::fs::write(&settings_path, yaml)?;
        Ok(true)
    }
}

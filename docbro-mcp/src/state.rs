//! ABOUTME: Shared application state for both MCP servers, grounded on `llmspell-web`'s `AppState` shape

use std::sync::Arc;

use docbro_catalog::prelude::CatalogService;
use docbro_config::prelude::{EffectiveSettings, XdgPaths};
use docbro_context::prelude::ContextEngine;
use docbro_embed::traits::Embedder;
use docbro_security::prelude::AuditLogger;
use docbro_storage::prelude::{SharedMetaStore, VectorStore};
use docbro_wizard::prelude::WizardOrchestrator;

use crate::lease::FillLeaseMap;

#[derive(Clone)]
pub struct AppState {
    pub store: SharedMetaStore,
    pub catalog: Arc<CatalogService>,
    pub context: Arc<ContextEngine>,
    pub wizard: Arc<WizardOrchestrator>,
    pub embedder: Arc<dyn Embedder>,
    pub vector_store: Arc<dyn VectorStore>,
    pub settings: Arc<EffectiveSettings>,
    pub fill_leases: FillLeaseMap,
    pub audit: Arc<AuditLogger>,
    pub paths: XdgPaths,
}

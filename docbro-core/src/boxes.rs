//! ABOUTME: Box domain type and its tagged per-type configuration
//! ABOUTME: Models "dynamic typing / runtime type strings" as a closed tagged variant (design note §9)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::BoxId;
use crate::shelf::BoxType;

/// Per-type box configuration. A box's `type` is immutable after creation
/// (spec §3 Invariants); the fill router matches exhaustively over this enum
/// rather than branching on a runtime type string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BoxConfig {
    Drag(DragConfig),
    Rag(RagConfig),
    Bag(BagConfig),
}

impl BoxConfig {
    #[must_use]
    pub fn box_type(&self) -> BoxType {
        match self {
            Self::Drag(_) => BoxType::Drag,
            Self::Rag(_) => BoxType::Rag,
            Self::Bag(_) => BoxType::Bag,
        }
    }
}

/// Crawled website box configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DragConfig {
    pub initial_url: Option<String>,
    pub max_pages: u32,
    pub max_depth: u32,
    pub rate_limit: f64,
    pub follow_external: bool,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            initial_url: None,
            max_pages: 100,
            max_depth: 3,
            rate_limit: 1.0,
            follow_external: false,
        }
    }
}

impl DragConfig {
    /// Validates invariants beyond what serde's types already encode.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_pages < 1 {
            return Err("max_pages must be >= 1".to_string());
        }
        if self.rate_limit <= 0.0 {
            return Err("rate_limit must be > 0".to_string());
        }
        Ok(())
    }
}

/// Parsed-document box configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    pub initial_path: Option<String>,
    pub chunk_size: u32,
    pub chunk_overlap: u32,
    pub extensions: Vec<String>,
    pub recursive: bool,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            initial_path: None,
            chunk_size: 500,
            chunk_overlap: 50,
            extensions: vec!["md".to_string(), "txt".to_string(), "pdf".to_string()],
            recursive: true,
        }
    }
}

impl RagConfig {
    /// `chunk_size ∈ [100, 8000]`, `chunk_overlap ∈ [0, chunk_size/2)` per spec §3.
    /// Boundary: `chunk_overlap == chunk_size/2` is rejected (spec §8).
    pub fn validate(&self) -> Result<(), String> {
        if !(100..=8000).contains(&self.chunk_size) {
            return Err(format!("chunk_size must be in [100, 8000], got {}", self.chunk_size));
        }
        if self.chunk_overlap >= self.chunk_size / 2 {
            return Err(format!(
                "chunk_overlap ({}) must be < chunk_size/2 ({})",
                self.chunk_overlap,
                self.chunk_size / 2
            ));
        }
        Ok(())
    }
}

/// Arbitrary-file box configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BagConfig {
    pub initial_path: Option<String>,
    pub patterns: Vec<String>,
    pub recursive: bool,
    pub preserve_structure: bool,
}

impl Default for BagConfig {
    fn default() -> Self {
        Self {
            initial_path: None,
            patterns: vec!["**/*".to_string()],
            recursive: true,
            preserve_structure: true,
        }
    }
}

/// Configuration lifecycle metadata, independent of the type-specific config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigurationState {
    pub is_configured: bool,
    pub setup_completed_at: Option<DateTime<Utc>>,
    pub has_content: bool,
    pub configuration_version: String,
}

impl Default for ConfigurationState {
    fn default() -> Self {
        Self {
            is_configured: false,
            setup_completed_at: None,
            has_content: false,
            configuration_version: "1".to_string(),
        }
    }
}

/// A content unit of a typed variant (spec §3 Box).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocBox {
    pub id: BoxId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub config: BoxConfig,
    pub configuration_state: ConfigurationState,
}

impl DocBox {
    #[must_use]
    pub fn new(name: impl Into<String>, config: BoxConfig) -> Self {
        let now = Utc::now();
        Self {
            id: BoxId::new(),
            name: name.into(),
            description: None,
            created_at: now,
            updated_at: now,
            config,
            configuration_state: ConfigurationState::default(),
        }
    }

    #[must_use]
    pub fn box_type(&self) -> BoxType {
        self.config.box_type()
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn mark_has_content(&mut self) {
        self.configuration_state.has_content = true;
    }
}

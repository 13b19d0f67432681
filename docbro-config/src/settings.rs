//! ABOUTME: EffectiveSettings — a single immutable value built once at startup (design note §9)
//! ABOUTME: Layering: defaults -> settings.yaml -> DOCBRO_* environment overrides -> validation

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file {path}: {source}")]
    Read { path: String, #[source] source: std::io::Error },

    #[error("failed to parse settings yaml: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid setting {field}: {message}")]
    Invalid { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorBackendKind {
    Embedded,
    Remote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Reranker signal weights (spec §4.E); exposed as settings per Design Note
/// §9's instruction that these are defaults, not contractual constants.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RerankWeights {
    pub vector: f64,
    pub term_overlap: f64,
    pub title_match: f64,
    pub freshness: f64,
}

impl Default for RerankWeights {
    fn default() -> Self {
        Self { vector: 0.5, term_overlap: 0.3, title_match: 0.1, freshness: 0.1 }
    }
}

/// The single immutable settings value every component receives by reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectiveSettings {
    pub vector_backend: VectorBackendKind,
    pub remote_vector_url: Option<String>,
    pub embedder_url: Option<String>,
    pub embedder_model: String,
    pub default_chunk_size: u32,
    pub default_chunk_overlap: u32,
    pub default_crawl_depth: u32,
    pub default_rate_limit: f64,
    pub mcp_read_only_host: String,
    pub mcp_read_only_port: u16,
    pub mcp_admin_host: String,
    pub mcp_admin_port: u16,
    pub log_level: LogLevel,
    pub rerank_weights: RerankWeights,
    pub rrf_k: u32,
}

impl Default for EffectiveSettings {
    fn default() -> Self {
        Self {
            vector_backend: VectorBackendKind::Embedded,
            remote_vector_url: None,
            embedder_url: None,
            embedder_model: "mxbai-embed-large".to_string(),
            default_chunk_size: 500,
            default_chunk_overlap: 50,
            default_crawl_depth: 3,
            default_rate_limit: 1.0,
            mcp_read_only_host: "0.0.0.0".to_string(),
            mcp_read_only_port: 9383,
            mcp_admin_host: "127.0.0.1".to_string(),
            mcp_admin_port: 9384,
            log_level: LogLevel::Info,
            rerank_weights: RerankWeights::default(),
            rrf_k: 60,
        }
    }
}

impl EffectiveSettings {
    /// Load layered settings: defaults -> file (if present) -> env overrides -> validate.
    pub fn load(settings_path: &Path) -> Result<Self, ConfigError> {
        let mut settings = Self::from_file(settings_path)?;
        settings.apply_env_overrides();
        settings.validate()?;
        Ok(settings)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.display().to_string(), source })?;
        let settings: Self = serde_yaml::from_str(&content)?;
        Ok(settings)
    }

    /// `DOCBRO_*` environment variables override settings of the same name,
    /// upper-cased (spec §6). `mcp_admin_host` is explicitly excluded: the
    /// admin server's loopback bind is not overridable.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("DOCBRO_VECTOR_BACKEND") {
            if let Ok(kind) = match v.to_lowercase().as_str() {
                "embedded" => Ok(VectorBackendKind::Embedded),
                "remote" => Ok(VectorBackendKind::Remote),
                other => Err(other.to_string()),
            } {
                self.vector_backend = kind;
            }
        }
        if let Ok(v) = std::env::var("DOCBRO_REMOTE_VECTOR_URL") {
            self.remote_vector_url = Some(v);
        }
        if let Ok(v) = std::env::var("DOCBRO_EMBEDDER_URL") {
            self.embedder_url = Some(v);
        }
        if let Ok(v) = std::env::var("DOCBRO_EMBEDDER_MODEL") {
            self.embedder_model = v;
        }
        if let Ok(v) = std::env::var("DOCBRO_DEFAULT_CHUNK_SIZE") {
            if let Ok(parsed) = v.parse() {
                self.default_chunk_size = parsed;
            }
        }
        if let Ok(v) = std::env::var("DOCBRO_DEFAULT_CHUNK_OVERLAP") {
            if let Ok(parsed) = v.parse() {
                self.default_chunk_overlap = parsed;
            }
        }
        if let Ok(v) = std::env::var("DOCBRO_DEFAULT_CRAWL_DEPTH") {
            if let Ok(parsed) = v.parse() {
                self.default_crawl_depth = parsed;
            }
        }
        if let Ok(v) = std::env::var("DOCBRO_DEFAULT_RATE_LIMIT") {
            if let Ok(parsed) = v.parse() {
                self.default_rate_limit = parsed;
            }
        }
        if let Ok(v) = std::env::var("DOCBRO_MCP_READ_ONLY_HOST") {
            self.mcp_read_only_host = v;
        }
        if let Ok(v) = std::env::var("DOCBRO_MCP_READ_ONLY_PORT") {
            if let Ok(parsed) = v.parse() {
                self.mcp_read_only_port = parsed;
            }
        }
        if let Ok(v) = std::env::var("DOCBRO_MCP_ADMIN_PORT") {
            if let Ok(parsed) = v.parse() {
                self.mcp_admin_port = parsed;
            }
        }
        if let Ok(v) = std::env::var("DOCBRO_LOG_LEVEL") {
            self.log_level = match v.to_lowercase().as_str() {
                "debug" => LogLevel::Debug,
                "warn" => LogLevel::Warn,
                "error" => LogLevel::Error,
                _ => LogLevel::Info,
            };
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.vector_backend == VectorBackendKind::Remote && self.remote_vector_url.is_none() {
            return Err(ConfigError::Invalid {
                field: "remote_vector_url".to_string(),
                message: "required when vector_backend=remote".to_string(),
            });
        }
        if self.default_rate_limit <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "default_rate_limit".to_string(),
                message: "must be > 0".to_string(),
            });
        }
        // The admin surface is confined to loopback (spec §1 Non-goals); a
        // non-loopback admin host fails startup (spec §8 boundary behavior).
        if self.mcp_admin_host != "127.0.0.1" {
            return Err(ConfigError::Invalid {
                field: "mcp_admin_host".to_string(),
                message: "admin server must bind to 127.0.0.1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_table() {
        let s = EffectiveSettings::default();
        assert_eq!(s.embedder_model, "mxbai-embed-large");
        assert_eq!(s.default_chunk_size, 500);
        assert_eq!(s.default_chunk_overlap, 50);
        assert_eq!(s.default_crawl_depth, 3);
        assert!((s.default_rate_limit - 1.0).abs() < f64::EPSILON);
        assert_eq!(s.mcp_read_only_port, 9383);
        assert_eq!(s.mcp_admin_port, 9384);
        assert_eq!(s.mcp_admin_host, "127.0.0.1");
    }

    #[test]
    fn remote_backend_requires_url() {
        let mut s = EffectiveSettings { vector_backend: VectorBackendKind::Remote, ..Default::default() };
        assert!(s.validate().is_err());
        s.remote_vector_url = Some("http://localhost:6333".to_string());
        assert!(s.validate().is_ok());
    }

    #[test]
    fn non_loopback_admin_host_fails_validation() {
        let s = EffectiveSettings { mcp_admin_host: "0.0.0.0".to_string(), ..Default::default() };
        assert!(s.validate().is_err());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let s = EffectiveSettings::from_file(Path::new("/nonexistent/settings.yaml")).unwrap();
        assert_eq!(s.mcp_read_only_port, 9383);
    }

    #[test]
    fn env_override_applies() {
        std::env::set_var("DOCBRO_DEFAULT_CHUNK_SIZE", "777");
        let mut s = EffectiveSettings::default();
        s.apply_env_overrides();
        assert_eq!(s.default_chunk_size, 777);
        std::env::remove_var("DOCBRO_DEFAULT_CHUNK_SIZE");
    }

    #[test]
    fn loads_from_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        std::fs::write(&path, "embedder_model: bge-m3\ndefault_chunk_size: 600\n").unwrap();
        let s = EffectiveSettings::load(&path).unwrap();
        assert_eq!(s.embedder_model, "bge-m3");
        assert_eq!(s.default_chunk_size, 600);
    }
}

//! ABOUTME: XDG-style path resolution for persisted state (spec §6)

use std::path::PathBuf;

/// Resolves the three XDG roots DocBro persists under. Illustrative paths
/// per spec §6; actual resolution defers to the `dirs` crate so behavior
/// matches the platform's XDG (or equivalent) convention.
#[derive(Debug, Clone)]
pub struct XdgPaths {
    config_dir: PathBuf,
    data_dir: PathBuf,
    cache_dir: PathBuf,
}

impl XdgPaths {
    #[must_use]
    pub fn resolve() -> Self {
        Self {
            config_dir: dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("docbro"),
            data_dir: dirs::data_dir().unwrap_or_else(|| PathBuf::from(".")).join("docbro"),
            cache_dir: dirs::cache_dir().unwrap_or_else(|| PathBuf::from(".")).join("docbro"),
        }
    }

    #[must_use]
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.yaml")
    }

    #[must_use]
    pub fn query_transformations_file(&self) -> PathBuf {
        self.config_dir.join("query_transformations.yaml")
    }

    #[must_use]
    pub fn metastore_file(&self) -> PathBuf {
        self.data_dir.join("metastore.db")
    }

    #[must_use]
    pub fn vectors_dir(&self) -> PathBuf {
        self.data_dir.join("vectors")
    }

    #[must_use]
    pub fn logs_dir(&self) -> PathBuf {
        self.cache_dir.join("logs")
    }

    #[must_use]
    pub fn reports_dir(&self) -> PathBuf {
        self.cache_dir.join("reports")
    }

    #[must_use]
    pub fn config_dir(&self) -> &std::path::Path {
        &self.config_dir
    }

    #[must_use]
    pub fn data_dir(&self) -> &std::path::Path {
        &self.data_dir
    }

    #[must_use]
    pub fn cache_dir(&self) -> &std::path::Path {
        &self.cache_dir
    }
}

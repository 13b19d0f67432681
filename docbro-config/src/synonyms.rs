//! ABOUTME: Synonym map loader for query transformation (spec §6)

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Mapping from token to an ordered sequence of synonyms, loaded from
/// `query_transformations.yaml`. Used only when `transform_query=true`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SynonymMap {
    pub entries: HashMap<String, Vec<String>>,
}

impl SynonymMap {
    pub fn load_from_file(path: &Path) -> Result<Self, std::io::Error> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let map: HashMap<String, Vec<String>> = serde_yaml::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok(Self { entries: map })
    }

    /// Synonyms for a lowercase token, empty if none are known.
    #[must_use]
    pub fn synonyms_for(&self, token: &str) -> &[String] {
        self.entries.get(token).map_or(&[], Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_empty_map() {
        let map = SynonymMap::load_from_file(Path::new("/nonexistent/query_transformations.yaml")).unwrap();
        assert!(map.entries.is_empty());
    }

    #[test]
    fn loads_from_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("syn.yaml");
        std::fs::write(&path, "install:\n  - setup\n  - configure\n").unwrap();
        let map = SynonymMap::load_from_file(&path).unwrap();
        assert_eq!(map.synonyms_for("install"), &["setup".to_string(), "configure".to_string()]);
    }
}

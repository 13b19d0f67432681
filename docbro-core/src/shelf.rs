//! ABOUTME: Shelf domain type — named collection of boxes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::ShelfId;

/// Default box type a shelf assigns to boxes created without an explicit type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoxType {
    Drag,
    Rag,
    Bag,
}

impl std::fmt::Display for BoxType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Drag => "drag",
            Self::Rag => "rag",
            Self::Bag => "bag",
        };
        write!(f, "{s}")
    }
}

/// A named, organizational collection of boxes (spec §3 Shelf).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shelf {
    pub id: ShelfId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub default_box_type: BoxType,
    pub auto_fill: bool,
    pub tags: Vec<String>,
    pub is_current: bool,
    pub protected: bool,
}

impl Shelf {
    /// Construct a new, non-current, non-protected shelf with the given name.
    ///
    /// Name validity (`1..=64` chars, `[A-Za-z0-9._-]`) is enforced by the
    /// catalog service, not here — this constructor assumes a name already
    /// validated.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ShelfId::new(),
            name: name.into(),
            description: None,
            created_at: now,
            updated_at: now,
            default_box_type: BoxType::Rag,
            auto_fill: false,
            tags: Vec::new(),
            is_current: false,
            protected: false,
        }
    }

    /// The system default shelf, created at MetaStore initialization.
    #[must_use]
    pub fn system_default() -> Self {
        let mut shelf = Self::new("default");
        shelf.protected = true;
        shelf.is_current = true;
        shelf
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Shelf name uniqueness is case-insensitive per spec §3 Invariants.
    #[must_use]
    pub fn matches_name(&self, other: &str) -> bool {
        self.name.eq_ignore_ascii_case(other)
    }
}

/// Name validation per spec §3: 1-64 chars, `[A-Za-z0-9._-]`.
#[must_use]
pub fn is_valid_entity_name(name: &str) -> bool {
    !name.is_empty()
        && name.chars().count() <= 64
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_names() {
        assert!(is_valid_entity_name("py-docs"));
        assert!(is_valid_entity_name("a"));
        assert!(is_valid_entity_name(&"a".repeat(64)));
    }

    #[test]
    fn invalid_names() {
        assert!(!is_valid_entity_name(""));
        assert!(!is_valid_entity_name(&"a".repeat(65)));
        assert!(!is_valid_entity_name("has space"));
        assert!(!is_valid_entity_name("slash/no"));
    }

    #[test]
    fn system_default_is_protected_and_current() {
        let shelf = Shelf::system_default();
        assert!(shelf.protected);
        assert!(shelf.is_current);
    }

    #[test]
    fn name_matching_is_case_insensitive() {
        let shelf = Shelf::new("Docs");
        assert!(shelf.matches_name("docs"));
        assert!(shelf.matches_name("DOCS"));
    }
}

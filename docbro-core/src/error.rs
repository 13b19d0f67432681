//! ABOUTME: Error taxonomy shared by every DocBro component
//! ABOUTME: Tagged, boundary-stable error type mapped to CLI exit codes and HTTP status at the edges

use thiserror::Error;

/// Comprehensive error enum for all DocBro operations.
///
/// Every variant carries a `message` and, where relevant, structured context
/// fields so that boundary adapters (CLI, MCP) can build a stable `code` plus
/// a human-readable message and suggestion without re-parsing text.
#[derive(Debug, Error)]
pub enum DocBroError {
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    #[error("not found: {kind} '{name}'")]
    NotFound { kind: String, name: String },

    #[error("name already taken: {name}")]
    NameTaken { name: String },

    #[error("protected entity: {name}")]
    Protected { name: String },

    #[error("operation prohibited: {op}")]
    ProhibitedOp { op: String },

    #[error("forbidden network peer: {remote_addr}")]
    ForbiddenNetwork { remote_addr: String },

    #[error("busy: {resource}")]
    Busy { resource: String },

    #[error("embedder timed out after {elapsed_ms}ms")]
    EmbedTimeout { elapsed_ms: u64 },

    #[error("embedder backend unavailable: {message}")]
    EmbedBackendUnavailable { message: String },

    #[error("vector backend unavailable: {message}")]
    VectorBackendUnavailable { message: String },

    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    VectorDimError { expected: usize, actual: usize },

    #[error("crawl http error fetching {url}: {message}")]
    CrawlHttpError { url: String, message: String },

    #[error("semantic chunking timed out for page {page_id}")]
    SemanticChunkTimeout { page_id: String },

    #[error("wizard step invalid: {message}")]
    WizardInvalid { message: String },

    #[error("operation cancelled: {message}")]
    Cancelled { message: String },

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl DocBroError {
    /// Stable machine-readable code, shared by CLI exit-code mapping and the
    /// MCP JSON envelope's `error.code` field (spec §6/§7).
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "invalid_param",
            Self::NotFound { .. } => "not_found",
            Self::NameTaken { .. } => "name_taken",
            Self::Protected { .. } => "protected",
            Self::ProhibitedOp { .. } => "operation_prohibited",
            Self::ForbiddenNetwork { .. } => "forbidden_network",
            Self::Busy { .. } => "busy",
            Self::EmbedTimeout { .. } | Self::EmbedBackendUnavailable { .. } => "backend_unavailable",
            Self::VectorBackendUnavailable { .. } => "backend_unavailable",
            Self::VectorDimError { .. } => "internal",
            Self::CrawlHttpError { .. } => "internal",
            Self::SemanticChunkTimeout { .. } => "internal",
            Self::WizardInvalid { .. } => "invalid_param",
            Self::Cancelled { .. } => "internal",
            Self::Internal { .. } => "internal",
        }
    }

    /// CLI process exit code per spec §6.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidInput { .. } | Self::NameTaken { .. } | Self::WizardInvalid { .. } => 2,
            Self::NotFound { .. } => 3,
            Self::Protected { .. } | Self::ProhibitedOp { .. } | Self::ForbiddenNetwork { .. } => 4,
            Self::EmbedTimeout { .. }
            | Self::EmbedBackendUnavailable { .. }
            | Self::VectorBackendUnavailable { .. } => 5,
            Self::Busy { .. }
            | Self::VectorDimError { .. }
            | Self::CrawlHttpError { .. }
            | Self::SemanticChunkTimeout { .. }
            | Self::Cancelled { .. }
            | Self::Internal { .. } => 1,
        }
    }

    /// HTTP status code used by the MCP boundary adapter.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidInput { .. } | Self::NameTaken { .. } | Self::WizardInvalid { .. } => 400,
            Self::NotFound { .. } => 404,
            Self::Protected { .. } | Self::ProhibitedOp { .. } | Self::ForbiddenNetwork { .. } => 403,
            Self::Busy { .. } => 409,
            Self::EmbedTimeout { .. }
            | Self::EmbedBackendUnavailable { .. }
            | Self::VectorBackendUnavailable { .. } => 503,
            Self::VectorDimError { .. } | Self::Internal { .. } | Self::CrawlHttpError { .. } | Self::SemanticChunkTimeout { .. } | Self::Cancelled { .. } => 500,
        }
    }

    /// A stock actionable suggestion, when one exists (spec §7: "Every
    /// surfaced error MUST include ... a `suggestion` field").
    #[must_use]
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::NotFound { kind, .. } if kind == "shelf" => {
                Some("run `docbro shelf create <name>`".to_string())
            }
            Self::NotFound { kind, .. } if kind == "box" => {
                Some("run `docbro box create <name> <type>`".to_string())
            }
            Self::NameTaken { name } => Some(format!("choose a name other than '{name}'")),
            Self::Busy { .. } => Some("retry the fill once the in-progress run completes".to_string()),
            _ => None,
        }
    }
}

/// Convenience Result type alias used at every DocBro component boundary.
pub type Result<T> = std::result::Result<T, DocBroError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_match_spec_table() {
        assert_eq!(DocBroError::InvalidInput { message: "x".into() }.exit_code(), 2);
        assert_eq!(DocBroError::NotFound { kind: "shelf".into(), name: "x".into() }.exit_code(), 3);
        assert_eq!(DocBroError::Protected { name: "x".into() }.exit_code(), 4);
        assert_eq!(DocBroError::Busy { resource: "x".into() }.exit_code(), 1);
        assert_eq!(DocBroError::EmbedTimeout { elapsed_ms: 1 }.exit_code(), 5);
        assert_eq!(DocBroError::Internal { message: "x".into() }.exit_code(), 1);
    }

    #[test]
    fn http_status_matches_spec_table() {
        assert_eq!(DocBroError::NotFound { kind: "box".into(), name: "x".into() }.http_status(), 404);
        assert_eq!(DocBroError::ProhibitedOp { op: "delete_shelf".into() }.http_status(), 403);
        assert_eq!(DocBroError::Busy { resource: "box".into() }.http_status(), 409);
        assert_eq!(DocBroError::VectorDimError { expected: 4, actual: 8 }.http_status(), 500);
    }

    #[test]
    fn forbidden_network_maps_to_403() {
        let e = DocBroError::ForbiddenNetwork { remote_addr: "10.0.0.1:9384".into() };
        assert_eq!(e.code(), "forbidden_network");
        assert_eq!(e.http_status(), 403);
    }

    #[test]
    fn suggestion_present_for_not_found_shelf() {
        let e = DocBroError::NotFound { kind: "shelf".into(), name: "docs".into() };
        assert!(e.suggestion().unwrap().contains("shelf create"));
    }
}

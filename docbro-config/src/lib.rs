//! ABOUTME: Effective settings layering for DocBro (file, environment, defaults)

pub mod paths;
pub mod settings;
pub mod synonyms;

pub mod prelude {
    pub use crate::paths::XdgPaths;
    pub use crate::settings::{ConfigError, EffectiveSettings, LogLevel, RerankWeights, VectorBackendKind};
    pub use crate::synonyms::SynonymMap;
}

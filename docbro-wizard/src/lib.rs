//! ABOUTME: Guided-setup wizard orchestrator for shelves, boxes, and MCP servers

pub mod engine;
pub mod session;
pub mod steps;

pub mod prelude {
    pub use crate::engine::WizardOrchestrator;
    pub use crate::session::{WizardKind, WizardSession};
    pub use crate::steps::{steps_for, StepDef, ValidationRule};
}

//! ABOUTME: Wizard session row shape persisted via `MetaStore`'s generic blob store (spec §4.J)

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use docbro_core::ids::WizardSessionId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WizardKind {
    Shelf,
    Box,
    Mcp,
}

/// `{id, kind, target, current_step, total_steps, collected, created_at,
/// updated_at, completed}` per spec §4.J.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardSession {
    pub id: WizardSessionId,
    pub kind: WizardKind,
    pub target: String,
    pub current_step: u32,
    pub total_steps: u32,
    pub collected: HashMap<String, serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed: bool,
}

impl WizardSession {
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.current_step >= self.total_steps
    }
}

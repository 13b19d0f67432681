//! ABOUTME: Context value returned by the Context Engine (spec §4.I)

use serde::{Deserialize, Serialize};

use crate::boxes::ConfigurationState;

/// `{exists, is_empty, configuration_state, summary?, suggested_actions}`
/// answer to "does X exist / is it empty / is it configured?".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    pub exists: bool,
    pub is_empty: bool,
    pub configuration_state: Option<ConfigurationState>,
    pub summary: Option<String>,
    pub suggested_actions: Vec<String>,
}

impl Context {
    #[must_use]
    pub fn missing(suggested_actions: Vec<String>) -> Self {
        Self {
            exists: false,
            is_empty: true,
            configuration_state: None,
            summary: None,
            suggested_actions,
        }
    }
}

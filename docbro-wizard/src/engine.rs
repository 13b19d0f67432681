//! ABOUTME: Persisted wizard state machine — start/submit_step/status/cancel/sweep_expired (spec §4.J)

use chrono::Utc;
use docbro_catalog::prelude::CatalogService;
use docbro_core::boxes::{BagConfig, BoxConfig, DragConfig, RagConfig};
use docbro_core::error::DocBroError;
use docbro_core::ids::WizardSessionId;
use docbro_core::prelude::Result;
use docbro_core::shelf::BoxType;
use docbro_storage::prelude::SharedMetaStore;
use tracing::info;

use crate::session::{WizardKind, WizardSession};
use crate::steps::steps_for;

const MAX_CONCURRENT_SESSIONS: usize = 10;
const SESSION_MAX_AGE_SECS: i64 = 30 * 60;

pub struct WizardOrchestrator {
    store: SharedMetaStore,
    catalog: CatalogService,
}

impl WizardOrchestrator {
    #[must_use]
    pub fn new(store: SharedMetaStore, catalog: CatalogService) -> Self {
        Self { store, catalog }
    }

    pub fn start(&self, kind: WizardKind, target: &str) -> Result<WizardSession> {
        if self.store.wizard_session_count()? >= MAX_CONCURRENT_SESSIONS {
            return Err(DocBroError::Busy { resource: "wizard_sessions".to_string() });
        }
        let now = Utc::now();
        let total_steps = u32::try_from(steps_for(kind).len()).unwrap_or(0);
        let session = WizardSession {
            id: WizardSessionId::new(),
            kind,
            target: target.to_string(),
            current_step: 0,
            total_steps,
            collected: std::collections::HashMap::new(),
            created_at: now,
            updated_at: now,
            completed: false,
        };
        self.store.wizard_session_save(&session.id.to_string(), now, &session)?;
        info!(event = "wizard_start", kind = ?session.kind, target, id = %session.id);
        Ok(session)
    }

    pub fn status(&self, id: WizardSessionId) -> Result<WizardSession> {
        self.load(id)
    }

    pub fn cancel(&self, id: WizardSessionId) -> Result<()> {
        self.store.wizard_session_delete(&id.to_string())
    }

    /// Drops sessions idle for more than 30 minutes (spec §4.J). Returns the
    /// dropped session ids.
    pub fn sweep_expired(&self) -> Result<Vec<String>> {
        self.store.wizard_session_sweep_expired(Utc::now(), SESSION_MAX_AGE_SECS)
    }

    /// Validates and records `value` against the session's current step. On
    /// the final step, attempts to apply `collected` to the Catalog; on
    /// failure the session remains open (unfinished) for retry (spec §4.J).
    pub fn submit_step(&self, id: WizardSessionId, value: serde_json::Value) -> Result<WizardSession> {
        let mut session = self.load(id)?;
        if session.completed {
            return Err(DocBroError::InvalidInput {
                message: "wizard session is already completed".to_string(),
            });
        }
        let steps = steps_for(session.kind);
        let step = steps.get(session.current_step as usize).ok_or_else(|| DocBroError::Internal {
            message: "wizard session step index out of range".to_string(),
        })?;
        step.rule.validate(step.field, &value)?;

        session.collected.insert(step.field.to_string(), value);
        session.current_step += 1;
        session.updated_at = Utc::now();

        if session.is_finished() {
            self.apply_to_catalog(&session)?;
            session.completed = true;
        }

        self.store.wizard_session_save(&session.id.to_string(), session.updated_at, &session)?;
        Ok(session)
    }

    fn load(&self, id: WizardSessionId) -> Result<WizardSession> {
        self.store
            .wizard_session_load::<WizardSession>(&id.to_string())?
            .ok_or_else(|| DocBroError::NotFound { kind: "wizard_session".to_string(), name: id.to_string() })
    }

    fn apply_to_catalog(&self, session: &WizardSession) -> Result<()> {
        match session.kind {
            WizardKind::Shelf => {
                let box_type = parse_box_type(field_str(session, "default_box_type")?)?;
                let description = field_str(session, "description").ok().map(ToString::to_string);
                self.catalog
                    .create_shelf(&session.target, description, box_type, false, vec![], false)?;
            }
            WizardKind::Box => {
                let box_type = parse_box_type(field_str(session, "box_type")?)?;
                let shelf = field_str(session, "shelf")?;
                let source = field_str(session, "source")?.to_string();
                let config = match box_type {
                    BoxType::Drag => BoxConfig::Drag(DragConfig { initial_url: Some(source), ..Default::default() }),
                    BoxType::Rag => BoxConfig::Rag(RagConfig { initial_path: Some(source), ..Default::default() }),
                    BoxType::Bag => BoxConfig::Bag(BagConfig { initial_path: Some(source), ..Default::default() }),
                };
                self.catalog.create_box(&session.target, config, None, shelf)?;
            }
            WizardKind::Mcp => {
                let read_only_port = field_u64(session, "read_only_port")?;
                let admin_port = field_u64(session, "admin_port")?;
                self.store.setting_set("mcp_read_only_port", &read_only_port.to_string())?;
                self.store.setting_set("mcp_admin_port", &admin_port.to_string())?;
            }
        }
        Ok(())
    }
}

fn field_str<'a>(session: &'a WizardSession, field: &str) -> Result<&'a str> {
    session
        .collected
        .get(field)
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| DocBroError::Internal { message: format!("missing collected field '{field}'") })
}

fn field_u64(session: &WizardSession, field: &str) -> Result<u64> {
    session
        .collected
        .get(field)
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| DocBroError::Internal { message: format!("missing collected field '{field}'") })
}

fn parse_box_type(s: &str) -> Result<BoxType> {
    match s {
        "drag" => Ok(BoxType::Drag),
        "rag" => Ok(BoxType::Rag),
        "bag" => Ok(BoxType::Bag),
        other => Err(DocBroError::Internal { message: format!("unknown box type '{other}'") }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use docbro_storage::metastore::MetaStore;

    fn orchestrator() -> WizardOrchestrator {
        let store: SharedMetaStore = Arc::new(MetaStore::open_temporary());
        let catalog = CatalogService::new(store.clone());
        WizardOrchestrator::new(store, catalog)
    }

    #[test]
    fn start_then_status_round_trips() {
        let orch = orchestrator();
        let session = orch.start(WizardKind::Shelf, "docs").unwrap();
        let reloaded = orch.status(session.id).unwrap();
        assert_eq!(reloaded.target, "docs");
        assert_eq!(reloaded.current_step, 0);
    }

    #[test]
    fn invalid_step_value_is_rejected_and_does_not_advance() {
        let orch = orchestrator();
        let session = orch.start(WizardKind::Shelf, "docs").unwrap();
        let err = orch.submit_step(session.id, serde_json::json!("not-a-box-type")).unwrap_err();
        assert_eq!(err.code(), "invalid_param");
        let reloaded = orch.status(session.id).unwrap();
        assert_eq!(reloaded.current_step, 0);
    }

    #[test]
    fn completing_a_shelf_wizard_creates_the_shelf() {
        let orch = orchestrator();
        let session = orch.start(WizardKind::Shelf, "docs").unwrap();
        let session = orch.submit_step(session.id, serde_json::json!("rag")).unwrap();
        let session = orch
            .submit_step(session.id, serde_json::json!("project documentation"))
            .unwrap();
        assert!(session.completed);
        assert!(orch
            .catalog
            .list_shelves(false, None)
            .unwrap()
            .iter()
            .any(|s| s.name == "docs"));
    }

    #[test]
    fn cancel_deletes_the_session_row() {
        let orch = orchestrator();
        let session = orch.start(WizardKind::Box, "py-docs").unwrap();
        orch.cancel(session.id).unwrap();
        assert!(orch.status(session.id).is_err());
    }

    #[test]
    fn starting_past_the_concurrency_cap_fails() {
        let orch = orchestrator();
        for i in 0..MAX_CONCURRENT_SESSIONS {
            orch.start(WizardKind::Shelf, &format!("s{i}")).unwrap();
        }
        let err = orch.start(WizardKind::Shelf, "one-too-many").unwrap_err();
        assert_eq!(err.code(), "busy");
    }
}

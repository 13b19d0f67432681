//! ABOUTME: Audit logging — mpsc-fed background task writing structured `tracing` events
//!
//! Grounded on `llmspell-security/src/audit.rs`'s `AuditEvent`/`AuditEntry`/`AuditLogger`
//! shape, retargeted at DocBro's mutation/denial/network-rejection events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AuditEvent {
    /// A catalog/wizard/fill mutation was applied via MCP or CLI.
    MutationApplied { principal: String, operation: String, resource: String },

    /// An admin operation was rejected by the denylist.
    AdminDenied { operation: String, reason: String },

    /// A non-loopback peer attempted to reach the admin server.
    NetworkRejected { remote_addr: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub event: AuditEvent,
}

impl AuditEntry {
    #[must_use]
    pub fn new(event: AuditEvent) -> Self {
        Self { id: Uuid::new_v4(), timestamp: Utc::now(), event }
    }
}

/// Fire-and-forget audit sink: `log()` enqueues onto an unbounded channel
/// drained by a background task that writes one `tracing::info!(audit=true,
/// ...)` event per entry, so a slow log sink never blocks the caller.
pub struct AuditLogger {
    sender: mpsc::UnboundedSender<AuditEntry>,
}

impl AuditLogger {
    #[must_use]
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<AuditEntry>();

        tokio::spawn(async move {
            while let Some(entry) = receiver.recv().await {
                match &entry.event {
                    AuditEvent::MutationApplied { principal, operation, resource } => {
                        info!(
                            audit = true,
                            event_type = "mutation_applied",
                            principal = %principal,
                            operation = %operation,
                            resource = %resource,
                            "catalog mutation applied"
                        );
                    }
                    AuditEvent::AdminDenied { operation, reason } => {
                        info!(
                            audit = true,
                            event_type = "admin_denied",
                            operation = %operation,
                            reason = %reason,
                            "admin operation denied"
                        );
                    }
                    AuditEvent::NetworkRejected { remote_addr } => {
                        info!(
                            audit = true,
                            event_type = "network_rejected",
                            remote_addr = %remote_addr,
                            "non-loopback peer rejected"
                        );
                    }
                }
            }
        });

        Self { sender }
    }

    /// Enqueues `event` for logging. Never blocks; fails only if the
    /// background task has already been dropped.
    pub fn log(&self, event: AuditEvent) {
        let entry = AuditEntry::new(event);
        if self.sender.send(entry).is_err() {
            tracing::warn!("audit logger background task is no longer running");
        }
    }
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_does_not_block_and_does_not_panic() {
        let logger = AuditLogger::new();
        logger.log(AuditEvent::MutationApplied {
            principal: "cli".to_string(),
            operation: "create_shelf".to_string(),
            resource: "docs".to_string(),
        });
        logger.log(AuditEvent::NetworkRejected { remote_addr: "10.0.0.5:1234".to_string() });
        tokio::task::yield_now().await;
    }
}

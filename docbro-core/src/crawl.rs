//! ABOUTME: Crawl session, page, and error-ledger types (drag boxes only)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{BoxId, CrawlSessionId, PageId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrawlStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl CrawlStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }
}

/// Kind of a terminal per-URL fetch failure (spec §4.F).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Network,
    Http4xx,
    Http5xx,
    Timeout,
    Parse,
    RobotsExcluded,
}

/// A single terminal fetch failure recorded against a crawl session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorLedgerEntry {
    pub url: String,
    pub kind: ErrorKind,
    pub message: String,
    pub attempts: u32,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

/// Bounded per-session list of terminal fetch failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorLedger {
    pub entries: Vec<ErrorLedgerEntry>,
    max_entries: usize,
}

impl ErrorLedger {
    #[must_use]
    pub fn new(max_entries: usize) -> Self {
        Self { entries: Vec::new(), max_entries }
    }

    /// Append a failure, or bump attempts/`last_seen` on an existing entry
    /// for the same URL. Oldest entry is dropped once `max_entries` is
    /// exceeded, bounding memory for long-running crawls.
    pub fn record(&mut self, url: &str, kind: ErrorKind, message: impl Into<String>) {
        let now = Utc::now();
        if let Some(existing) = self.entries.iter_mut().find(|e| e.url == url) {
            existing.attempts += 1;
            existing.last_seen = now;
            existing.message = message.into();
            return;
        }
        if self.entries.len() >= self.max_entries {
            self.entries.remove(0);
        }
        self.entries.push(ErrorLedgerEntry {
            url: url.to_string(),
            kind,
            message: message.into(),
            attempts: 1,
            first_seen: now,
            last_seen: now,
        });
    }
}

/// A single crawl run against a drag box (spec §3 CrawlSession).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlSession {
    pub id: CrawlSessionId,
    pub box_id: BoxId,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub status: CrawlStatus,
    pub pages_fetched: u32,
    pub pages_failed: u32,
    pub pages_skipped: u32,
    pub seed_url: String,
    pub depth_limit: u32,
    pub rate_limit: f64,
    pub error_ledger: ErrorLedger,
}

impl CrawlSession {
    #[must_use]
    pub fn new(box_id: BoxId, seed_url: impl Into<String>, depth_limit: u32, rate_limit: f64) -> Self {
        Self {
            id: CrawlSessionId::new(),
            box_id,
            started_at: Utc::now(),
            ended_at: None,
            status: CrawlStatus::Pending,
            pages_fetched: 0,
            pages_failed: 0,
            pages_skipped: 0,
            seed_url: seed_url.into(),
            depth_limit,
            rate_limit,
            error_ledger: ErrorLedger::new(1_000),
        }
    }

    pub fn finish(&mut self, status: CrawlStatus) {
        debug_assert!(status.is_terminal());
        self.status = status;
        self.ended_at = Some(Utc::now());
    }
}

/// A fetched page within a box (spec §3 Page).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub id: PageId,
    pub box_id: BoxId,
    pub url: String,
    pub fetched_at: DateTime<Utc>,
    pub status_code: u16,
    pub etag: Option<String>,
    pub content_hash: String,
    pub title: String,
    pub depth: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_bumps_attempts_on_repeat_url() {
        let mut ledger = ErrorLedger::new(10);
        ledger.record("https://x/1", ErrorKind::Network, "timeout");
        ledger.record("https://x/1", ErrorKind::Network, "timeout again");
        assert_eq!(ledger.entries.len(), 1);
        assert_eq!(ledger.entries[0].attempts, 2);
    }

    #[test]
    fn ledger_bounded_drops_oldest() {
        let mut ledger = ErrorLedger::new(2);
        ledger.record("https://x/1", ErrorKind::Network, "a");
        ledger.record("https://x/2", ErrorKind::Network, "b");
        ledger.record("https://x/3", ErrorKind::Network, "c");
        assert_eq!(ledger.entries.len(), 2);
        assert_eq!(ledger.entries[0].url, "https://x/2");
    }

    #[test]
    fn crawl_session_status_terminal() {
        assert!(CrawlStatus::Succeeded.is_terminal());
        assert!(!CrawlStatus::Running.is_terminal());
    }
}

//! ABOUTME: Crawl session lifecycle — wraps `docbro_core::crawl::CrawlSession` transitions

use docbro_core::crawl::{CrawlSession, CrawlStatus, ErrorKind};
use docbro_core::ids::BoxId;

/// Drives a `CrawlSession` through `pending -> running -> {succeeded,
/// failed, cancelled}` and accumulates counters + the error ledger as the
/// worker pool reports outcomes.
pub struct SessionHandle {
    session: CrawlSession,
}

impl SessionHandle {
    #[must_use]
    pub fn new(box_id: BoxId, seed_url: impl Into<String>, depth_limit: u32, rate_limit: f64) -> Self {
        Self { session: CrawlSession::new(box_id, seed_url, depth_limit, rate_limit) }
    }

    pub fn start(&mut self) {
        debug_assert_eq!(self.session.status, CrawlStatus::Pending);
        self.session.status = CrawlStatus::Running;
    }

    pub fn record_success(&mut self) {
        self.session.pages_fetched += 1;
    }

    pub fn record_skip(&mut self) {
        self.session.pages_skipped += 1;
    }

    pub fn record_failure(&mut self, url: &str, kind: ErrorKind, message: impl Into<String>) {
        self.session.pages_failed += 1;
        self.session.error_ledger.record(url, kind, message);
    }

    /// Finish as `Cancelled` if a cancellation was observed, `Failed` if
    /// every page failed, else `Succeeded`.
    pub fn finish(&mut self, cancelled: bool) {
        let status = if cancelled {
            CrawlStatus::Cancelled
        } else if self.session.pages_fetched == 0 && self.session.pages_failed > 0 {
            CrawlStatus::Failed
        } else {
            CrawlStatus::Succeeded
        };
        self.session.finish(status);
    }

    #[must_use]
    pub fn session(&self) -> &CrawlSession {
        &self.session
    }

    #[must_use]
    pub fn into_session(self) -> CrawlSession {
        self.session
    }
}

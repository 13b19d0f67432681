//! ABOUTME: Documentation web crawler — frontier, robots/rate-limit policy, retry, HTML extraction, worker pool

pub mod extraction;
pub mod frontier;
pub mod policy;
pub mod report;
pub mod retry;
pub mod session;
pub mod worker;

pub mod prelude {
    pub use crate::extraction::{extract, ExtractedPage};
    pub use crate::frontier::{Frontier, FrontierEntry};
    pub use crate::policy::CrawlPolicy;
    pub use crate::report::write_crawl_report;
    pub use crate::retry::{backoff_for, is_retryable, FetchOutcome, MAX_ATTEMPTS};
    pub use crate::session::SessionHandle;
    pub use crate::worker::{run_crawl, CrawlConfig, PageSink, DEFAULT_WORKER_COUNT};
}

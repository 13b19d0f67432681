//! ABOUTME: N-worker crawl pool draining the frontier with cooperative cancellation (spec §4.F)

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use docbro_core::crawl::{ErrorKind, Page};
use docbro_core::error::Result;
use docbro_core::ids::BoxId;
use docbro_utils::prelude::{registrable_domain, sha256_hex};
use reqwest::Client;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use url::Url;

use crate::extraction::extract;
use crate::frontier::Frontier;
use crate::policy::CrawlPolicy;
use crate::retry::{backoff_for, is_retryable, FetchOutcome, MAX_ATTEMPTS};
use crate::session::SessionHandle;

pub const DEFAULT_WORKER_COUNT: usize = 4;

/// Receives a fetched, extracted page. Implemented outside this crate (by
/// the catalog layer) so the crawler never depends on storage directly.
#[async_trait]
pub trait PageSink: Send + Sync {
    async fn accept(&self, page: Page, body_text: String, title: String) -> Result<()>;
}

pub struct CrawlConfig {
    pub box_id: BoxId,
    pub seed_url: String,
    pub depth_limit: u32,
    pub rate_limit: f64,
    pub worker_count: usize,
    pub follow_external: bool,
}

/// Runs the crawl to completion (frontier drained or cancelled), returning
/// the finished `SessionHandle`.
pub async fn run_crawl(
    config: CrawlConfig,
    sink: Arc<dyn PageSink>,
    client: Client,
    cancel: CancellationToken,
) -> SessionHandle {
    let mut handle = SessionHandle::new(
        config.box_id,
        config.seed_url.clone(),
        config.depth_limit,
        config.rate_limit,
    );
    handle.start();

    let seed_domain = registrable_domain(&config.seed_url);
    let policy = Arc::new(CrawlPolicy::new(client.clone(), config.follow_external, seed_domain));
    let frontier = Arc::new(Mutex::new(Frontier::new()));
    {
        let mut guard = frontier.lock().await;
        guard.enqueue(&config.seed_url, 0);
    }

    let handle = Arc::new(Mutex::new(handle));
    let worker_count = config.worker_count.max(1);
    let mut workers = Vec::with_capacity(worker_count);

    for _ in 0..worker_count {
        let frontier = frontier.clone();
        let policy = policy.clone();
        let sink = sink.clone();
        let client = client.clone();
        let cancel = cancel.clone();
        let handle = handle.clone();
        let depth_limit = config.depth_limit;
        let rate_limit = config.rate_limit;

        workers.push(tokio::spawn(async move {
            worker_loop(frontier, policy, sink, client, cancel, handle, depth_limit, rate_limit).await;
        }));
    }

    for worker in workers {
        let _ = worker.await;
    }

    let cancelled = cancel.is_cancelled();
    let mut handle = Arc::try_unwrap(handle)
        .unwrap_or_else(|_| unreachable!("all workers joined above, no outstanding Arc clones remain"))
        .into_inner();
    handle.finish(cancelled);
    handle
}

async fn worker_loop(
    frontier: Arc<Mutex<Frontier>>,
    policy: Arc<CrawlPolicy>,
    sink: Arc<dyn PageSink>,
    client: Client,
    cancel: CancellationToken,
    handle: Arc<Mutex<SessionHandle>>,
    depth_limit: u32,
    rate_limit: f64,
) {
    loop {
        if cancel.is_cancelled() {
            return;
        }

        let entry = {
            let mut guard = frontier.lock().await;
            guard.pop()
        };
        let Some(entry) = entry else {
            return;
        };

        if entry.depth > depth_limit {
            continue;
        }

        let Ok(url) = Url::parse(&entry.url) else { continue };
        let Some(host) = url.host_str().map(ToString::to_string) else { continue };
        let Some(domain) = registrable_domain(&entry.url) else { continue };

        if !policy.allows_domain(&domain) {
            continue;
        }
        if !policy.is_allowed(&host, url.path()).await {
            handle.lock().await.record_skip();
            continue;
        }

        policy.rate_limiter().acquire(&host, rate_limit).await;

        let mut attempt = 0;
        loop {
            if cancel.is_cancelled() {
                return;
            }
            attempt += 1;
            {
                let mut guard = frontier.lock().await;
                guard.record_attempt(&entry.url);
            }

            match fetch_and_extract(&client, &url).await {
                Ok(page_outcome) => {
                    let PageOutcome { status_code, etag, body_text, title, content_hash, outlinks } = page_outcome;
                    let page = Page {
                        id: docbro_core::ids::PageId::new(),
                        box_id: handle.lock().await.session().box_id,
                        url: entry.url.clone(),
                        fetched_at: chrono::Utc::now(),
                        status_code,
                        etag,
                        content_hash,
                        title: title.clone(),
                        depth: entry.depth,
                    };
                    if let Err(err) = sink.accept(page, body_text, title).await {
                        warn!(event = "page_sink_rejected", url = %entry.url, error = %err);
                    } else {
                        handle.lock().await.record_success();
                        info!(event = "page_fetched", url = %entry.url, depth = entry.depth);
                    }

                    let mut guard = frontier.lock().await;
                    for link in outlinks {
                        guard.enqueue(link.as_str(), entry.depth + 1);
                    }
                    break;
                }
                Err((outcome, message, retry_after)) => {
                    let kind = match outcome {
                        FetchOutcome::Transport => ErrorKind::Network,
                        FetchOutcome::Status(code) if (500..600).contains(&code) => ErrorKind::Http5xx,
                        FetchOutcome::Status(_) => ErrorKind::Http4xx,
                    };
                    if attempt >= MAX_ATTEMPTS || !is_retryable(outcome) {
                        handle.lock().await.record_failure(&entry.url, kind, message);
                        break;
                    }
                    tokio::time::sleep(backoff_for(attempt, retry_after)).await;
                }
            }
        }
    }
}

struct PageOutcome {
    status_code: u16,
    etag: Option<String>,
    body_text: String,
    title: String,
    content_hash: String,
    outlinks: Vec<Url>,
}

async fn fetch_and_extract(client: &Client, url: &Url) -> std::result::Result<PageOutcome, (FetchOutcome, String, Option<u64>)> {
    let response = client
        .get(url.clone())
        .timeout(Duration::from_secs(30))
        .send()
        .await
        .map_err(|e| (FetchOutcome::Transport, e.to_string(), None))?;

    let status = response.status();
    if !status.is_success() {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok());
        return Err((FetchOutcome::Status(status.as_u16()), format!("status {status}"), retry_after));
    }

    let etag = response.headers().get("etag").and_then(|v| v.to_str().ok()).map(ToString::to_string);
    let status_code = status.as_u16();
    let body = response.text().await.map_err(|e| (FetchOutcome::Transport, e.to_string(), None))?;

    let extracted = extract(&body, url);
    let content_hash = sha256_hex(&extracted.body);

    Ok(PageOutcome {
        status_code,
        etag,
        body_text: extracted.body,
        title: extracted.title,
        content_hash,
        outlinks: extracted.outlinks,
    })
}

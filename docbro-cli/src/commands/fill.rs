//! ABOUTME: `docbro fill` — drives a crawl for a `drag` box, mirroring the admin MCP `fill` handler

use std::sync::Arc;

use docbro_catalog::prelude::{CatalogPageSink, Indexer};
use docbro_chunk::ChunkStrategy;
use docbro_core::boxes::BoxConfig;
use docbro_core::crawl::CrawlStatus;
use docbro_core::error::{DocBroError, Result};
use docbro_crawler::prelude::{run_crawl, write_crawl_report, CrawlConfig, DEFAULT_WORKER_COUNT};
use docbro_security::prelude::AuditEvent;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::cli::OutputFormat;
use crate::config::Runtime;
use crate::output::print_ok;

#[derive(Serialize)]
struct FillSummary {
    pages_fetched: u32,
    pages_failed: u32,
    pages_skipped: u32,
    status: CrawlStatus,
}

#[allow(clippy::too_many_arguments)]
pub async fn run(
    runtime: &Runtime,
    name: &str,
    source: Option<String>,
    depth: Option<u32>,
    rate_limit: Option<f64>,
    follow_external: bool,
    output: OutputFormat,
) -> Result<()> {
    let dbox = runtime.catalog.get_box(name)?;
    let BoxConfig::Drag(drag_config) = &dbox.config else {
        return Err(DocBroError::InvalidInput { message: "fill is only supported for 'drag' boxes".to_string() });
    };

    let seed_url = source
        .or_else(|| drag_config.initial_url.clone())
        .ok_or_else(|| DocBroError::InvalidInput { message: "fill requires --source for a box with no configured url".to_string() })?;

    let crawl_config = CrawlConfig {
        box_id: dbox.id,
        seed_url,
        depth_limit: depth.unwrap_or(drag_config.max_depth),
        rate_limit: rate_limit.unwrap_or(drag_config.rate_limit),
        worker_count: DEFAULT_WORKER_COUNT,
        follow_external: follow_external || drag_config.follow_external,
    };

    let indexer = Indexer::new(runtime.store.clone(), runtime.vector_store.clone(), runtime.embedder.clone())
        .with_context_engine(runtime.context.clone());
    let sink = Arc::new(CatalogPageSink::new(
        indexer,
        dbox.clone(),
        dbox.name.clone(),
        ChunkStrategy::Character,
        runtime.settings.default_chunk_size as usize,
        runtime.settings.default_chunk_overlap as usize,
    ));

    println!("filling '{}' from {}...", dbox.name, crawl_config.seed_url);
    let handle = run_crawl(crawl_config, sink, reqwest::Client::new(), CancellationToken::new()).await;

    runtime.audit.log(AuditEvent::MutationApplied {
        principal: "cli".to_string(),
        operation: "fill".to_string(),
        resource: dbox.name.clone(),
    });

    let session = handle.session();
    let summary = FillSummary {
        pages_fetched: session.pages_fetched,
        pages_failed: session.pages_failed,
        pages_skipped: session.pages_skipped,
        status: session.status,
    };

    // Partial or total failure gets a durable report path (spec §7); a
    // clean run doesn't need one.
    let report_path = if session.pages_failed > 0 || session.status == CrawlStatus::Failed {
        match write_crawl_report(&runtime.paths.reports_dir(), session) {
            Ok(path) => Some(path),
            Err(e) => {
                eprintln!("warning: failed to write crawl report: {e}");
                None
            }
        }
    } else {
        None
    };

    print_ok(output, &summary, |s| {
        let mut line = format!(
            "fetched={} failed={} skipped={} status={:?}",
            s.pages_fetched, s.pages_failed, s.pages_skipped, s.status
        );
        if let Some(path) = &report_path {
            line.push_str(&format!("\ncrawl report: {}", path.display()));
        }
        line
    });
    Ok(())
}

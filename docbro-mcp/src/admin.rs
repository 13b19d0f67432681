//! ABOUTME: Loopback-only admin MCP server — every mutation in the system flows through here (spec §4.K/§4.L)

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Path, State};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use docbro_catalog::prelude::{CatalogPageSink, Indexer};
use docbro_chunk::ChunkStrategy;
use docbro_core::boxes::{BagConfig, BoxConfig, DragConfig, RagConfig};
use docbro_core::error::DocBroError;
use docbro_core::ids::WizardSessionId;
use docbro_core::shelf::BoxType;
use docbro_core::crawl::CrawlStatus;
use docbro_crawler::prelude::{run_crawl, write_crawl_report, CrawlConfig, DEFAULT_WORKER_COUNT};
use docbro_security::prelude::{enforce_loopback, enforce_not_denied, AuditEvent};
use docbro_wizard::prelude::WizardKind;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use crate::envelope::{ApiError, ApiResult, Envelope};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/mcp/v1/admin/create_shelf", post(create_shelf))
        .route("/mcp/v1/admin/set_current_shelf", post(set_current_shelf))
        .route("/mcp/v1/admin/add_basket", post(add_basket))
        .route("/mcp/v1/admin/remove_basket", post(remove_basket))
        .route("/mcp/v1/admin/create_box", post(create_box))
        .route("/mcp/v1/admin/fill", post(fill))
        .route("/mcp/v1/admin/wizard/start", post(wizard_start))
        .route("/mcp/v1/admin/wizard/step", post(wizard_step))
        .route("/mcp/v1/admin/wizard/status/:id", get(wizard_status))
        .route("/mcp/v1/admin/wizard/cancel/:id", post(wizard_cancel))
        .route("/mcp/v1/admin/delete_shelf", post(delete_shelf))
        .route("/mcp/v1/admin/uninstall", post(uninstall))
        .route("/mcp/v1/admin/reset", post(reset))
        .route("/mcp/v1/admin/delete_all_projects", post(delete_all_projects))
        .layer(middleware::from_fn_with_state(state.clone(), enforce_loopback_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Layer 2 of the spec's two-layer loopback enforcement; layer 1 is the
/// `TcpListener` bind in `server.rs`.
async fn enforce_loopback_middleware(
    State(state): State<AppState>,
    ConnectInfo(remote_addr): ConnectInfo<SocketAddr>,
    request: axum::extract::Request,
    next: Next,
) -> Response {
    if let Err(err) = enforce_loopback(remote_addr) {
        state.audit.log(AuditEvent::NetworkRejected { remote_addr: remote_addr.to_string() });
        return ApiError(err).into_response();
    }
    next.run(request).await
}

fn parse_box_type(s: &str) -> Result<BoxType, DocBroError> {
    match s {
        "drag" => Ok(BoxType::Drag),
        "rag" => Ok(BoxType::Rag),
        "bag" => Ok(BoxType::Bag),
        other => Err(DocBroError::InvalidInput { message: format!("unknown box type '{other}'") }),
    }
}

#[derive(Deserialize)]
struct CreateShelfRequest {
    name: String,
    description: Option<String>,
    #[serde(rename = "type", default = "default_box_type_name")]
    default_box_type: String,
    #[serde(default)]
    auto_fill: bool,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    set_current: bool,
}

fn default_box_type_name() -> String {
    "rag".to_string()
}

async fn create_shelf(State(state): State<AppState>, Json(req): Json<CreateShelfRequest>) -> ApiResult<serde_json::Value> {
    let box_type = parse_box_type(&req.default_box_type)?;
    let shelf = state
        .catalog
        .create_shelf(&req.name, req.description, box_type, req.auto_fill, req.tags, req.set_current)?;
    state.audit.log(AuditEvent::MutationApplied {
        principal: "admin".to_string(),
        operation: "create_shelf".to_string(),
        resource: shelf.name.clone(),
    });
    Ok(Envelope::ok(serde_json::json!({ "name": shelf.name })))
}

#[derive(Deserialize)]
struct SetCurrentShelfRequest {
    name: String,
}

async fn set_current_shelf(State(state): State<AppState>, Json(req): Json<SetCurrentShelfRequest>) -> ApiResult<serde_json::Value> {
    state.catalog.set_current_shelf(&req.name)?;
    state.audit.log(AuditEvent::MutationApplied {
        principal: "admin".to_string(),
        operation: "set_current_shelf".to_string(),
        resource: req.name.clone(),
    });
    Ok(Envelope::ok(serde_json::json!({ "name": req.name })))
}

#[derive(Deserialize)]
struct BasketRequest {
    #[serde(rename = "box")]
    box_name: String,
    shelf: String,
}

async fn add_basket(State(state): State<AppState>, Json(req): Json<BasketRequest>) -> ApiResult<serde_json::Value> {
    state.catalog.add_box_to_shelf(&req.box_name, &req.shelf)?;
    state.audit.log(AuditEvent::MutationApplied {
        principal: "admin".to_string(),
        operation: "add_basket".to_string(),
        resource: format!("{}@{}", req.box_name, req.shelf),
    });
    Ok(Envelope::ok(serde_json::json!({ "box": req.box_name, "shelf": req.shelf })))
}

async fn remove_basket(State(state): State<AppState>, Json(req): Json<BasketRequest>) -> ApiResult<serde_json::Value> {
    state.catalog.remove_box_from_shelf(&req.box_name, &req.shelf)?;
    state.audit.log(AuditEvent::MutationApplied {
        principal: "admin".to_string(),
        operation: "remove_basket".to_string(),
        resource: format!("{}@{}", req.box_name, req.shelf),
    });
    Ok(Envelope::ok(serde_json::json!({ "box": req.box_name, "shelf": req.shelf })))
}

#[derive(Deserialize)]
struct CreateBoxRequest {
    name: String,
    shelf: String,
    #[serde(rename = "type")]
    box_type: String,
    source: Option<String>,
    description: Option<String>,
}

async fn create_box(State(state): State<AppState>, Json(req): Json<CreateBoxRequest>) -> ApiResult<serde_json::Value> {
    let box_type = parse_box_type(&req.box_type)?;
    let config = match box_type {
        BoxType::Drag => BoxConfig::Drag(DragConfig { initial_url: req.source, ..Default::default() }),
        BoxType::Rag => BoxConfig::Rag(RagConfig { initial_path: req.source, ..Default::default() }),
        BoxType::Bag => BoxConfig::Bag(BagConfig { initial_path: req.source, ..Default::default() }),
    };
    let dbox = state.catalog.create_box(&req.name, config, req.description, &req.shelf)?;
    state.audit.log(AuditEvent::MutationApplied {
        principal: "admin".to_string(),
        operation: "create_box".to_string(),
        resource: dbox.name.clone(),
    });
    Ok(Envelope::ok(serde_json::json!({ "name": dbox.name, "type": dbox.box_type().to_string() })))
}

#[derive(Deserialize)]
struct FillRequest {
    #[serde(rename = "box")]
    box_name: String,
    source: Option<String>,
}

#[derive(Serialize)]
struct FillSummary {
    pages_fetched: u32,
    pages_failed: u32,
    pages_skipped: u32,
    status: CrawlStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    report_path: Option<String>,
}

/// Drives a crawl for a `drag` box end to end. Only `drag` boxes are fillable
/// from the admin server: the distilled component set has no local-file
/// parser for `rag`/`bag` sources, so those box types are configured via
/// `create_box`'s `source` field but populated out of band.
async fn fill(State(state): State<AppState>, Json(req): Json<FillRequest>) -> ApiResult<serde_json::Value> {
    let dbox = state.catalog.get_box(&req.box_name)?;
    let BoxConfig::Drag(drag_config) = &dbox.config else {
        return Err(DocBroError::InvalidInput {
            message: "fill is only supported for 'drag' boxes".to_string(),
        }
        .into());
    };

    let seed_url = req
        .source
        .clone()
        .or_else(|| drag_config.initial_url.clone())
        .ok_or_else(|| DocBroError::InvalidInput { message: "fill requires a 'source' url".to_string() })?;

    let lease = state.fill_leases.acquire(dbox.id)?;

    let crawl_config = CrawlConfig {
        box_id: dbox.id,
        seed_url,
        depth_limit: drag_config.max_depth,
        rate_limit: drag_config.rate_limit,
        worker_count: DEFAULT_WORKER_COUNT,
        follow_external: drag_config.follow_external,
    };

    let indexer = Indexer::new(state.store.clone(), state.vector_store.clone(), state.embedder.clone())
        .with_context_engine(state.context.clone());
    let sink = Arc::new(CatalogPageSink::new(
        indexer,
        dbox.clone(),
        dbox.name.clone(),
        ChunkStrategy::Character,
        state.settings.default_chunk_size as usize,
        state.settings.default_chunk_overlap as usize,
    ));

    let handle = run_crawl(crawl_config, sink, reqwest::Client::new(), CancellationToken::new()).await;
    drop(lease);

    state.audit.log(AuditEvent::MutationApplied {
        principal: "admin".to_string(),
        operation: "fill".to_string(),
        resource: dbox.name.clone(),
    });

    let session = handle.session();
    let report_path = if session.pages_failed > 0 || session.status == CrawlStatus::Failed {
        write_crawl_report(&state.paths.reports_dir(), session).ok().map(|p| p.display().to_string())
    } else {
        None
    };
    Ok(Envelope::ok(serde_json::json!(FillSummary {
        pages_fetched: session.pages_fetched,
        pages_failed: session.pages_failed,
        pages_skipped: session.pages_skipped,
        status: session.status,
        report_path,
    })))
}

#[derive(Deserialize)]
struct WizardStartRequest {
    kind: WizardKind,
    target: String,
}

async fn wizard_start(State(state): State<AppState>, Json(req): Json<WizardStartRequest>) -> ApiResult<serde_json::Value> {
    let session = state.wizard.start(req.kind, &req.target)?;
    Ok(Envelope::ok(serde_json::to_value(&session).map_err(|e| DocBroError::Internal { message: e.to_string() })?))
}

#[derive(Deserialize)]
struct WizardStepRequest {
    id: String,
    value: serde_json::Value,
}

async fn wizard_step(State(state): State<AppState>, Json(req): Json<WizardStepRequest>) -> ApiResult<serde_json::Value> {
    let id: WizardSessionId = req
        .id
        .parse()
        .map_err(|_| DocBroError::InvalidInput { message: "malformed wizard session id".to_string() })?;
    let session = state.wizard.submit_step(id, req.value)?;
    Ok(Envelope::ok(serde_json::to_value(&session).map_err(|e| DocBroError::Internal { message: e.to_string() })?))
}

async fn wizard_status(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<serde_json::Value> {
    let id: WizardSessionId = id
        .parse()
        .map_err(|_| DocBroError::InvalidInput { message: "malformed wizard session id".to_string() })?;
    let session = state.wizard.status(id)?;
    Ok(Envelope::ok(serde_json::to_value(&session).map_err(|e| DocBroError::Internal { message: e.to_string() })?))
}

async fn wizard_cancel(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<serde_json::Value> {
    let parsed: WizardSessionId = id
        .parse()
        .map_err(|_| DocBroError::InvalidInput { message: "malformed wizard session id".to_string() })?;
    state.wizard.cancel(parsed)?;
    Ok(Envelope::ok(serde_json::json!({ "id": id })))
}

/// Always 403, regardless of auth: these four operations are not reachable
/// via MCP at all (spec §4.L).
async fn delete_shelf(State(state): State<AppState>) -> ApiResult<serde_json::Value> {
    denied(&state, "delete_shelf")
}

async fn uninstall(State(state): State<AppState>) -> ApiResult<serde_json::Value> {
    denied(&state, "uninstall")
}

async fn reset(State(state): State<AppState>) -> ApiResult<serde_json::Value> {
    denied(&state, "reset")
}

async fn delete_all_projects(State(state): State<AppState>) -> ApiResult<serde_json::Value> {
    denied(&state, "delete_all_projects")
}

fn denied(state: &AppState, operation: &str) -> ApiResult<serde_json::Value> {
    let err = enforce_not_denied(operation).unwrap_err();
    state.audit.log(AuditEvent::AdminDenied {
        operation: operation.to_string(),
        reason: err.to_string(),
    });
    Err(err.into())
}

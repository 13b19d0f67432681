//! ABOUTME: Read-only MCP HTTP server — no mutation is reachable from here (spec §4.K)

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use docbro_core::error::DocBroError;
use docbro_retrieval::prelude::{rerank, retrieve, RetrievalStrategy};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::envelope::{ApiResult, Envelope};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/mcp/v1/list_shelfs", post(list_shelfs))
        .route("/mcp/v1/get_shelf_structure", post(get_shelf_structure))
        .route("/mcp/v1/get_current_shelf", post(get_current_shelf))
        .route("/mcp/v1/list_boxes", post(list_boxes))
        .route("/mcp/v1/search", post(search))
        .route("/context/shelf/:name", get(context_shelf))
        .route("/context/box/:name", get(context_box))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct ShelfSummary {
    name: String,
    description: Option<String>,
    default_box_type: String,
    is_current: bool,
}

async fn list_shelfs(State(state): State<AppState>) -> ApiResult<serde_json::Value> {
    let shelves = state.catalog.list_shelves(false, None)?;
    let current = shelves.iter().find(|s| s.is_current).map(|s| s.name.clone());
    let total = shelves.len();
    let summaries: Vec<ShelfSummary> = shelves
        .into_iter()
        .map(|s| ShelfSummary {
            name: s.name,
            description: s.description,
            default_box_type: s.default_box_type.to_string(),
            is_current: s.is_current,
        })
        .collect();
    Ok(Envelope::ok_with_metadata(
        serde_json::json!({ "shelves": summaries }),
        serde_json::json!({ "total": total, "current": current }),
    ))
}

#[derive(Deserialize)]
struct ShelfStructureRequest {
    name: String,
    #[serde(default)]
    include_boxes: bool,
}

#[derive(Serialize)]
struct BoxSummary {
    name: String,
    box_type: String,
    has_content: bool,
}

async fn get_shelf_structure(
    State(state): State<AppState>,
    Json(req): Json<ShelfStructureRequest>,
) -> ApiResult<serde_json::Value> {
    let shelf = state.store.shelf_get_by_name(&req.name)?;
    let boxes = if req.include_boxes {
        state
            .catalog
            .list_boxes(Some(&shelf.name), None)?
            .into_iter()
            .map(|b| BoxSummary {
                name: b.name,
                box_type: b.box_type().to_string(),
                has_content: b.configuration_state.has_content,
            })
            .collect()
    } else {
        Vec::new()
    };
    Ok(Envelope::ok(serde_json::json!({
        "name": shelf.name,
        "description": shelf.description,
        "boxes": boxes,
    })))
}

async fn get_current_shelf(State(state): State<AppState>) -> ApiResult<serde_json::Value> {
    let shelf = state.catalog.current_shelf()?;
    Ok(Envelope::ok(serde_json::json!({ "name": shelf.name })))
}

#[derive(Deserialize)]
struct ListBoxesRequest {
    shelf: Option<String>,
    #[serde(rename = "type")]
    box_type: Option<String>,
}

async fn list_boxes(
    State(state): State<AppState>,
    Json(req): Json<ListBoxesRequest>,
) -> ApiResult<serde_json::Value> {
    let box_type = req
        .box_type
        .as_deref()
        .map(parse_box_type)
        .transpose()?;
    let boxes = state.catalog.list_boxes(req.shelf.as_deref(), box_type)?;
    let summaries: Vec<BoxSummary> = boxes
        .into_iter()
        .map(|b| BoxSummary {
            name: b.name,
            box_type: b.box_type().to_string(),
            has_content: b.configuration_state.has_content,
        })
        .collect();
    Ok(Envelope::ok(serde_json::json!({ "boxes": summaries })))
}

fn parse_box_type(s: &str) -> Result<docbro_core::shelf::BoxType, DocBroError> {
    match s {
        "drag" => Ok(docbro_core::shelf::BoxType::Drag),
        "rag" => Ok(docbro_core::shelf::BoxType::Rag),
        "bag" => Ok(docbro_core::shelf::BoxType::Bag),
        other => Err(DocBroError::InvalidInput { message: format!("unknown box type '{other}'") }),
    }
}

#[derive(Deserialize)]
struct SearchRequest {
    query: String,
    shelf: Option<String>,
    #[serde(rename = "box")]
    box_name: Option<String>,
    #[serde(default = "default_strategy")]
    strategy: RetrievalStrategy,
    #[serde(default)]
    rerank: bool,
    #[serde(default = "default_top_k")]
    top_k: usize,
}

fn default_strategy() -> RetrievalStrategy {
    RetrievalStrategy::Semantic
}

fn default_top_k() -> usize {
    10
}

async fn search(State(state): State<AppState>, Json(req): Json<SearchRequest>) -> ApiResult<serde_json::Value> {
    let box_name = req.box_name.ok_or_else(|| DocBroError::InvalidInput { message: "search requires 'box'".to_string() })?;
    let dbox = state.catalog.get_box(&box_name)?;
    if let Some(shelf) = &req.shelf {
        let member_boxes = state.catalog.list_boxes(Some(shelf), None)?;
        if !member_boxes.iter().any(|b| b.id == dbox.id) {
            return Err(DocBroError::NotFound { kind: "box".to_string(), name: box_name }.into());
        }
    }

    let collection = dbox.id.to_string();
    let candidates = retrieve(
        state.embedder.as_ref(),
        state.vector_store.as_ref(),
        &collection,
        &req.query,
        req.top_k,
        req.strategy,
        None,
    )
    .await?;

    let results = if req.rerank {
        serde_json::to_value(rerank(candidates, &req.query, &state.settings.rerank_weights))
            .map_err(|e| DocBroError::Internal { message: e.to_string() })?
    } else {
        serde_json::to_value(candidates).map_err(|e| DocBroError::Internal { message: e.to_string() })?
    };

    Ok(Envelope::ok(serde_json::json!({ "results": results })))
}

async fn context_shelf(State(state): State<AppState>, Path(name): Path<String>) -> ApiResult<serde_json::Value> {
    let context = state.context.check_shelf(&name)?;
    Ok(Envelope::ok(serde_json::to_value(context).map_err(|e| DocBroError::Internal { message: e.to_string() })?))
}

async fn context_box(State(state): State<AppState>, Path(name): Path<String>) -> ApiResult<serde_json::Value> {
    let context = state.context.check_box(&name, None)?;
    Ok(Envelope::ok(serde_json::to_value(context).map_err(|e| DocBroError::Internal { message: e.to_string() })?))
}

async fn health(State(state): State<AppState>) -> ApiResult<serde_json::Value> {
    let vector_health = state.vector_store.health().await;
    let embedder_health = state.embedder.health().await;
    Ok(Envelope::ok(serde_json::json!({
        "vector_store": vector_health,
        "embedder": embedder_health,
    })))
}

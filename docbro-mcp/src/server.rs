//! ABOUTME: Binds and serves the two MCP routers — read-only on the configured host, admin on loopback only

use std::net::SocketAddr;

use docbro_core::error::DocBroError;
use tokio::net::TcpListener;
use tracing::info;

use crate::state::AppState;
use crate::{admin, readonly};

/// Serves the read-only JSON/HTTP MCP API (spec §4.K). Bindable to any host
/// per settings — it carries no mutating routes.
pub async fn run_read_only(addr: SocketAddr, state: AppState) -> Result<(), DocBroError> {
    let router = readonly::build_router(state);
    let listener = bind(addr).await?;
    info!(event = "mcp_read_only_listening", %addr);
    axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .map_err(|e| DocBroError::Internal { message: format!("read-only server error: {e}") })
}

/// Serves the admin MCP API. `addr` must already be loopback (spec §4.L
/// layer 1 — `EffectiveSettings::validate` refuses a non-loopback
/// `mcp_admin_host` at startup, and this is the second, defensive check at
/// the bind site itself).
pub async fn run_admin(addr: SocketAddr, state: AppState) -> Result<(), DocBroError> {
    if !addr.ip().is_loopback() {
        return Err(DocBroError::ForbiddenNetwork { remote_addr: addr.to_string() });
    }
    let router = admin::build_router(state);
    let listener = bind(addr).await?;
    info!(event = "mcp_admin_listening", %addr);
    axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .map_err(|e| DocBroError::Internal { message: format!("admin server error: {e}") })
}

async fn bind(addr: SocketAddr) -> Result<TcpListener, DocBroError> {
    TcpListener::bind(addr)
        .await
        .map_err(|e| DocBroError::Internal { message: format!("failed to bind {addr}: {e}") })
}

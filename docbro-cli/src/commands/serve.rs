//! ABOUTME: `docbro serve` — runs the read-only MCP server and, with `--admin`, the loopback admin server

use std::net::SocketAddr;

use docbro_core::error::{DocBroError, Result};
use docbro_mcp::prelude::{run_admin, run_read_only, AppState, FillLeaseMap};
use tracing::info;

use crate::config::Runtime;

pub async fn run(runtime: &Runtime, admin: bool, host: Option<String>, port: Option<u16>, foreground: bool) -> Result<()> {
    let _ = foreground; // backgrounding is the shell/init system's job, not ours (spec §6)

    let state = AppState {
        store: runtime.store.clone(),
        catalog: runtime.catalog.clone(),
        context: runtime.context.clone(),
        wizard: runtime.wizard.clone(),
        embedder: runtime.embedder.clone(),
        vector_store: runtime.vector_store.clone(),
        settings: runtime.settings.clone(),
        fill_leases: FillLeaseMap::new(),
        audit: runtime.audit.clone(),
        paths: runtime.paths.clone(),
    };

    let read_only_host = host.unwrap_or_else(|| runtime.settings.mcp_read_only_host.clone());
    let read_only_port = port.unwrap_or(runtime.settings.mcp_read_only_port);
    let read_only_addr: SocketAddr = format!("{read_only_host}:{read_only_port}")
        .parse()
        .map_err(|e| DocBroError::InvalidInput { message: format!("invalid read-only bind address: {e}") })?;
    let admin_addr: SocketAddr = format!("{}:{}", runtime.settings.mcp_admin_host, runtime.settings.mcp_admin_port)
        .parse()
        .map_err(|e| DocBroError::InvalidInput { message: format!("invalid admin bind address: {e}") })?;

    if admin {
        info!(event = "serve_both", %read_only_addr, %admin_addr);
        tokio::try_join!(run_read_only(read_only_addr, state.clone()), run_admin(admin_addr, state))?;
    } else {
        info!(event = "serve_read_only", %read_only_addr);
        run_read_only(read_only_addr, state).await?;
    }
    Ok(())
}

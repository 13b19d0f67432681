//! ABOUTME: Loopback enforcement for the admin MCP server (spec §4.L)
//!
//! Enforced at two layers per spec: the socket bind (the admin server binds
//! `127.0.0.1` only, at the axum/`TcpListener` call site in `docbro-mcp`) and
//! a per-request remote-address check, implemented here so a misconfigured
//! bind or a proxy forwarding a non-loopback peer is still caught.

use std::net::SocketAddr;

use docbro_core::error::DocBroError;

/// Rejects any `remote_addr` that is not loopback (`127.0.0.1`/`::1`).
pub fn enforce_loopback(remote_addr: SocketAddr) -> Result<(), DocBroError> {
    if remote_addr.ip().is_loopback() {
        Ok(())
    } else {
        Err(DocBroError::ForbiddenNetwork { remote_addr: remote_addr.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loopback_v4_is_allowed() {
        assert!(enforce_loopback("127.0.0.1:9384".parse().unwrap()).is_ok());
    }

    #[test]
    fn loopback_v6_is_allowed() {
        assert!(enforce_loopback("[::1]:9384".parse().unwrap()).is_ok());
    }

    #[test]
    fn non_loopback_is_rejected() {
        let err = enforce_loopback("10.0.0.5:9384".parse().unwrap()).unwrap_err();
        assert_eq!(err.code(), "forbidden_network");
    }
}

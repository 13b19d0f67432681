//! ABOUTME: Dual MCP JSON/HTTP servers — read-only search surface plus the loopback-only admin surface

pub mod admin;
pub mod envelope;
pub mod lease;
pub mod readonly;
pub mod server;
pub mod state;

pub mod prelude {
    pub use crate::envelope::{ApiError, ApiResult, Envelope, ErrorBody};
    pub use crate::lease::{FillLeaseGuard, FillLeaseMap};
    pub use crate::server::{run_admin, run_read_only};
    pub use crate::state::AppState;
}

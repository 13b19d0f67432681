//! ABOUTME: Audit logging, loopback enforcement, and the admin denylist

pub mod audit;
pub mod denylist;
pub mod network;

pub mod prelude {
    pub use crate::audit::{AuditEntry, AuditEvent, AuditLogger};
    pub use crate::denylist::{enforce_not_denied, is_denied};
    pub use crate::network::enforce_loopback;
}

//! ABOUTME: Low-level utilities shared across DocBro components

pub mod hashing;
pub mod rate_limit;
pub mod text;
pub mod url_norm;

pub mod prelude {
    pub use crate::hashing::sha256_hex;
    pub use crate::rate_limit::HostRateLimiter;
    pub use crate::text::{term_overlap, tokenize};
    pub use crate::url_norm::{normalize, registrable_domain};
}

//! Administrator allowlist checks gating privileged bot commands.
pub mod access_guard;

pub use access_guard::*;

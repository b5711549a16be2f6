//! tzbind: type-directed binding between host values and chain value trees
//!
//! Re-exports the binding engine from `tzbind-core` and, with the `rpc`
//! feature, big map lookups from `tzbind-rpc`.

pub use tzbind_core::*;

#[cfg(feature = "rpc")]
pub use tzbind_rpc as rpc;

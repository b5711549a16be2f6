//! Chain-hosted big map lookups for tzbind
//!
//! This crate holds the asynchronous side of the binding layer:
//!
//! - [`NetworkAccessor`]: the capability big map lookups go through
//! - [`Bigmap`]: a lazily resolved handle on a chain-hosted big map
//! - [`RpcConfig`]: where and how to reach a node
//! - `RpcAccessor` (feature `client`): a [`NetworkAccessor`] over the node's
//!   HTTP RPC
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tzbind_rpc::{Bigmap, RpcAccessor, RpcConfig};
//!
//! let accessor = Arc::new(RpcAccessor::new(RpcConfig::from_env()?)?);
//! let balances: Bigmap<Address, u64> = Bigmap::reference(1234).with_accessor(accessor);
//! let balance = balances.get(&owner).await?;
//! ```

pub mod accessor;
pub mod bigmap;
#[cfg(feature = "client")]
pub mod client;
pub mod config;
pub mod error;

pub use accessor::{MemoryAccessor, NetworkAccessor};
pub use bigmap::{Bigmap, BigmapContent};
#[cfg(feature = "client")]
pub use client::RpcAccessor;
pub use config::RpcConfig;
pub use error::ConfigError;

//! Type-directed data binding between host values and chain value trees
//!
//! This crate converts native Rust values into the chain's universal value
//! tree and back, reproducing the exact tree shapes the chain verifies:
//!
//! - **Scalars**: integers, strings, byte strings, booleans, timestamps,
//!   addresses, public keys, signatures and chain ids, each with a readable
//!   and an optimized form
//! - **Records**: right-nested pair combs, decoded field by field through
//!   structural paths
//! - **Optionals and unions**: `Some`/`None` and `Left`/`Right`
//! - **Maps**: [`ChainMap`], keyed by chain-equality instead of host equality
//! - **Path assembly**: right-comb folding and path-addressed tree building
//!
//! Everything in this crate is synchronous and free of shared state. Lookups in
//! chain-hosted big maps live in `tzbind-rpc`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use tzbind_core::{decode, encode, impl_record_codec, Address};
//!
//! struct Transfer { from: Address, to: Address, amount: u64 }
//! impl_record_codec!(Transfer { from, to, amount });
//!
//! let tree = encode(&transfer, true)?;
//! let back: Transfer = decode(&tree)?;
//! ```

mod base58check;
pub mod chainmap;
pub mod choice;
pub mod codec;
pub mod digest;
pub mod dispatch;
pub mod error;
#[cfg(feature = "serde")]
pub mod json;
pub mod option;
pub mod pack;
pub mod path;
pub mod prim;
pub mod record;
pub mod scalar;
pub mod types;

pub use chainmap::ChainMap;
pub use choice::Choice;
pub use codec::{Codec, Lambda};
pub use digest::{ChainKey, Digest, ScriptExprHash};
pub use dispatch::{decode, decode_at, decode_into, encode, encode_any, CustomValue, HostValue};
pub use error::{AccessError, BindError};
pub use pack::pack;
pub use path::{
    comb_path, fold_right_comb, insert_at_path, parse_path, render_path, Branch, PathTree,
};
pub use prim::{OpClass, OpCode, Prim, PrimKind};
pub use scalar::{
    Address, AddressKind, Bytes, ChainId, KeyKind, PublicKey, Signature, SignatureKind, Timestamp,
};
pub use types::TypeDescriptor;

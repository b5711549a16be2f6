//! Error types for tzbind-core
//!
//! This module defines the errors raised while encoding host values into value
//! trees, decoding trees back into host values, assembling trees at explicit
//! paths and looking up entries in chain-hosted big maps.

use crate::digest::ScriptExprHash;
use crate::prim::Prim;
use num_bigint::BigInt;
use thiserror::Error;

/// Errors that can occur while binding host values to value trees
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// No encode rule matched the value's type
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    /// Tree node kind is incompatible with the destination type
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// What the destination type accepts
        expected: String,
        /// What the tree actually contained
        found: String,
    },

    /// A structural node has the wrong tag or child count
    #[error("malformed shape: {0}")]
    MalformedShape(String),

    /// An optional or choice value carried an unrecognized tag
    #[error("unexpected tag {found} (expected {expected})")]
    UnexpectedTag {
        /// Accepted tags
        expected: &'static str,
        /// Tag that was found
        found: String,
    },

    /// A leaf was found where the path requires a pair
    #[error("path conflict at '{path}': existing leaf is not a pair")]
    PathConflict {
        /// Path prefix where the conflict occurred
        path: String,
    },

    /// A path tree still contains unset positions
    #[error("incomplete tree: nothing assigned at '{path}'")]
    IncompletePath {
        /// First unset path found
        path: String,
    },

    /// A textual path could not be parsed
    #[error("invalid path '{0}'")]
    InvalidPath(String),

    /// A named argument does not exist in the parameter type
    #[error("unknown field '{0}'")]
    UnknownField(String),

    /// Integer value does not fit the destination type
    #[error("integer {value} out of range for {target}")]
    OutOfRange {
        /// The offending value
        value: BigInt,
        /// Destination type name
        target: &'static str,
    },

    /// Textual or binary scalar payload is invalid
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    /// Big map lookup attempted without a network accessor
    #[error("no network accessor configured")]
    NoAccessor,

    /// Big map handle has no on-chain id yet
    #[error("big map is not allocated on chain")]
    NotAllocated,

    /// Entries were staged on a handle that already refers to an on-chain big map
    #[error("big map {0} already exists on chain; entries cannot be staged")]
    AlreadyAllocated(i64),

    /// Big map key does not exist in the remote store
    #[error("key not found: {digest}")]
    KeyNotFound {
        /// Lookup digest of the missing key
        digest: ScriptExprHash,
    },

    /// The network accessor failed
    #[error(transparent)]
    Access(#[from] AccessError),

    /// A lookup did not complete within its deadline
    #[error("operation timed out")]
    Timeout,
}

/// Errors reported by a network accessor
///
/// `NotFound` is distinguishable on purpose: big map lookups translate it into
/// [`BindError::KeyNotFound`], every other variant is propagated unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// The remote store has no entry for the requested digest
    #[error("not found")]
    NotFound,

    /// The request was cancelled before completion
    #[error("request cancelled")]
    Cancelled,

    /// The node answered with an unexpected HTTP status
    #[error("unexpected status {0}")]
    Status(u16),

    /// Transport-level failure
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body could not be decoded
    #[error("response decode error: {0}")]
    Decode(String),
}

impl BindError {
    /// Create a type mismatch error from the expected kind and the observed node
    pub fn mismatch(expected: impl Into<String>, found: &Prim) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.describe(),
        }
    }

    /// Create an encoding error from any displayable error
    pub fn encoding<E: core::fmt::Display>(error: E) -> Self {
        Self::InvalidEncoding(error.to_string())
    }
}

impl AccessError {
    /// Create a transport error from any displayable error
    pub fn transport<E: core::fmt::Display>(error: E) -> Self {
        Self::Transport(error.to_string())
    }
}

/// Result alias used throughout the crate
pub type Result<T, E = BindError> = core::result::Result<T, E>;

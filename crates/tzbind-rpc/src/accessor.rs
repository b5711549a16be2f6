//! Network accessor capability
//!
//! Big map lookups never talk to the network themselves. They go through a
//! [`NetworkAccessor`] injected by the caller, which keeps transport, retry and
//! authentication concerns out of the binding layer and lets tests substitute
//! an in-memory store.

use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::Arc;
use tzbind_core::{AccessError, Prim, ScriptExprHash};

/// Fetches the value stored under a lookup digest in a remote big map
///
/// Implementations must report an absent entry as [`AccessError::NotFound`]
/// so callers can tell a missing key apart from a transport failure.
///
/// # Examples
///
/// ```rust,ignore
/// use tzbind_rpc::NetworkAccessor;
///
/// struct Fixed(Prim);
///
/// impl NetworkAccessor for Fixed {
///     fn fetch(&self, _id: i64, _digest: &ScriptExprHash) -> BoxFuture<'_, Result<Prim, AccessError>> {
///         let value = self.0.clone();
///         Box::pin(async move { Ok(value) })
///     }
/// }
/// ```
pub trait NetworkAccessor: Send + Sync {
    /// Fetch the value stored under `digest` in big map `id`
    fn fetch(&self, id: i64, digest: &ScriptExprHash) -> BoxFuture<'_, Result<Prim, AccessError>>;
}

impl<A: NetworkAccessor + ?Sized> NetworkAccessor for Arc<A> {
    fn fetch(&self, id: i64, digest: &ScriptExprHash) -> BoxFuture<'_, Result<Prim, AccessError>> {
        (**self).fetch(id, digest)
    }
}

/// In-memory accessor keyed by big map id and lookup digest
///
/// Useful for tests and for replaying previously fetched state.
#[derive(Debug, Default, Clone)]
pub struct MemoryAccessor {
    entries: HashMap<(i64, ScriptExprHash), Prim>,
}

impl MemoryAccessor {
    /// Create an empty accessor
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `digest` in big map `id`
    pub fn insert(&mut self, id: i64, digest: ScriptExprHash, value: Prim) {
        self.entries.insert((id, digest), value);
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl NetworkAccessor for MemoryAccessor {
    fn fetch(&self, id: i64, digest: &ScriptExprHash) -> BoxFuture<'_, Result<Prim, AccessError>> {
        let found = self.entries.get(&(id, *digest)).cloned();
        Box::pin(async move { found.ok_or(AccessError::NotFound) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_accessor_lookup() {
        let digest = ScriptExprHash::of_prim(&Prim::int(1));
        let mut accessor = MemoryAccessor::new();
        accessor.insert(7, digest, Prim::string("one"));
        assert_eq!(accessor.len(), 1);

        assert_eq!(accessor.fetch(7, &digest).await, Ok(Prim::string("one")));
        assert_eq!(accessor.fetch(8, &digest).await, Err(AccessError::NotFound));
    }

    #[tokio::test]
    async fn test_shared_accessor_delegates() {
        let digest = ScriptExprHash::of_prim(&Prim::string("k"));
        let mut accessor = MemoryAccessor::new();
        accessor.insert(1, digest, Prim::unit());
        let shared = Arc::new(accessor);
        assert_eq!(shared.fetch(1, &digest).await, Ok(Prim::unit()));
    }
}

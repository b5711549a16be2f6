//! Handles on chain-hosted big maps
//!
//! A big map lives on chain and is addressed by a numeric id. Its values are
//! never fetched in bulk: each lookup hashes the key into a
//! [`ScriptExprHash`] and asks the injected [`NetworkAccessor`] for the value
//! stored under that digest.
//!
//! In contract-creation payloads a big map is written inline as a sequence of
//! `Elt` entries instead. Such handles are [`BigmapContent::Staged`] and are
//! never read from the network.

use crate::accessor::NetworkAccessor;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::{debug, trace, warn};
use tzbind_core::chainmap::{decode_elts, encode_elts};
use tzbind_core::{AccessError, BindError, Codec, Prim, ScriptExprHash, TypeDescriptor};

type Result<T> = std::result::Result<T, BindError>;

/// What a big map handle refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BigmapContent<K, V> {
    /// Existing on-chain big map
    Reference(i64),
    /// Entries to be written when the big map is created
    Staged(Vec<(K, V)>),
}

/// Lazily resolved handle on a chain-hosted big map
///
/// Lookups take `&self`: the only state they touch is the key type cache,
/// which moves from unresolved to resolved once and never back.
pub struct Bigmap<K, V> {
    content: BigmapContent<K, V>,
    key_type: OnceLock<TypeDescriptor>,
    accessor: Option<Arc<dyn NetworkAccessor>>,
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V> Bigmap<K, V> {
    /// Handle on an existing big map
    pub fn reference(id: i64) -> Self {
        Self::from_content(BigmapContent::Reference(id))
    }

    /// Empty handle collecting entries for a new big map
    pub fn staged() -> Self {
        Self::from_content(BigmapContent::Staged(Vec::new()))
    }

    fn from_content(content: BigmapContent<K, V>) -> Self {
        Self {
            content,
            key_type: OnceLock::new(),
            accessor: None,
            _marker: PhantomData,
        }
    }

    /// Attach the accessor used for lookups
    pub fn with_accessor(mut self, accessor: Arc<dyn NetworkAccessor>) -> Self {
        self.accessor = Some(accessor);
        self
    }

    /// Use an explicit key type instead of inferring it from the first key
    pub fn with_key_type(self, key_type: TypeDescriptor) -> Self {
        Self {
            key_type: OnceLock::from(key_type),
            ..self
        }
    }

    /// Replace the accessor of an existing handle
    pub fn set_accessor(&mut self, accessor: Arc<dyn NetworkAccessor>) {
        self.accessor = Some(accessor);
    }

    /// On-chain id, if this handle refers to an existing big map
    pub fn id(&self) -> Option<i64> {
        match self.content {
            BigmapContent::Reference(id) => Some(id),
            BigmapContent::Staged(_) => None,
        }
    }

    /// Underlying content
    pub fn content(&self) -> &BigmapContent<K, V> {
        &self.content
    }

    /// Key type used for lookup digests, once known
    pub fn key_type(&self) -> Option<&TypeDescriptor> {
        self.key_type.get()
    }

    /// Staged entries, in staging order
    pub fn staged_entries(&self) -> &[(K, V)] {
        match &self.content {
            BigmapContent::Staged(entries) => entries,
            BigmapContent::Reference(_) => &[],
        }
    }

    /// Add an entry to write at creation time
    ///
    /// Staging is only possible on handles that do not refer to an existing
    /// big map yet.
    pub fn stage(&mut self, key: K, value: V) -> Result<()> {
        match &mut self.content {
            BigmapContent::Staged(entries) => {
                entries.push((key, value));
                Ok(())
            }
            BigmapContent::Reference(id) => Err(BindError::AlreadyAllocated(*id)),
        }
    }
}

impl<K: Codec, V: Codec> Bigmap<K, V> {
    /// Look up the value stored under `key`
    ///
    /// The first lookup without an explicit key type takes the key's own type
    /// hint, or infers the type from the optimized form of `key`, and caches
    /// it for the life of the handle.
    /// Dropping the returned future cancels the lookup.
    pub async fn get(&self, key: &K) -> Result<V> {
        let accessor = self.accessor.as_ref().ok_or(BindError::NoAccessor)?;
        let id = self.id().ok_or(BindError::NotAllocated)?;

        let encoded = key.encode(true)?;
        let key_type = self
            .key_type
            .get_or_init(|| K::type_hint().unwrap_or_else(|| TypeDescriptor::infer(&encoded)));
        let digest = key_type.key_hash(&encoded)?;
        debug!("Looking up big map {} key {} ({})", id, digest, key_type);

        let value = match accessor.fetch(id, &digest).await {
            Ok(value) => value,
            Err(AccessError::NotFound) => {
                trace!("Big map {} has no entry for {}", id, digest);
                return Err(BindError::KeyNotFound { digest });
            }
            Err(e) => {
                warn!("Big map {} lookup of {} failed: {}", id, digest, e);
                return Err(BindError::Access(e));
            }
        };

        let value = if value.is_pair() && value.args().len() > 2 {
            trace!("Refolding {}-wide pair from big map {}", value.args().len(), id);
            value.unfold_comb()
        } else {
            value
        };
        V::decode(&value)
    }

    /// Look up `key`, failing with [`BindError::Timeout`] after `limit`
    pub async fn get_within(&self, key: &K, limit: Duration) -> Result<V> {
        match tokio::time::timeout(limit, self.get(key)).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Big map lookup timed out after {:?}", limit);
                Err(BindError::Timeout)
            }
        }
    }
}

impl<K: Clone, V: Clone> Clone for Bigmap<K, V> {
    fn clone(&self) -> Self {
        Self {
            content: self.content.clone(),
            key_type: self.key_type.clone(),
            accessor: self.accessor.clone(),
            _marker: PhantomData,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Bigmap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bigmap")
            .field("content", &self.content)
            .field("key_type", &self.key_type.get())
            .field("accessor", &self.accessor.is_some())
            .finish()
    }
}

impl<K: Codec, V: Codec> Codec for Bigmap<K, V> {
    fn encode(&self, optimized: bool) -> Result<Prim> {
        match &self.content {
            BigmapContent::Reference(id) => Ok(Prim::int(*id)),
            BigmapContent::Staged(entries) => {
                encode_elts(entries.iter().map(|(k, v)| (k, v)), optimized)
            }
        }
    }

    fn decode(prim: &Prim) -> Result<Self> {
        match prim {
            Prim::Int(id) => {
                let id = i64::try_from(id).map_err(|_| BindError::OutOfRange {
                    value: id.clone(),
                    target: "big map id",
                })?;
                Ok(Self::reference(id))
            }
            Prim::Seq(_) => Ok(Self::from_content(BigmapContent::Staged(decode_elts(prim)?))),
            other => Err(BindError::mismatch("big map id or entry sequence", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_reference_and_staged() {
        let reference = Bigmap::<String, i64>::decode(&Prim::int(42)).unwrap();
        assert_eq!(reference.id(), Some(42));
        assert!(reference.staged_entries().is_empty());

        let literal = Prim::seq(vec![
            Prim::elt(Prim::string("a"), Prim::int(1)),
            Prim::elt(Prim::string("b"), Prim::int(2)),
        ]);
        let staged = Bigmap::<String, i64>::decode(&literal).unwrap();
        assert_eq!(staged.id(), None);
        assert_eq!(
            staged.staged_entries(),
            &[("a".to_string(), 1), ("b".to_string(), 2)]
        );
        assert_eq!(staged.encode(true).unwrap(), literal);
    }

    #[test]
    fn test_decode_rejects_other_shapes() {
        assert!(matches!(
            Bigmap::<String, i64>::decode(&Prim::string("x")),
            Err(BindError::TypeMismatch { .. })
        ));
        assert!(matches!(
            Bigmap::<String, i64>::decode(&Prim::seq(vec![Prim::int(1)])),
            Err(BindError::MalformedShape(_))
        ));
    }

    #[test]
    fn test_stage_only_on_new_maps() {
        let mut staged = Bigmap::<String, i64>::staged();
        staged.stage("k".to_string(), 5).unwrap();
        assert_eq!(staged.staged_entries().len(), 1);

        let mut existing = Bigmap::<String, i64>::reference(3);
        assert_eq!(
            existing.stage("k".to_string(), 5),
            Err(BindError::AlreadyAllocated(3))
        );
        assert!(existing.staged_entries().is_empty());
        assert_eq!(existing.encode(false).unwrap(), Prim::int(3));
    }

    #[test]
    fn test_explicit_key_type_is_cached_up_front() {
        let map = Bigmap::<String, i64>::reference(1)
            .with_key_type(TypeDescriptor::new(tzbind_core::OpCode::TString));
        assert_eq!(
            map.key_type(),
            Some(&TypeDescriptor::new(tzbind_core::OpCode::TString))
        );
        assert_eq!(Bigmap::<String, i64>::reference(1).key_type(), None);
    }

    #[tokio::test]
    async fn test_lookup_requires_accessor_and_id() {
        let map = Bigmap::<String, i64>::reference(1);
        assert_eq!(map.get(&"k".to_string()).await, Err(BindError::NoAccessor));
        assert!(map.key_type().is_none());
    }
}

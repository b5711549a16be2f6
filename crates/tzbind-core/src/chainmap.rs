//! Maps keyed by chain-equality
//!
//! Host equality is the wrong notion for on-chain map keys: an address held
//! in text form and the same address read back in binary form are one key on
//! chain. [`ChainMap`] therefore indexes entries by the key's
//! [`Digest`](crate::Digest) rather than by the key itself.

use crate::codec::Codec;
use crate::digest::{ChainKey, Digest};
use crate::error::{BindError, Result};
use crate::prim::{OpCode, Prim};
use std::collections::HashMap;
use std::fmt;

/// Associative container with chain-equality keys
///
/// The hash function is bound once, from the static key type, when the map is
/// created. Key types outside the supported set do not implement
/// [`ChainKey`] and are rejected at compile time.
///
/// Iteration and encode order follow the internal digest table and are
/// unspecified. Distinct keys whose digests collide overwrite each other.
pub struct ChainMap<K, V> {
    hasher: fn(&K) -> Digest,
    entries: HashMap<Digest, (K, V)>,
}

impl<K: ChainKey, V> ChainMap<K, V> {
    /// Empty map
    pub fn new() -> Self {
        Self {
            hasher: K::key_digest,
            entries: HashMap::new(),
        }
    }

    /// Empty map with room for `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            hasher: K::key_digest,
            entries: HashMap::with_capacity(capacity),
        }
    }
}

impl<K, V> ChainMap<K, V> {
    /// Value stored under a key chain-equal to `key`
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(&(self.hasher)(key)).map(|(_, value)| value)
    }

    /// Mutable value stored under a key chain-equal to `key`
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let digest = (self.hasher)(key);
        self.entries.get_mut(&digest).map(|(_, value)| value)
    }

    /// Whether a chain-equal key is present
    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(&(self.hasher)(key))
    }

    /// Insert or overwrite; returns the previous value for the digest
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        let digest = (self.hasher)(&key);
        self.entries
            .insert(digest, (key, value))
            .map(|(_, previous)| previous)
    }

    /// Remove the entry for a chain-equal key
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let digest = (self.hasher)(key);
        self.entries.remove(&digest).map(|(_, value)| value)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in unspecified order
    pub fn entries(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.values().map(|(key, value)| (key, value))
    }

    /// Keys in unspecified order
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.values().map(|(key, _)| key)
    }

    /// Values in unspecified order
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.values().map(|(_, value)| value)
    }
}

impl<K: ChainKey, V> Default for ChainMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone, V: Clone> Clone for ChainMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            hasher: self.hasher,
            entries: self.entries.clone(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for ChainMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries()).finish()
    }
}

impl<K: ChainKey, V> FromIterator<(K, V)> for ChainMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.set(key, value);
        }
        map
    }
}

/// Decode one `Elt key value` node
pub fn decode_elt<K: Codec, V: Codec>(prim: &Prim) -> Result<(K, V)> {
    let args = prim.expect_app(OpCode::Elt, 2)?;
    Ok((K::decode(&args[0])?, V::decode(&args[1])?))
}

/// Decode a sequence of `Elt` nodes into key/value pairs in tree order
pub fn decode_elts<K: Codec, V: Codec>(prim: &Prim) -> Result<Vec<(K, V)>> {
    match prim {
        Prim::Seq(children) => children.iter().map(decode_elt).collect(),
        other => Err(BindError::mismatch("map sequence", other)),
    }
}

/// Encode key/value pairs as a sequence of `Elt` nodes
pub fn encode_elts<'a, K, V, I>(entries: I, optimized: bool) -> Result<Prim>
where
    K: Codec + 'a,
    V: Codec + 'a,
    I: IntoIterator<Item = (&'a K, &'a V)>,
{
    entries
        .into_iter()
        .map(|(key, value)| Ok(Prim::elt(key.encode(optimized)?, value.encode(optimized)?)))
        .collect::<Result<Vec<_>>>()
        .map(Prim::Seq)
}

impl<K: Codec + ChainKey, V: Codec> Codec for ChainMap<K, V> {
    fn encode(&self, optimized: bool) -> Result<Prim> {
        encode_elts(self.entries(), optimized)
    }

    fn decode(prim: &Prim) -> Result<Self> {
        Ok(decode_elts(prim)?.into_iter().collect())
    }
}

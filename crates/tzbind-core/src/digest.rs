//! Digests used for chain-equality and remote lookups
//!
//! Two digests live here:
//!
//! - [`Digest`]: a SHA-256 value computed on the host from a key's canonical
//!   binary form. [`ChainMap`](crate::ChainMap) indexes entries by it so that
//!   keys which are equal on chain (a textual and a binary address, say) land
//!   in the same slot even though their host representations differ.
//! - [`ScriptExprHash`]: the BLAKE2b-256 digest of a packed key, which is how
//!   the chain addresses big map entries (`expr…` in textual form).

use crate::base58check;
use crate::error::{BindError, Result};
use crate::pack::pack;
use crate::prim::Prim;
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest as _};
use core::fmt;
use core::str::FromStr;
use num_bigint::BigInt;
use sha2::{Digest as _, Sha256};

/// 256-bit key digest used for chain-equality
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest([u8; 32]);

impl Digest {
    /// Sentinel digest of an absent optional key
    pub const ABSENT: Digest = Digest([0u8; 32]);

    /// SHA-256 of raw bytes
    pub fn of_bytes(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }

    /// Digest of a value tree in its packed binary form
    pub fn of_prim(prim: &Prim) -> Self {
        Self::of_bytes(&pack(prim))
    }

    /// Digest of `tag ‖ inner`, used to keep union sides apart
    pub fn tagged(tag: u8, inner: &Digest) -> Self {
        let mut data = [0u8; 33];
        data[0] = tag;
        data[1..].copy_from_slice(&inner.0);
        Self::of_bytes(&data)
    }

    /// Combine the digests of a record's fields in declaration order
    ///
    /// A single field combines to its own digest, matching the way a
    /// one-field record encodes to the field's tree directly.
    pub fn combine(parts: &[Digest]) -> Self {
        match parts {
            [single] => *single,
            _ => {
                let mut hasher = Sha256::new();
                for part in parts {
                    hasher.update(part.0);
                }
                Self(hasher.finalize().into())
            }
        }
    }

    /// Raw digest bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", hex::encode(self.0))
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Capability of being used as a [`ChainMap`](crate::ChainMap) key
///
/// Implemented for the closed set of key kinds the chain compares: strings,
/// byte strings, booleans, integers, timestamps, addresses, public keys,
/// signatures, chain ids, and the composites built from them (optionals,
/// unions, records). Two keys that are equal on chain must return the same
/// digest.
pub trait ChainKey {
    /// Chain-equality digest of this key
    fn key_digest(&self) -> Digest;
}

impl<T: ChainKey + ?Sized> ChainKey for &T {
    fn key_digest(&self) -> Digest {
        (**self).key_digest()
    }
}

impl<T: ChainKey + ?Sized> ChainKey for Box<T> {
    fn key_digest(&self) -> Digest {
        (**self).key_digest()
    }
}

impl ChainKey for str {
    fn key_digest(&self) -> Digest {
        Digest::of_prim(&Prim::string(self))
    }
}

impl ChainKey for String {
    fn key_digest(&self) -> Digest {
        self.as_str().key_digest()
    }
}

impl ChainKey for bool {
    fn key_digest(&self) -> Digest {
        Digest::of_prim(&Prim::bool(*self))
    }
}

impl ChainKey for () {
    fn key_digest(&self) -> Digest {
        Digest::of_prim(&Prim::unit())
    }
}

macro_rules! int_keys {
    ($($ty:ty),+) => {
        $(
            impl ChainKey for $ty {
                fn key_digest(&self) -> Digest {
                    Digest::of_prim(&Prim::Int(BigInt::from(*self)))
                }
            }
        )+
    };
}

int_keys!(i128, i64, i32, u64, u32, u8);

impl ChainKey for BigInt {
    fn key_digest(&self) -> Digest {
        Digest::of_prim(&Prim::Int(self.clone()))
    }
}

const EXPR_PREFIX: &[u8] = &[13, 44, 64, 27];

/// BLAKE2b-256 digest of a packed big map key
///
/// Displays in its base58check `expr…` form, the form node RPC paths use.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScriptExprHash([u8; 32]);

impl ScriptExprHash {
    /// Hash an already normalized key tree
    pub fn of_prim(prim: &Prim) -> Self {
        let hash = Blake2b::<U32>::digest(pack(prim));
        let mut out = [0u8; 32];
        out.copy_from_slice(&hash);
        Self(out)
    }

    /// Wrap raw digest bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw digest bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for ScriptExprHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&base58check::encode(EXPR_PREFIX, &self.0))
    }
}

impl fmt::Debug for ScriptExprHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScriptExprHash({})", self)
    }
}

impl FromStr for ScriptExprHash {
    type Err = BindError;

    fn from_str(s: &str) -> Result<Self> {
        let (_, payload) = base58check::decode_prefixed(s, &[EXPR_PREFIX], 32)?;
        let mut out = [0u8; 32];
        out.copy_from_slice(&payload);
        Ok(Self(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_widths_are_chain_equal() {
        assert_eq!(5i64.key_digest(), 5u8.key_digest());
        assert_eq!(5i128.key_digest(), 5u32.key_digest());
        assert_eq!(BigInt::from(5).key_digest(), 5u8.key_digest());
        assert_ne!(5i64.key_digest(), (-5i64).key_digest());
    }

    #[test]
    fn test_string_and_bytes_do_not_collide() {
        let s = "ab".to_string().key_digest();
        let b = Digest::of_prim(&Prim::bytes(b"ab".to_vec()));
        assert_ne!(s, b);
    }

    #[test]
    fn test_tagged_sides_differ() {
        let inner = 1i64.key_digest();
        assert_ne!(Digest::tagged(0, &inner), Digest::tagged(1, &inner));
    }

    #[test]
    fn test_expr_hash_text_roundtrip() {
        let hash = ScriptExprHash::of_prim(&Prim::int(1));
        let text = hash.to_string();
        assert!(text.starts_with("expr"), "unexpected form {}", text);
        assert_eq!(text.parse::<ScriptExprHash>().unwrap(), hash);
    }
}

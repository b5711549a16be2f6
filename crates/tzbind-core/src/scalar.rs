//! Scalar bridge: chain-native scalar types
//!
//! Each type here has a human-readable and an optimized chain form:
//!
//! | type        | readable        | optimized           |
//! |-------------|-----------------|---------------------|
//! | `Bytes`     | bytes           | bytes               |
//! | `Timestamp` | RFC3339 string  | int (unix seconds)  |
//! | `Address`   | base58 string   | 22 bytes            |
//! | `PublicKey` | base58 string   | tag byte + key      |
//! | `Signature` | base58 string   | raw signature bytes |
//! | `ChainId`   | base58 string   | base58 string       |
//!
//! Decoding accepts either form. Chain-equality digests are always computed
//! from the optimized binary form, so a key parsed from text and the same key
//! read back from bytes index the same map slot.

use crate::base58check;
use crate::codec::Codec;
use crate::digest::{ChainKey, Digest};
use crate::error::{BindError, Result};
use crate::prim::{OpCode, Prim};
use crate::types::TypeDescriptor;
use chrono::{DateTime, SecondsFormat, Utc};
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::str::FromStr;
use num_bigint::BigInt;

/// Byte string
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bytes(pub Vec<u8>);

impl Bytes {
    /// Unwrap the raw bytes
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

impl From<&[u8]> for Bytes {
    fn from(value: &[u8]) -> Self {
        Self(value.to_vec())
    }
}

impl AsRef<[u8]> for Bytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

impl Codec for Bytes {
    fn encode(&self, _optimized: bool) -> Result<Prim> {
        Ok(Prim::Bytes(self.0.clone()))
    }

    fn decode(prim: &Prim) -> Result<Self> {
        match prim {
            Prim::Bytes(b) => Ok(Self(b.clone())),
            other => Err(BindError::mismatch("bytes", other)),
        }
    }
}

impl ChainKey for Bytes {
    fn key_digest(&self) -> Digest {
        Digest::of_prim(&Prim::Bytes(self.0.clone()))
    }
}

/// Point in time with second precision
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Timestamp from unix seconds
    pub fn from_unix(seconds: i64) -> Self {
        Self(seconds)
    }

    /// Unix seconds
    pub fn unix(&self) -> i64 {
        self.0
    }

    /// Convert to a UTC date time, if representable
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.0, 0)
    }

    /// RFC3339 text, e.g. `2024-01-01T00:00:00Z`
    pub fn to_rfc3339(&self) -> Result<String> {
        self.to_datetime()
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
            .ok_or_else(|| {
                BindError::InvalidEncoding(format!("timestamp {} out of calendar range", self.0))
            })
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value.timestamp())
    }
}

impl FromStr for Timestamp {
    type Err = BindError;

    fn from_str(s: &str) -> Result<Self> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| Self(dt.timestamp()))
            .map_err(|e| BindError::InvalidEncoding(format!("timestamp '{}': {}", s, e)))
    }
}

impl Codec for Timestamp {
    fn encode(&self, optimized: bool) -> Result<Prim> {
        if optimized {
            Ok(Prim::Int(BigInt::from(self.0)))
        } else {
            self.to_rfc3339().map(Prim::String)
        }
    }

    fn decode(prim: &Prim) -> Result<Self> {
        match prim {
            Prim::Int(value) => i64::try_from(value)
                .map(Self)
                .map_err(|_| BindError::OutOfRange {
                    value: value.clone(),
                    target: "timestamp",
                }),
            Prim::String(s) => s.parse(),
            other => Err(BindError::mismatch("timestamp", other)),
        }
    }
}

impl ChainKey for Timestamp {
    fn key_digest(&self) -> Digest {
        Digest::of_prim(&Prim::Int(BigInt::from(self.0)))
    }
}

/// Kind of account an address designates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AddressKind {
    /// Implicit account, Ed25519 (`tz1`)
    Ed25519,
    /// Implicit account, Secp256k1 (`tz2`)
    Secp256k1,
    /// Implicit account, P-256 (`tz3`)
    P256,
    /// Implicit account, BLS12-381 (`tz4`)
    Bls12_381,
    /// Originated contract (`KT1`)
    Contract,
    /// Smart rollup (`sr1`)
    SmartRollup,
}

impl AddressKind {
    /// Every address kind
    pub const ALL: [AddressKind; 6] = [
        Self::Ed25519,
        Self::Secp256k1,
        Self::P256,
        Self::Bls12_381,
        Self::Contract,
        Self::SmartRollup,
    ];

    fn prefix(self) -> &'static [u8] {
        match self {
            Self::Ed25519 => &[6, 161, 159],
            Self::Secp256k1 => &[6, 161, 161],
            Self::P256 => &[6, 161, 164],
            Self::Bls12_381 => &[6, 161, 166],
            Self::Contract => &[2, 90, 121],
            Self::SmartRollup => &[6, 124, 117],
        }
    }

    /// Curve tag of an implicit account
    fn curve_tag(self) -> Option<u8> {
        match self {
            Self::Ed25519 => Some(0),
            Self::Secp256k1 => Some(1),
            Self::P256 => Some(2),
            Self::Bls12_381 => Some(3),
            Self::Contract | Self::SmartRollup => None,
        }
    }

    fn from_curve_tag(tag: u8) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.curve_tag() == Some(tag))
    }
}

/// Account or contract address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address {
    kind: AddressKind,
    hash: [u8; 20],
}

impl Address {
    /// Length of the binary form
    pub const BINARY_LEN: usize = 22;

    /// Address from its kind and 20-byte hash
    pub fn new(kind: AddressKind, hash: [u8; 20]) -> Self {
        Self { kind, hash }
    }

    /// Account kind
    pub fn kind(&self) -> AddressKind {
        self.kind
    }

    /// 20-byte hash
    pub fn hash(&self) -> &[u8; 20] {
        &self.hash
    }

    /// Whether this is an implicit (key-controlled) account
    pub fn is_implicit(&self) -> bool {
        self.kind.curve_tag().is_some()
    }

    /// 22-byte binary form
    ///
    /// Implicit accounts are `0x00 ‖ curve ‖ hash`, originated contracts
    /// `0x01 ‖ hash ‖ 0x00` and smart rollups `0x03 ‖ hash ‖ 0x00`.
    pub fn to_bytes(&self) -> [u8; 22] {
        let mut out = [0u8; 22];
        match self.kind.curve_tag() {
            Some(curve) => {
                out[1] = curve;
                out[2..].copy_from_slice(&self.hash);
            }
            None => {
                out[0] = if self.kind == AddressKind::Contract { 0x01 } else { 0x03 };
                out[1..21].copy_from_slice(&self.hash);
            }
        }
        out
    }

    /// 21-byte key hash form (`curve ‖ hash`), implicit accounts only
    pub fn to_key_hash_bytes(&self) -> Option<[u8; 21]> {
        let curve = self.kind.curve_tag()?;
        let mut out = [0u8; 21];
        out[0] = curve;
        out[1..].copy_from_slice(&self.hash);
        Some(out)
    }

    /// Parse the 22-byte binary form
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let invalid = || {
            BindError::InvalidEncoding(format!("invalid binary address 0x{}", hex::encode(bytes)))
        };
        if bytes.len() != Self::BINARY_LEN {
            return Err(invalid());
        }
        let mut hash = [0u8; 20];
        let kind = match bytes[0] {
            0x00 => {
                hash.copy_from_slice(&bytes[2..]);
                AddressKind::from_curve_tag(bytes[1]).ok_or_else(invalid)?
            }
            0x01 | 0x03 if bytes[21] == 0 => {
                hash.copy_from_slice(&bytes[1..21]);
                if bytes[0] == 0x01 {
                    AddressKind::Contract
                } else {
                    AddressKind::SmartRollup
                }
            }
            _ => return Err(invalid()),
        };
        Ok(Self { kind, hash })
    }
}

impl FromStr for Address {
    type Err = BindError;

    fn from_str(s: &str) -> Result<Self> {
        let prefixes: Vec<&[u8]> = AddressKind::ALL.iter().map(|k| k.prefix()).collect();
        let (index, payload) = base58check::decode_prefixed(s, &prefixes, 20)?;
        let mut hash = [0u8; 20];
        hash.copy_from_slice(&payload);
        Ok(Self {
            kind: AddressKind::ALL[index],
            hash,
        })
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&base58check::encode(self.kind.prefix(), &self.hash))
    }
}

impl Codec for Address {
    fn encode(&self, optimized: bool) -> Result<Prim> {
        if optimized {
            Ok(Prim::Bytes(self.to_bytes().to_vec()))
        } else {
            Ok(Prim::String(self.to_string()))
        }
    }

    fn decode(prim: &Prim) -> Result<Self> {
        match prim {
            Prim::String(s) => s.parse(),
            Prim::Bytes(b) => Self::from_bytes(b),
            other => Err(BindError::mismatch("address", other)),
        }
    }
}

impl ChainKey for Address {
    fn key_digest(&self) -> Digest {
        Digest::of_prim(&Prim::Bytes(self.to_bytes().to_vec()))
    }
}

/// Signature scheme of a public key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyKind {
    /// `edpk`
    Ed25519,
    /// `sppk`
    Secp256k1,
    /// `p2pk`
    P256,
    /// `BLpk`
    Bls12_381,
}

impl KeyKind {
    const ALL: [KeyKind; 4] = [Self::Ed25519, Self::Secp256k1, Self::P256, Self::Bls12_381];

    fn prefix(self) -> &'static [u8] {
        match self {
            Self::Ed25519 => &[13, 15, 37, 217],
            Self::Secp256k1 => &[3, 254, 226, 86],
            Self::P256 => &[3, 178, 139, 127],
            Self::Bls12_381 => &[6, 149, 135, 204],
        }
    }

    fn key_len(self) -> usize {
        match self {
            Self::Ed25519 => 32,
            Self::Secp256k1 | Self::P256 => 33,
            Self::Bls12_381 => 48,
        }
    }

    fn tag(self) -> u8 {
        match self {
            Self::Ed25519 => 0,
            Self::Secp256k1 => 1,
            Self::P256 => 2,
            Self::Bls12_381 => 3,
        }
    }
}

/// Public key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PublicKey {
    kind: KeyKind,
    data: Vec<u8>,
}

impl PublicKey {
    /// Public key from its scheme and raw key bytes
    pub fn new(kind: KeyKind, data: Vec<u8>) -> Result<Self> {
        if data.len() != kind.key_len() {
            return Err(BindError::InvalidEncoding(format!(
                "{:?} key must be {} bytes, got {}",
                kind,
                kind.key_len(),
                data.len()
            )));
        }
        Ok(Self { kind, data })
    }

    /// Signature scheme
    pub fn kind(&self) -> KeyKind {
        self.kind
    }

    /// Binary form: scheme tag followed by the raw key
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.data.len() + 1);
        out.push(self.kind.tag());
        out.extend_from_slice(&self.data);
        out
    }

    /// Parse the binary form
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let (tag, data) = bytes
            .split_first()
            .ok_or_else(|| BindError::InvalidEncoding("empty public key".to_string()))?;
        let kind = KeyKind::ALL
            .into_iter()
            .find(|kind| kind.tag() == *tag)
            .ok_or_else(|| BindError::InvalidEncoding(format!("unknown key tag {}", tag)))?;
        Self::new(kind, data.to_vec())
    }
}

impl FromStr for PublicKey {
    type Err = BindError;

    fn from_str(s: &str) -> Result<Self> {
        for kind in KeyKind::ALL {
            if let Ok((_, data)) = base58check::decode_prefixed(s, &[kind.prefix()], kind.key_len()) {
                return Ok(Self { kind, data });
            }
        }
        Err(BindError::InvalidEncoding(format!("invalid public key '{}'", s)))
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&base58check::encode(self.kind.prefix(), &self.data))
    }
}

impl Codec for PublicKey {
    fn encode(&self, optimized: bool) -> Result<Prim> {
        if optimized {
            Ok(Prim::Bytes(self.to_bytes()))
        } else {
            Ok(Prim::String(self.to_string()))
        }
    }

    fn decode(prim: &Prim) -> Result<Self> {
        match prim {
            Prim::String(s) => s.parse(),
            Prim::Bytes(b) => Self::from_bytes(b),
            other => Err(BindError::mismatch("key", other)),
        }
    }
}

impl ChainKey for PublicKey {
    fn key_digest(&self) -> Digest {
        Digest::of_prim(&Prim::Bytes(self.to_bytes()))
    }
}

/// Scheme a signature was produced with, as far as its text form tells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SignatureKind {
    /// `sig`, scheme unknown
    Generic,
    /// `edsig`
    Ed25519,
    /// `spsig1`
    Secp256k1,
    /// `p2sig`
    P256,
    /// `BLsig`
    Bls12_381,
}

impl SignatureKind {
    const ALL: [SignatureKind; 5] = [
        Self::Generic,
        Self::Ed25519,
        Self::Secp256k1,
        Self::P256,
        Self::Bls12_381,
    ];

    fn prefix(self) -> &'static [u8] {
        match self {
            Self::Generic => &[4, 130, 43],
            Self::Ed25519 => &[9, 245, 205, 134, 18],
            Self::Secp256k1 => &[13, 115, 101, 19, 63],
            Self::P256 => &[54, 240, 44, 52],
            Self::Bls12_381 => &[40, 171, 64, 207],
        }
    }

    fn sig_len(self) -> usize {
        match self {
            Self::Bls12_381 => 96,
            _ => 64,
        }
    }
}

/// Signature
///
/// The binary form carries no scheme information, so equality, ordering and
/// hashing look at the raw bytes only. The scheme is kept for display.
#[derive(Debug, Clone)]
pub struct Signature {
    kind: SignatureKind,
    data: Vec<u8>,
}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl Eq for Signature {}

impl Hash for Signature {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.data.hash(state);
    }
}

impl PartialOrd for Signature {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Signature {
    fn cmp(&self, other: &Self) -> Ordering {
        self.data.cmp(&other.data)
    }
}

impl Signature {
    /// Signature from its scheme and raw bytes
    pub fn new(kind: SignatureKind, data: Vec<u8>) -> Result<Self> {
        if data.len() != kind.sig_len() {
            return Err(BindError::InvalidEncoding(format!(
                "{:?} signature must be {} bytes, got {}",
                kind,
                kind.sig_len(),
                data.len()
            )));
        }
        Ok(Self { kind, data })
    }

    /// Scheme, `Generic` when decoded from bytes
    pub fn kind(&self) -> SignatureKind {
        self.kind
    }

    /// Raw signature bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        self.data.clone()
    }

    /// Parse raw signature bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let kind = if bytes.len() == SignatureKind::Bls12_381.sig_len() {
            SignatureKind::Bls12_381
        } else {
            SignatureKind::Generic
        };
        Self::new(kind, bytes.to_vec())
    }
}

impl FromStr for Signature {
    type Err = BindError;

    fn from_str(s: &str) -> Result<Self> {
        for kind in SignatureKind::ALL {
            if let Ok((_, data)) = base58check::decode_prefixed(s, &[kind.prefix()], kind.sig_len())
            {
                return Ok(Self { kind, data });
            }
        }
        Err(BindError::InvalidEncoding(format!("invalid signature '{}'", s)))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&base58check::encode(self.kind.prefix(), &self.data))
    }
}

impl Codec for Signature {
    fn encode(&self, optimized: bool) -> Result<Prim> {
        if optimized {
            Ok(Prim::Bytes(self.to_bytes()))
        } else {
            Ok(Prim::String(self.to_string()))
        }
    }

    fn decode(prim: &Prim) -> Result<Self> {
        match prim {
            Prim::String(s) => s.parse(),
            Prim::Bytes(b) => Self::from_bytes(b),
            other => Err(BindError::mismatch("signature", other)),
        }
    }
}

impl ChainKey for Signature {
    fn key_digest(&self) -> Digest {
        Digest::of_prim(&Prim::Bytes(self.data.clone()))
    }
}

const CHAIN_ID_PREFIX: &[u8] = &[87, 82, 0];

/// Chain identifier (`Net…`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChainId([u8; 4]);

impl ChainId {
    /// Chain id from its four raw bytes
    pub fn from_raw(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    fn from_slice(bytes: &[u8]) -> Result<Self> {
        let raw: [u8; 4] = bytes.try_into().map_err(|_| {
            BindError::InvalidEncoding(format!("chain id must be 4 bytes, got {}", bytes.len()))
        })?;
        Ok(Self(raw))
    }
}

impl FromStr for ChainId {
    type Err = BindError;

    fn from_str(s: &str) -> Result<Self> {
        let (_, payload) = base58check::decode_prefixed(s, &[CHAIN_ID_PREFIX], 4)?;
        Self::from_slice(&payload)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&base58check::encode(CHAIN_ID_PREFIX, &self.0))
    }
}

impl Codec for ChainId {
    fn encode(&self, _optimized: bool) -> Result<Prim> {
        Ok(Prim::String(self.to_string()))
    }

    fn type_hint() -> Option<TypeDescriptor> {
        Some(TypeDescriptor::new(OpCode::TChainId))
    }

    fn decode(prim: &Prim) -> Result<Self> {
        match prim {
            Prim::String(s) => s.parse(),
            Prim::Bytes(b) => Self::from_slice(b),
            other => Err(BindError::mismatch("chain_id", other)),
        }
    }
}

impl ChainKey for ChainId {
    fn key_digest(&self) -> Digest {
        Digest::of_prim(&Prim::Bytes(self.0.to_vec()))
    }
}

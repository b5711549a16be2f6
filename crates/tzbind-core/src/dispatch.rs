//! Encode/decode entry points
//!
//! Statically typed values go through [`encode`] and [`decode`], which simply
//! delegate to the value's [`Codec`] implementation. Values whose type is only
//! known at runtime go through [`encode_any`], which dispatches over the
//! closed set of supported host kinds in a fixed order:
//!
//! 1. the value already is a tree: returned unchanged
//! 2. the value is a [`HostValue`]: its own rule applies, including
//!    [`HostValue::custom`] wrappers around any [`Codec`] type
//! 3. the value is a known scalar: the scalar bridge rule applies
//! 4. the value is a list or an optional of a known kind: each element is
//!    encoded, into a sequence or into `Some`/`None`
//! 5. anything else fails with [`BindError::UnsupportedType`]

use crate::codec::Codec;
use crate::error::{BindError, Result};
use crate::path::parse_path;
use crate::prim::{OpCode, Prim};
use crate::scalar::{Address, Bytes, ChainId, PublicKey, Signature, Timestamp};
use num_bigint::BigInt;
use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

/// Encode a value into a tree
pub fn encode<T: Codec>(value: &T, optimized: bool) -> Result<Prim> {
    value.encode(optimized)
}

/// Decode a tree into a new value
pub fn decode<T: Codec>(prim: &Prim) -> Result<T> {
    T::decode(prim)
}

/// Decode a tree into an existing destination
///
/// The destination is only overwritten when decoding succeeds.
pub fn decode_into<T: Codec>(prim: &Prim, target: &mut T) -> Result<()> {
    *target = T::decode(prim)?;
    Ok(())
}

/// Decode the subtree found at a textual path such as `r/l`
pub fn decode_at<T: Codec>(prim: &Prim, path: &str) -> Result<T> {
    let path = parse_path(path)?;
    T::decode(prim.unfold_comb().get_path(&path)?)
}

/// Closed set of host value kinds with a scalar bridge rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostValue {
    /// Integer
    Int(BigInt),
    /// Text
    String(String),
    /// Byte string
    Bytes(Vec<u8>),
    /// Boolean
    Bool(bool),
    /// Timestamp
    Timestamp(Timestamp),
    /// Address
    Address(Address),
    /// Public key
    PublicKey(PublicKey),
    /// Signature
    Signature(Signature),
    /// Chain id
    ChainId(ChainId),
    /// Ready-made tree
    Tree(Prim),
    /// Ordered list
    List(Vec<HostValue>),
    /// Optional value
    Optional(Option<Box<HostValue>>),
    /// Value of any type with its own [`Codec`]
    Custom(CustomValue),
}

trait DynEncode: Send + Sync {
    fn encode_dyn(&self, optimized: bool) -> Result<Prim>;
}

impl<T: Codec + Send + Sync> DynEncode for T {
    fn encode_dyn(&self, optimized: bool) -> Result<Prim> {
        self.encode(optimized)
    }
}

/// Type-erased [`Codec`] value
///
/// Two custom values are equal only when they share the same allocation.
#[derive(Clone)]
pub struct CustomValue {
    type_name: &'static str,
    inner: Arc<dyn DynEncode>,
}

impl CustomValue {
    /// Name of the wrapped type
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for CustomValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CustomValue({})", self.type_name)
    }
}

impl PartialEq for CustomValue {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for CustomValue {}

impl HostValue {
    /// Wrap any [`Codec`] value, such as a record, for runtime dispatch
    pub fn custom<T: Codec + Send + Sync + 'static>(value: T) -> Self {
        Self::Custom(CustomValue {
            type_name: type_name::<T>(),
            inner: Arc::new(value),
        })
    }

    /// Encode according to the scalar bridge rules
    pub fn encode(&self, optimized: bool) -> Result<Prim> {
        match self {
            Self::Int(v) => v.encode(optimized),
            Self::String(v) => v.encode(optimized),
            Self::Bytes(v) => Ok(Prim::Bytes(v.clone())),
            Self::Bool(v) => v.encode(optimized),
            Self::Timestamp(v) => v.encode(optimized),
            Self::Address(v) => v.encode(optimized),
            Self::PublicKey(v) => v.encode(optimized),
            Self::Signature(v) => v.encode(optimized),
            Self::ChainId(v) => v.encode(optimized),
            Self::Tree(v) => Ok(v.clone()),
            Self::List(items) => items
                .iter()
                .map(|item| item.encode(optimized))
                .collect::<Result<Vec<_>>>()
                .map(Prim::Seq),
            Self::Optional(Some(inner)) => {
                Ok(Prim::app(OpCode::Some, vec![inner.encode(optimized)?]))
            }
            Self::Optional(None) => Ok(Prim::app(OpCode::None, Vec::new())),
            Self::Custom(custom) => custom.inner.encode_dyn(optimized),
        }
    }

    /// Classify a value of any type into a host kind
    ///
    /// Lists and optionals are recognized one level deep over the known
    /// kinds; anything else must be wrapped with [`HostValue::custom`].
    pub fn from_any<T: Any>(value: &T) -> Result<Self> {
        let any = value as &dyn Any;
        macro_rules! try_kind {
            ($($ty:ty => $make:expr),+ $(,)?) => {
                $(
                    if let Some(v) = any.downcast_ref::<$ty>() {
                        return Ok(($make)(v));
                    }
                    if let Some(items) = any.downcast_ref::<Vec<$ty>>() {
                        return Ok(Self::List(items.iter().map($make).collect()));
                    }
                    if let Some(v) = any.downcast_ref::<Option<$ty>>() {
                        return Ok(Self::Optional(v.as_ref().map($make).map(Box::new)));
                    }
                )+
            };
        }
        try_kind! {
            Prim => |v: &Prim| Self::Tree(v.clone()),
            HostValue => |v: &HostValue| v.clone(),
            BigInt => |v: &BigInt| Self::Int(v.clone()),
            i128 => |v: &i128| Self::Int(BigInt::from(*v)),
            i64 => |v: &i64| Self::Int(BigInt::from(*v)),
            i32 => |v: &i32| Self::Int(BigInt::from(*v)),
            u64 => |v: &u64| Self::Int(BigInt::from(*v)),
            u32 => |v: &u32| Self::Int(BigInt::from(*v)),
            u8 => |v: &u8| Self::Int(BigInt::from(*v)),
            String => |v: &String| Self::String(v.clone()),
            &'static str => |v: &&str| Self::String((*v).to_string()),
            Bytes => |v: &Bytes| Self::Bytes(v.0.clone()),
            bool => |v: &bool| Self::Bool(*v),
            Timestamp => |v: &Timestamp| Self::Timestamp(*v),
            Address => |v: &Address| Self::Address(*v),
            PublicKey => |v: &PublicKey| Self::PublicKey(v.clone()),
            Signature => |v: &Signature| Self::Signature(v.clone()),
            ChainId => |v: &ChainId| Self::ChainId(*v),
        }
        Err(BindError::UnsupportedType(type_name::<T>().to_string()))
    }
}

impl From<Prim> for HostValue {
    fn from(value: Prim) -> Self {
        Self::Tree(value)
    }
}

impl From<i64> for HostValue {
    fn from(value: i64) -> Self {
        Self::Int(BigInt::from(value))
    }
}

impl From<&str> for HostValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for HostValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for HostValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Address> for HostValue {
    fn from(value: Address) -> Self {
        Self::Address(value)
    }
}

impl From<Timestamp> for HostValue {
    fn from(value: Timestamp) -> Self {
        Self::Timestamp(value)
    }
}

/// Encode a value whose type is only known at runtime
pub fn encode_any<T: Any>(value: &T, optimized: bool) -> Result<Prim> {
    HostValue::from_any(value)?.encode(optimized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::AddressKind;

    #[test]
    fn test_tree_is_returned_unchanged() {
        let tree = Prim::pair(Prim::string("a"), Prim::int(1));
        assert_eq!(encode_any(&tree, true).unwrap(), tree);
    }

    #[test]
    fn test_scalars_dispatch() {
        assert_eq!(encode_any(&42u32, false).unwrap(), Prim::int(42));
        assert_eq!(encode_any(&"hi", false).unwrap(), Prim::string("hi"));
        assert_eq!(encode_any(&true, false).unwrap(), Prim::bool(true));
        let address = Address::new(AddressKind::Ed25519, [0u8; 20]);
        assert_eq!(
            encode_any(&address, true).unwrap(),
            Prim::bytes(address.to_bytes().to_vec())
        );
    }

    #[test]
    fn test_lists_encode_elementwise() {
        let list = vec![HostValue::from(1i64), HostValue::from("x")];
        assert_eq!(
            encode_any(&list, false).unwrap(),
            Prim::seq(vec![Prim::int(1), Prim::string("x")])
        );
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Point {
        x: i64,
        y: String,
        owner: Address,
    }

    crate::impl_record_codec!(Point { x, y, owner });

    #[test]
    fn test_dynamic_dispatch_agrees_with_static() {
        let point = Point {
            x: -3,
            y: "north".to_string(),
            owner: Address::new(AddressKind::Secp256k1, [4u8; 20]),
        };
        let numbers: Vec<i64> = vec![1, -2, 3];
        let present: Option<i64> = Some(5);
        let absent: Option<String> = None;
        for optimized in [false, true] {
            assert_eq!(
                encode_any(&HostValue::custom(point.clone()), optimized).unwrap(),
                encode(&point, optimized).unwrap()
            );
            assert_eq!(
                encode_any(&numbers, optimized).unwrap(),
                encode(&numbers, optimized).unwrap()
            );
            assert_eq!(
                encode_any(&present, optimized).unwrap(),
                encode(&present, optimized).unwrap()
            );
            assert_eq!(
                encode_any(&absent, optimized).unwrap(),
                encode(&absent, optimized).unwrap()
            );
        }
    }

    #[test]
    fn test_custom_values_compare_by_identity() {
        let value = HostValue::custom(7i64);
        assert_eq!(value.clone(), value);
        assert_ne!(HostValue::custom(7i64), value);
        match &value {
            HostValue::Custom(custom) => assert_eq!(custom.type_name(), "i64"),
            other => panic!("expected Custom, got {:?}", other),
        }
    }

    #[test]
    fn test_function_value_is_unsupported() {
        fn callback(x: i32) -> i32 {
            x
        }
        let f: fn(i32) -> i32 = callback;
        match encode_any(&f, true) {
            Err(BindError::UnsupportedType(name)) => assert!(name.contains("fn(i32)"), "{}", name),
            other => panic!("expected UnsupportedType, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_into_keeps_target_on_error() {
        let mut target = 7i64;
        assert!(decode_into(&Prim::string("x"), &mut target).is_err());
        assert_eq!(target, 7);
        decode_into(&Prim::int(9), &mut target).unwrap();
        assert_eq!(target, 9);
    }

    #[test]
    fn test_decode_at_path() {
        let tree = Prim::pair(Prim::int(1), Prim::pair(Prim::string("b"), Prim::bool(false)));
        assert_eq!(decode_at::<i64>(&tree, "l").unwrap(), 1);
        assert_eq!(decode_at::<String>(&tree, "r/l").unwrap(), "b");
        assert!(!decode_at::<bool>(&tree, "r/r").unwrap());
    }
}

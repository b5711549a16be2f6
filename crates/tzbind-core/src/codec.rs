//! The codec capability and its built-in implementations
//!
//! Every host type that can cross into the value tree implements [`Codec`].
//! Dispatch is static: the destination type picks the decode rule and the
//! observed node kind is checked against it, so there is no runtime schema.
//!
//! Built-in rules covered here: trees (passed through unchanged), integers,
//! strings, booleans, unit, boxed values and sequences. Byte strings,
//! timestamps and the credential types live in [`crate::scalar`]; optionals,
//! unions and maps in their own modules.

use crate::error::{BindError, Result};
use crate::prim::{OpCode, Prim};
use crate::types::TypeDescriptor;
use num_bigint::BigInt;

/// Bidirectional conversion between a host value and a value tree
///
/// `optimized` selects the chain's compact binary-friendly form over the
/// human-readable one for scalars where the two differ (timestamps,
/// addresses, keys, signatures). Decoding accepts either form.
pub trait Codec: Sized {
    /// Encode this value into a tree
    fn encode(&self, optimized: bool) -> Result<Prim>;

    /// Decode a tree into a value of this type
    fn decode(prim: &Prim) -> Result<Self>;

    /// Chain type of this host type when its tree form alone does not tell
    ///
    /// Consulted before shape inference when a lookup digest needs a key type.
    fn type_hint() -> Option<TypeDescriptor> {
        None
    }
}

impl Codec for Prim {
    fn encode(&self, _optimized: bool) -> Result<Prim> {
        Ok(self.clone())
    }

    fn decode(prim: &Prim) -> Result<Self> {
        Ok(prim.clone())
    }
}

macro_rules! int_codecs {
    ($($ty:ty),+) => {
        $(
            impl Codec for $ty {
                fn encode(&self, _optimized: bool) -> Result<Prim> {
                    Ok(Prim::Int(BigInt::from(*self)))
                }

                fn decode(prim: &Prim) -> Result<Self> {
                    match prim {
                        Prim::Int(value) => <$ty>::try_from(value).map_err(|_| BindError::OutOfRange {
                            value: value.clone(),
                            target: stringify!($ty),
                        }),
                        other => Err(BindError::mismatch("int", other)),
                    }
                }
            }
        )+
    };
}

int_codecs!(i128, i64, i32, u64, u32, u8);

impl Codec for BigInt {
    fn encode(&self, _optimized: bool) -> Result<Prim> {
        Ok(Prim::Int(self.clone()))
    }

    fn decode(prim: &Prim) -> Result<Self> {
        match prim {
            Prim::Int(value) => Ok(value.clone()),
            other => Err(BindError::mismatch("int", other)),
        }
    }
}

impl Codec for String {
    fn encode(&self, _optimized: bool) -> Result<Prim> {
        Ok(Prim::String(self.clone()))
    }

    fn decode(prim: &Prim) -> Result<Self> {
        match prim {
            Prim::String(s) => Ok(s.clone()),
            other => Err(BindError::mismatch("string", other)),
        }
    }
}

impl Codec for bool {
    fn encode(&self, _optimized: bool) -> Result<Prim> {
        Ok(Prim::bool(*self))
    }

    fn decode(prim: &Prim) -> Result<Self> {
        match prim.op() {
            Some(OpCode::True) => Ok(true),
            Some(OpCode::False) => Ok(false),
            _ => Err(BindError::mismatch("bool", prim)),
        }
    }
}

impl Codec for () {
    fn encode(&self, _optimized: bool) -> Result<Prim> {
        Ok(Prim::unit())
    }

    fn decode(prim: &Prim) -> Result<Self> {
        if prim.is_op(OpCode::Unit) {
            Ok(())
        } else {
            Err(BindError::mismatch("unit", prim))
        }
    }
}

impl<T: Codec> Codec for Box<T> {
    fn encode(&self, optimized: bool) -> Result<Prim> {
        (**self).encode(optimized)
    }

    fn decode(prim: &Prim) -> Result<Self> {
        T::decode(prim).map(Box::new)
    }
}

impl<T: Codec> Codec for Vec<T> {
    fn encode(&self, optimized: bool) -> Result<Prim> {
        self.iter()
            .map(|item| item.encode(optimized))
            .collect::<Result<Vec<_>>>()
            .map(Prim::Seq)
    }

    fn decode(prim: &Prim) -> Result<Self> {
        match prim {
            Prim::Seq(children) => children.iter().map(T::decode).collect(),
            other => Err(BindError::mismatch("sequence", other)),
        }
    }
}

/// Opaque code carried as a tree
///
/// Lambdas are passed through untouched in both directions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Lambda(pub Prim);

impl Codec for Lambda {
    fn encode(&self, _optimized: bool) -> Result<Prim> {
        Ok(self.0.clone())
    }

    fn decode(prim: &Prim) -> Result<Self> {
        Ok(Self(prim.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_passthrough() {
        let tree = Prim::pair(Prim::int(1), Prim::unit());
        assert_eq!(tree.encode(true).unwrap(), tree);
        assert_eq!(Prim::decode(&tree).unwrap(), tree);
    }

    #[test]
    fn test_int_range_checked() {
        assert_eq!(u8::decode(&Prim::int(255)).unwrap(), 255);
        assert_eq!(
            u8::decode(&Prim::int(256)),
            Err(BindError::OutOfRange {
                value: BigInt::from(256),
                target: "u8"
            })
        );
        assert!(matches!(
            u64::decode(&Prim::int(-1)),
            Err(BindError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_big_int_is_unbounded() {
        let token_id: BigInt = "340282366920938463463374607431768211456".parse().unwrap();
        let tree = token_id.encode(true).unwrap();
        assert_eq!(BigInt::decode(&tree).unwrap(), token_id);
        assert!(matches!(
            i128::decode(&tree),
            Err(BindError::OutOfRange { target: "i128", .. })
        ));
    }

    #[test]
    fn test_scalar_kind_mismatch() {
        let err = String::decode(&Prim::seq(vec![])).unwrap_err();
        assert_eq!(
            err,
            BindError::TypeMismatch {
                expected: "string".to_string(),
                found: "sequence".to_string()
            }
        );
        assert!(matches!(
            bool::decode(&Prim::int(1)),
            Err(BindError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_sequence_codec() {
        let values = vec![1i64, 2, 3];
        let tree = values.encode(false).unwrap();
        assert_eq!(
            tree,
            Prim::seq(vec![Prim::int(1), Prim::int(2), Prim::int(3)])
        );
        assert_eq!(Vec::<i64>::decode(&tree).unwrap(), values);
        assert_eq!(Vec::<i64>::decode(&Prim::seq(vec![])).unwrap(), Vec::<i64>::new());
    }

    #[test]
    fn test_boxed_destination() {
        let boxed: Box<String> = Box::decode(&Prim::string("x")).unwrap();
        assert_eq!(*boxed, "x");
    }

    #[test]
    fn test_lambda_is_opaque() {
        let code = Prim::seq(vec![Prim::app(OpCode::Unit, vec![])]);
        let lambda = Lambda::decode(&code).unwrap();
        assert_eq!(lambda.encode(true).unwrap(), code);
    }
}

//! Binary unions
//!
//! [`Choice`] maps to `Left x` / `Right y`. Only the active side exists, so
//! the inactive side can never be observed.

use crate::codec::Codec;
use crate::digest::{ChainKey, Digest};
use crate::error::{BindError, Result};
use crate::prim::{OpCode, Prim};

/// Tagged left/right value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Choice<L, R> {
    /// Left side
    Left(L),
    /// Right side
    Right(R),
}

impl<L, R> Choice<L, R> {
    /// Whether the right side is active
    pub fn is_right(&self) -> bool {
        matches!(self, Self::Right(_))
    }

    /// Left value, if active
    pub fn left(&self) -> Option<&L> {
        match self {
            Self::Left(value) => Some(value),
            Self::Right(_) => None,
        }
    }

    /// Right value, if active
    pub fn right(&self) -> Option<&R> {
        match self {
            Self::Right(value) => Some(value),
            Self::Left(_) => None,
        }
    }

    /// Make the left side active
    pub fn set_left(&mut self, value: L) {
        *self = Self::Left(value);
    }

    /// Make the right side active
    pub fn set_right(&mut self, value: R) {
        *self = Self::Right(value);
    }
}

impl<L: Default, R> Default for Choice<L, R> {
    fn default() -> Self {
        Self::Left(L::default())
    }
}

impl<L: Codec, R: Codec> Codec for Choice<L, R> {
    fn encode(&self, optimized: bool) -> Result<Prim> {
        match self {
            Self::Left(value) => Ok(Prim::app(OpCode::Left, vec![value.encode(optimized)?])),
            Self::Right(value) => Ok(Prim::app(OpCode::Right, vec![value.encode(optimized)?])),
        }
    }

    fn decode(prim: &Prim) -> Result<Self> {
        match prim.op() {
            Some(OpCode::Left) => {
                let args = prim.expect_app(OpCode::Left, 1)?;
                L::decode(&args[0]).map(Self::Left)
            }
            Some(OpCode::Right) => {
                let args = prim.expect_app(OpCode::Right, 1)?;
                R::decode(&args[0]).map(Self::Right)
            }
            _ => Err(BindError::UnexpectedTag {
                expected: "Left or Right",
                found: prim.describe(),
            }),
        }
    }
}

impl<L: ChainKey, R: ChainKey> ChainKey for Choice<L, R> {
    fn key_digest(&self) -> Digest {
        match self {
            Self::Left(value) => Digest::tagged(0x00, &value.key_digest()),
            Self::Right(value) => Digest::tagged(0x01, &value.key_digest()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Union = Choice<i64, String>;

    #[test]
    fn test_both_sides_roundtrip() {
        let left: Union = Choice::Left(-3);
        let right: Union = Choice::Right("x".to_string());
        for value in [left, right] {
            let tree = value.encode(false).unwrap();
            assert_eq!(Union::decode(&tree).unwrap(), value);
        }
    }

    #[test]
    fn test_encode_shape() {
        let right: Union = Choice::Right("x".to_string());
        assert_eq!(
            right.encode(true).unwrap(),
            Prim::app(OpCode::Right, vec![Prim::string("x")])
        );
    }

    #[test]
    fn test_unexpected_tag() {
        let err = Union::decode(&Prim::app(OpCode::Some, vec![Prim::int(1)])).unwrap_err();
        assert_eq!(
            err,
            BindError::UnexpectedTag {
                expected: "Left or Right",
                found: "Some/1".to_string()
            }
        );
    }

    #[test]
    fn test_equal_values_on_opposite_sides_hash_apart() {
        let left: Choice<i64, i64> = Choice::Left(1);
        let right: Choice<i64, i64> = Choice::Right(1);
        assert_ne!(left.key_digest(), right.key_digest());
    }

    #[test]
    fn test_setters_switch_side() {
        let mut value: Union = Choice::default();
        assert!(!value.is_right());
        value.set_right("y".to_string());
        assert_eq!(value.right().map(String::as_str), Some("y"));
        assert_eq!(value.left(), None);
    }
}

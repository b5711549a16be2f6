//! Optional values
//!
//! `Option<T>` maps to `Some x` / `None`. An absent value never carries a
//! payload, so the "inactive value must not be observed" rule holds by
//! construction.

use crate::codec::Codec;
use crate::digest::{ChainKey, Digest};
use crate::error::{BindError, Result};
use crate::prim::{OpCode, Prim};

impl<T: Codec> Codec for Option<T> {
    fn encode(&self, optimized: bool) -> Result<Prim> {
        match self {
            Some(value) => Ok(Prim::app(OpCode::Some, vec![value.encode(optimized)?])),
            None => Ok(Prim::app(OpCode::None, Vec::new())),
        }
    }

    fn decode(prim: &Prim) -> Result<Self> {
        match prim.op() {
            Some(OpCode::Some) => {
                let args = prim.expect_app(OpCode::Some, 1)?;
                T::decode(&args[0]).map(Some)
            }
            Some(OpCode::None) => Ok(None),
            _ => Err(BindError::UnexpectedTag {
                expected: "Some or None",
                found: prim.describe(),
            }),
        }
    }
}

impl<T: ChainKey> ChainKey for Option<T> {
    fn key_digest(&self) -> Digest {
        match self {
            Some(value) => value.key_digest(),
            None => Digest::ABSENT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_shapes() {
        assert_eq!(
            Some(5i64).encode(true).unwrap(),
            Prim::app(OpCode::Some, vec![Prim::int(5)])
        );
        assert_eq!(
            None::<i64>.encode(true).unwrap(),
            Prim::app(OpCode::None, vec![])
        );
    }

    #[test]
    fn test_nested_absence_is_distinct() {
        let absent: Option<Option<i64>> = None;
        let present_absent: Option<Option<i64>> = Some(None);
        let absent_tree = absent.encode(false).unwrap();
        let present_absent_tree = present_absent.encode(false).unwrap();
        assert_ne!(absent_tree, present_absent_tree);
        assert_eq!(Option::<Option<i64>>::decode(&absent_tree).unwrap(), None);
        assert_eq!(
            Option::<Option<i64>>::decode(&present_absent_tree).unwrap(),
            Some(None)
        );
    }

    #[test]
    fn test_wrong_arity_and_tag() {
        let bad = Prim::app(OpCode::Some, vec![]);
        assert!(matches!(
            Option::<i64>::decode(&bad),
            Err(BindError::MalformedShape(_))
        ));
        assert!(matches!(
            Option::<i64>::decode(&Prim::app(OpCode::Left, vec![Prim::int(1)])),
            Err(BindError::UnexpectedTag { .. })
        ));
        assert!(matches!(
            Option::<i64>::decode(&Prim::int(1)),
            Err(BindError::UnexpectedTag { .. })
        ));
    }

    #[test]
    fn test_absent_key_digest() {
        assert_eq!(None::<String>.key_digest(), Digest::ABSENT);
        assert_eq!(Some(3u32).key_digest(), 3u32.key_digest());
    }
}

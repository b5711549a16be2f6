//! Records as right combs
//!
//! A record with fields `f0 … fn` encodes to `Pair f0 (Pair f1 (… fn))`. Field
//! N lives at N right steps followed by one left step; the last field at right
//! steps only. A one-field record encodes to the field's tree directly.
//!
//! Use [`impl_record_codec!`](crate::impl_record_codec) to derive the codec of
//! a struct from its field list, and [`impl_record_key!`](crate::impl_record_key)
//! to make it usable as a [`ChainMap`](crate::ChainMap) key.

use crate::codec::Codec;
use crate::error::{BindError, Result};
use crate::path::{comb_path, fold_right_comb, render_path};
use crate::prim::Prim;

/// Encode already encoded fields as a right comb
pub fn encode_record(fields: Vec<Prim>) -> Prim {
    fold_right_comb(fields)
}

/// Sequential field reader over a record tree
#[derive(Debug)]
pub struct RecordFields {
    comb: Prim,
    count: usize,
    index: usize,
}

impl RecordFields {
    /// Prepare to read `count` fields from `prim`
    ///
    /// Accepts binary combs, wide pairs and sequences of two or more values,
    /// which the chain treats as the same comb.
    pub fn new(prim: &Prim, count: usize) -> Result<Self> {
        let comb = if count <= 1 {
            prim.clone()
        } else {
            match prim {
                Prim::Seq(items) if items.len() >= 2 => fold_right_comb(items.clone()).unfold_comb(),
                other if other.is_pair() => other.unfold_comb(),
                other => return Err(BindError::mismatch("pair", other)),
            }
        };
        Ok(Self {
            comb,
            count,
            index: 0,
        })
    }

    /// Decode the next field in declaration order
    pub fn next_field<T: Codec>(&mut self) -> Result<T> {
        if self.index >= self.count {
            return Err(BindError::MalformedShape(format!(
                "record has only {} field(s)",
                self.count
            )));
        }
        let path = comb_path(self.index, self.count);
        self.index += 1;
        let node = self.comb.get_path(&path).map_err(|_| {
            BindError::MalformedShape(format!(
                "record of {} fields has no node at '{}'",
                self.count,
                render_path(&path)
            ))
        })?;
        T::decode(node)
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! __record_count {
    () => { 0usize };
    ($head:ident $($tail:ident)*) => { 1usize + $crate::__record_count!($($tail)*) };
}

/// Implement [`Codec`](crate::Codec) for a struct encoded as a right comb of
/// its fields, in the order listed
///
/// ```rust,ignore
/// struct Transfer { from: Address, to: Address, amount: u64 }
/// tzbind_core::impl_record_codec!(Transfer { from, to, amount });
/// ```
#[macro_export]
macro_rules! impl_record_codec {
    ($name:ty { $($field:ident),+ $(,)? }) => {
        impl $crate::Codec for $name {
            fn encode(&self, optimized: bool) -> ::core::result::Result<$crate::Prim, $crate::BindError> {
                ::core::result::Result::Ok($crate::record::encode_record(::std::vec![
                    $($crate::Codec::encode(&self.$field, optimized)?),+
                ]))
            }

            fn decode(prim: &$crate::Prim) -> ::core::result::Result<Self, $crate::BindError> {
                let mut fields = $crate::record::RecordFields::new(
                    prim,
                    $crate::__record_count!($($field)+),
                )?;
                ::core::result::Result::Ok(Self {
                    $($field: fields.next_field()?),+
                })
            }
        }
    };
}

/// Implement [`ChainKey`](crate::ChainKey) for a struct from the digests of
/// the listed fields
#[macro_export]
macro_rules! impl_record_key {
    ($name:ty { $($field:ident),+ $(,)? }) => {
        impl $crate::ChainKey for $name {
            fn key_digest(&self) -> $crate::Digest {
                $crate::Digest::combine(&[
                    $($crate::ChainKey::key_digest(&self.$field)),+
                ])
            }
        }
    };
}

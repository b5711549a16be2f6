//! Type descriptors
//!
//! A [`TypeDescriptor`] describes the expected tree shape of a value. The
//! binding engine needs it for two things: computing the canonical lookup
//! digest of a big map key (the key must first be brought into the optimized
//! form its type requires) and resolving named arguments to the structural
//! paths their `%field` annotations occupy.

use crate::digest::ScriptExprHash;
use crate::error::{BindError, Result};
use crate::path::Branch;
use crate::prim::{OpCode, Prim};
use crate::scalar::{Address, ChainId, PublicKey, Signature, Timestamp};
use std::collections::BTreeMap;
use std::fmt;

/// Type tree with optional field annotations
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    /// Type keyword
    pub code: OpCode,
    /// Type arguments
    pub args: Vec<TypeDescriptor>,
    /// Annotations such as `%amount`
    pub annots: Vec<String>,
}

impl TypeDescriptor {
    /// Type without arguments
    pub fn new(code: OpCode) -> Self {
        Self {
            code,
            args: Vec::new(),
            annots: Vec::new(),
        }
    }

    /// Type with arguments
    pub fn with_args(code: OpCode, args: Vec<TypeDescriptor>) -> Self {
        Self {
            code,
            args,
            annots: Vec::new(),
        }
    }

    /// Attach a `%name` field annotation
    pub fn named(mut self, name: &str) -> Self {
        self.annots.push(format!("%{}", name));
        self
    }

    /// Field name taken from the first `%` annotation
    pub fn field_name(&self) -> Option<&str> {
        self.annots.iter().find_map(|a| a.strip_prefix('%'))
    }

    /// Parse a type from its tree form
    pub fn from_prim(prim: &Prim) -> Result<Self> {
        match prim {
            Prim::App { op, args, annots } if op.is_type() => Ok(Self {
                code: *op,
                args: args.iter().map(Self::from_prim).collect::<Result<_>>()?,
                annots: annots.clone(),
            }),
            other => Err(BindError::mismatch("type", other)),
        }
    }

    /// Tree form of this type
    pub fn to_prim(&self) -> Prim {
        Prim::App {
            op: self.code,
            args: self.args.iter().map(Self::to_prim).collect(),
            annots: self.annots.clone(),
        }
    }

    /// Infer a type from the shape of an optimized value
    ///
    /// Byte strings stay `bytes` even when they hold an address: the packed
    /// form of both is identical, which is all digests need.
    pub fn infer(value: &Prim) -> Self {
        match value {
            Prim::Int(_) => Self::new(OpCode::TInt),
            Prim::String(_) => Self::new(OpCode::TString),
            Prim::Bytes(_) => Self::new(OpCode::TBytes),
            Prim::Seq(children) => match children.first() {
                Some(first) if first.is_op(OpCode::Elt) && first.args().len() == 2 => {
                    Self::with_args(
                        OpCode::TMap,
                        vec![Self::infer(&first.args()[0]), Self::infer(&first.args()[1])],
                    )
                }
                Some(first) => Self::with_args(OpCode::TList, vec![Self::infer(first)]),
                None => Self::with_args(OpCode::TList, vec![Self::new(OpCode::TUnit)]),
            },
            Prim::App { op, args, .. } => match (op, args.as_slice()) {
                (OpCode::True | OpCode::False, _) => Self::new(OpCode::TBool),
                (OpCode::Pair, items) => {
                    Self::with_args(OpCode::TPair, items.iter().map(Self::infer).collect())
                }
                (OpCode::Some, [inner]) => Self::with_args(OpCode::TOption, vec![Self::infer(inner)]),
                (OpCode::None, _) => {
                    Self::with_args(OpCode::TOption, vec![Self::new(OpCode::TUnit)])
                }
                (OpCode::Left, [inner]) => Self::with_args(
                    OpCode::TOr,
                    vec![Self::infer(inner), Self::new(OpCode::TUnit)],
                ),
                (OpCode::Right, [inner]) => Self::with_args(
                    OpCode::TOr,
                    vec![Self::new(OpCode::TUnit), Self::infer(inner)],
                ),
                _ => Self::new(OpCode::TUnit),
            },
        }
    }

    /// Rewrite `pair a b c` as `pair a (pair b c)` along the right spine
    pub fn unfold_comb(&self) -> Self {
        if self.code != OpCode::TPair || self.args.len() < 2 {
            return self.clone();
        }
        let right = if self.args.len() == 2 {
            self.args[1].unfold_comb()
        } else {
            Self::with_args(OpCode::TPair, self.args[1..].to_vec()).unfold_comb()
        };
        Self {
            code: OpCode::TPair,
            args: vec![self.args[0].clone(), right],
            annots: self.annots.clone(),
        }
    }

    /// Map each annotated field to its structural path
    ///
    /// Walks the binary pair structure; an un-annotated nested pair is
    /// descended into, an annotated one is a field of its own.
    pub fn field_paths(&self) -> BTreeMap<String, Vec<Branch>> {
        let mut out = BTreeMap::new();
        self.unfold_comb().collect_fields(&mut Vec::new(), &mut out);
        out
    }

    fn collect_fields(&self, at: &mut Vec<Branch>, out: &mut BTreeMap<String, Vec<Branch>>) {
        if let Some(name) = self.field_name() {
            out.insert(name.to_string(), at.clone());
            return;
        }
        if self.code == OpCode::TPair && self.args.len() == 2 {
            for (branch, arg) in [Branch::Left, Branch::Right].into_iter().zip(&self.args) {
                at.push(branch);
                arg.unfold_comb().collect_fields(at, out);
                at.pop();
            }
        }
    }

    /// Bring `value` into the optimized form this type requires
    ///
    /// Textual addresses, keys, signatures, chain ids and timestamps become
    /// their binary or integer forms; wide pairs become binary combs.
    pub fn normalize(&self, value: &Prim) -> Result<Prim> {
        match (self.code, value) {
            (OpCode::TAddress | OpCode::TContract, Prim::String(s)) => {
                let address: Address = s.parse()?;
                Ok(Prim::Bytes(address.to_bytes().to_vec()))
            }
            (OpCode::TKeyHash, Prim::String(s)) => key_hash_form(s.parse()?),
            (OpCode::TKeyHash, Prim::Bytes(b)) if b.len() == Address::BINARY_LEN => {
                key_hash_form(Address::from_bytes(b)?)
            }
            (OpCode::TKey, Prim::String(s)) => Ok(Prim::Bytes(s.parse::<PublicKey>()?.to_bytes())),
            (OpCode::TSignature, Prim::String(s)) => {
                Ok(Prim::Bytes(s.parse::<Signature>()?.to_bytes()))
            }
            (OpCode::TChainId, Prim::String(s)) => {
                Ok(Prim::Bytes(s.parse::<ChainId>()?.as_bytes().to_vec()))
            }
            (OpCode::TTimestamp, Prim::String(s)) => {
                Ok(Prim::int(s.parse::<Timestamp>()?.unix()))
            }
            (OpCode::TPair, _) => self.normalize_pair(value),
            (OpCode::TOption, Prim::App { op: OpCode::Some, args, .. }) if args.len() == 1 => {
                Ok(Prim::app(OpCode::Some, vec![self.arg(0)?.normalize(&args[0])?]))
            }
            (OpCode::TOr, Prim::App { op: OpCode::Left, args, .. }) if args.len() == 1 => {
                Ok(Prim::app(OpCode::Left, vec![self.arg(0)?.normalize(&args[0])?]))
            }
            (OpCode::TOr, Prim::App { op: OpCode::Right, args, .. }) if args.len() == 1 => {
                Ok(Prim::app(OpCode::Right, vec![self.arg(1)?.normalize(&args[0])?]))
            }
            (OpCode::TList | OpCode::TSet, Prim::Seq(items)) => {
                let inner = self.arg(0)?;
                items
                    .iter()
                    .map(|item| inner.normalize(item))
                    .collect::<Result<Vec<_>>>()
                    .map(Prim::Seq)
            }
            (OpCode::TMap | OpCode::TBigMap, Prim::Seq(items)) => {
                let (key_type, value_type) = (self.arg(0)?, self.arg(1)?);
                items
                    .iter()
                    .map(|item| {
                        let args = item.expect_app(OpCode::Elt, 2)?;
                        Ok(Prim::elt(
                            key_type.normalize(&args[0])?,
                            value_type.normalize(&args[1])?,
                        ))
                    })
                    .collect::<Result<Vec<_>>>()
                    .map(Prim::Seq)
            }
            _ => Ok(value.clone()),
        }
    }

    fn normalize_pair(&self, value: &Prim) -> Result<Prim> {
        let typ = self.unfold_comb();
        let value = match value {
            Prim::Seq(items) if items.len() >= 2 => crate::path::fold_right_comb(items.clone()),
            other => other.unfold_comb(),
        };
        match (typ.args.as_slice(), value.args()) {
            ([left_type, right_type], [left, right]) if value.is_pair() => Ok(Prim::pair(
                left_type.normalize(left)?,
                right_type.normalize(right)?,
            )),
            _ => Err(BindError::mismatch("pair", &value)),
        }
    }

    fn arg(&self, index: usize) -> Result<&TypeDescriptor> {
        self.args.get(index).ok_or_else(|| {
            BindError::MalformedShape(format!("type {} lacks argument {}", self.code, index))
        })
    }

    /// Lookup digest of a big map key of this type
    pub fn key_hash(&self, key: &Prim) -> Result<ScriptExprHash> {
        Ok(ScriptExprHash::of_prim(&self.normalize(key)?))
    }
}

/// 21-byte key hash form of an implicit account address
fn key_hash_form(address: Address) -> Result<Prim> {
    let bytes = address.to_key_hash_bytes().ok_or_else(|| {
        BindError::InvalidEncoding(format!("'{}' is not a key hash", address))
    })?;
    Ok(Prim::Bytes(bytes.to_vec()))
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_prim())
    }
}

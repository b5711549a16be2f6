//! Value tree representation
//!
//! This module contains the chain's universal value tree: a tagged node that is
//! either an integer, a string, a byte string, a sequence of children or an
//! application of an opcode to children. The binding engine only consumes and
//! produces this shape; the node constructors, predicates and the few shape
//! utilities it relies on live here.

use crate::error::{BindError, Result};
use crate::path::{render_path, Branch};
use core::fmt;
use num_bigint::BigInt;

macro_rules! opcodes {
    ($($(#[$doc:meta])* $variant:ident = ($byte:literal, $name:literal, $class:ident)),+ $(,)?) => {
        /// Opcode tag of an application node
        ///
        /// One variant per primitive of the protocol: data constructors,
        /// instructions, type keywords and script section keywords. Binary
        /// tags follow the protocol's primitive table.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum OpCode {
            $($(#[$doc])* $variant,)+
        }

        impl OpCode {
            /// Binary tag byte of this opcode
            pub fn byte(self) -> u8 {
                match self {
                    $(Self::$variant => $byte,)+
                }
            }

            /// Textual name of this opcode
            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }

            /// Namespace this opcode belongs to
            pub fn class(self) -> OpClass {
                match self {
                    $(Self::$variant => OpClass::$class,)+
                }
            }

            /// Look up an opcode by its binary tag byte
            pub fn from_byte(byte: u8) -> Option<Self> {
                match byte {
                    $($byte => Some(Self::$variant),)+
                    _ => None,
                }
            }

            /// Look up an opcode by its textual name
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

/// Namespace of a primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpClass {
    /// Data constructor such as `Pair` or `Some`
    Data,
    /// Instruction such as `DROP`
    Instr,
    /// Type keyword such as `pair`
    Type,
    /// Script section keyword such as `parameter`
    Keyword,
}

opcodes! {
    /// `parameter` section
    KParameter = (0x00, "parameter", Keyword),
    /// `storage` section
    KStorage = (0x01, "storage", Keyword),
    /// `code` section
    KCode = (0x02, "code", Keyword),
    /// Boolean false
    False = (0x03, "False", Data),
    /// Map entry
    Elt = (0x04, "Elt", Data),
    /// Left side of a union
    Left = (0x05, "Left", Data),
    /// Absent optional
    None = (0x06, "None", Data),
    /// Pair of values
    Pair = (0x07, "Pair", Data),
    /// Right side of a union
    Right = (0x08, "Right", Data),
    /// Present optional
    Some = (0x09, "Some", Data),
    /// Boolean true
    True = (0x0A, "True", Data),
    /// Unit value
    Unit = (0x0B, "Unit", Data),
    IPack = (0x0C, "PACK", Instr),
    IUnpack = (0x0D, "UNPACK", Instr),
    IBlake2b = (0x0E, "BLAKE2B", Instr),
    ISha256 = (0x0F, "SHA256", Instr),
    ISha512 = (0x10, "SHA512", Instr),
    IAbs = (0x11, "ABS", Instr),
    IAdd = (0x12, "ADD", Instr),
    IAmount = (0x13, "AMOUNT", Instr),
    IAnd = (0x14, "AND", Instr),
    IBalance = (0x15, "BALANCE", Instr),
    ICar = (0x16, "CAR", Instr),
    ICdr = (0x17, "CDR", Instr),
    ICheckSignature = (0x18, "CHECK_SIGNATURE", Instr),
    ICompare = (0x19, "COMPARE", Instr),
    IConcat = (0x1A, "CONCAT", Instr),
    ICons = (0x1B, "CONS", Instr),
    ICreateAccount = (0x1C, "CREATE_ACCOUNT", Instr),
    ICreateContract = (0x1D, "CREATE_CONTRACT", Instr),
    IImplicitAccount = (0x1E, "IMPLICIT_ACCOUNT", Instr),
    IDip = (0x1F, "DIP", Instr),
    IDrop = (0x20, "DROP", Instr),
    IDup = (0x21, "DUP", Instr),
    IEdiv = (0x22, "EDIV", Instr),
    IEmptyMap = (0x23, "EMPTY_MAP", Instr),
    IEmptySet = (0x24, "EMPTY_SET", Instr),
    IEq = (0x25, "EQ", Instr),
    IExec = (0x26, "EXEC", Instr),
    IFailwith = (0x27, "FAILWITH", Instr),
    IGe = (0x28, "GE", Instr),
    IGet = (0x29, "GET", Instr),
    IGt = (0x2A, "GT", Instr),
    IHashKey = (0x2B, "HASH_KEY", Instr),
    IIf = (0x2C, "IF", Instr),
    IIfCons = (0x2D, "IF_CONS", Instr),
    IIfLeft = (0x2E, "IF_LEFT", Instr),
    IIfNone = (0x2F, "IF_NONE", Instr),
    IInt = (0x30, "INT", Instr),
    ILambda = (0x31, "LAMBDA", Instr),
    ILe = (0x32, "LE", Instr),
    ILeft = (0x33, "LEFT", Instr),
    ILoop = (0x34, "LOOP", Instr),
    ILsl = (0x35, "LSL", Instr),
    ILsr = (0x36, "LSR", Instr),
    ILt = (0x37, "LT", Instr),
    IMap = (0x38, "MAP", Instr),
    IMem = (0x39, "MEM", Instr),
    IMul = (0x3A, "MUL", Instr),
    INeg = (0x3B, "NEG", Instr),
    INeq = (0x3C, "NEQ", Instr),
    INil = (0x3D, "NIL", Instr),
    INone = (0x3E, "NONE", Instr),
    INot = (0x3F, "NOT", Instr),
    INow = (0x40, "NOW", Instr),
    IOr = (0x41, "OR", Instr),
    IPair = (0x42, "PAIR", Instr),
    IPush = (0x43, "PUSH", Instr),
    IRight = (0x44, "RIGHT", Instr),
    ISize = (0x45, "SIZE", Instr),
    ISome = (0x46, "SOME", Instr),
    ISource = (0x47, "SOURCE", Instr),
    ISender = (0x48, "SENDER", Instr),
    ISelf = (0x49, "SELF", Instr),
    IStepsToQuota = (0x4A, "STEPS_TO_QUOTA", Instr),
    ISub = (0x4B, "SUB", Instr),
    ISwap = (0x4C, "SWAP", Instr),
    ITransferTokens = (0x4D, "TRANSFER_TOKENS", Instr),
    ISetDelegate = (0x4E, "SET_DELEGATE", Instr),
    IUnit = (0x4F, "UNIT", Instr),
    IUpdate = (0x50, "UPDATE", Instr),
    IXor = (0x51, "XOR", Instr),
    IIter = (0x52, "ITER", Instr),
    ILoopLeft = (0x53, "LOOP_LEFT", Instr),
    IAddress = (0x54, "ADDRESS", Instr),
    IContract = (0x55, "CONTRACT", Instr),
    IIsnat = (0x56, "ISNAT", Instr),
    ICast = (0x57, "CAST", Instr),
    IRename = (0x58, "RENAME", Instr),
    /// `bool` type
    TBool = (0x59, "bool", Type),
    /// `contract` type
    TContract = (0x5A, "contract", Type),
    /// `int` type
    TInt = (0x5B, "int", Type),
    /// `key` type
    TKey = (0x5C, "key", Type),
    /// `key_hash` type
    TKeyHash = (0x5D, "key_hash", Type),
    /// `lambda` type
    TLambda = (0x5E, "lambda", Type),
    /// `list` type
    TList = (0x5F, "list", Type),
    /// `map` type
    TMap = (0x60, "map", Type),
    /// `big_map` type
    TBigMap = (0x61, "big_map", Type),
    /// `nat` type
    TNat = (0x62, "nat", Type),
    /// `option` type
    TOption = (0x63, "option", Type),
    /// `or` type
    TOr = (0x64, "or", Type),
    /// `pair` type
    TPair = (0x65, "pair", Type),
    /// `set` type
    TSet = (0x66, "set", Type),
    /// `signature` type
    TSignature = (0x67, "signature", Type),
    /// `string` type
    TString = (0x68, "string", Type),
    /// `bytes` type
    TBytes = (0x69, "bytes", Type),
    /// `mutez` type
    TMutez = (0x6A, "mutez", Type),
    /// `timestamp` type
    TTimestamp = (0x6B, "timestamp", Type),
    /// `unit` type
    TUnit = (0x6C, "unit", Type),
    /// `operation` type
    TOperation = (0x6D, "operation", Type),
    /// `address` type
    TAddress = (0x6E, "address", Type),
    ISlice = (0x6F, "SLICE", Instr),
    IDig = (0x70, "DIG", Instr),
    IDug = (0x71, "DUG", Instr),
    IEmptyBigMap = (0x72, "EMPTY_BIG_MAP", Instr),
    IApply = (0x73, "APPLY", Instr),
    /// `chain_id` type
    TChainId = (0x74, "chain_id", Type),
    IChainId = (0x75, "CHAIN_ID", Instr),
    ILevel = (0x76, "LEVEL", Instr),
    ISelfAddress = (0x77, "SELF_ADDRESS", Instr),
    /// `never` type
    TNever = (0x78, "never", Type),
    INever = (0x79, "NEVER", Instr),
    IUnpair = (0x7A, "UNPAIR", Instr),
    IVotingPower = (0x7B, "VOTING_POWER", Instr),
    ITotalVotingPower = (0x7C, "TOTAL_VOTING_POWER", Instr),
    IKeccak = (0x7D, "KECCAK", Instr),
    ISha3 = (0x7E, "SHA3", Instr),
    IPairingCheck = (0x7F, "PAIRING_CHECK", Instr),
    /// `bls12_381_g1` type
    TBls12381G1 = (0x80, "bls12_381_g1", Type),
    /// `bls12_381_g2` type
    TBls12381G2 = (0x81, "bls12_381_g2", Type),
    /// `bls12_381_fr` type
    TBls12381Fr = (0x82, "bls12_381_fr", Type),
    /// `sapling_state` type
    TSaplingState = (0x83, "sapling_state", Type),
    /// `sapling_transaction_deprecated` type
    TSaplingTransactionDeprecated = (0x84, "sapling_transaction_deprecated", Type),
    ISaplingEmptyState = (0x85, "SAPLING_EMPTY_STATE", Instr),
    ISaplingVerifyUpdate = (0x86, "SAPLING_VERIFY_UPDATE", Instr),
    /// `ticket` type
    TTicket = (0x87, "ticket", Type),
    ITicketDeprecated = (0x88, "TICKET_DEPRECATED", Instr),
    IReadTicket = (0x89, "READ_TICKET", Instr),
    ISplitTicket = (0x8A, "SPLIT_TICKET", Instr),
    IJoinTickets = (0x8B, "JOIN_TICKETS", Instr),
    IGetAndUpdate = (0x8C, "GET_AND_UPDATE", Instr),
    /// `chest` type
    TChest = (0x8D, "chest", Type),
    /// `chest_key` type
    TChestKey = (0x8E, "chest_key", Type),
    IOpenChest = (0x8F, "OPEN_CHEST", Instr),
    IView = (0x90, "VIEW", Instr),
    /// `view` section
    KView = (0x91, "view", Keyword),
    /// `constant` section
    KConstant = (0x92, "constant", Keyword),
    ISubMutez = (0x93, "SUB_MUTEZ", Instr),
    /// `tx_rollup_l2_address` type
    TTxRollupL2Address = (0x94, "tx_rollup_l2_address", Type),
    IMinBlockTime = (0x95, "MIN_BLOCK_TIME", Instr),
    /// `sapling_transaction` type
    TSaplingTransaction = (0x96, "sapling_transaction", Type),
    IEmit = (0x97, "EMIT", Instr),
    /// Recursive lambda value
    LambdaRec = (0x98, "Lambda_rec", Data),
    ILambdaRec = (0x99, "LAMBDA_REC", Instr),
    ITicket = (0x9A, "TICKET", Instr),
    IBytes = (0x9B, "BYTES", Instr),
    INat = (0x9C, "NAT", Instr),
    /// Ticket value
    Ticket = (0x9D, "Ticket", Data),
}

impl OpCode {
    /// Whether this opcode names a type rather than a data constructor
    pub fn is_type(self) -> bool {
        self.class() == OpClass::Type
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Node kind of a value tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimKind {
    /// Integer literal
    Int,
    /// String literal
    String,
    /// Byte string literal
    Bytes,
    /// Sequence of children
    Seq,
    /// Opcode application
    App,
}

impl fmt::Display for PrimKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Int => "int",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::Seq => "sequence",
            Self::App => "application",
        };
        f.write_str(name)
    }
}

/// A node of the chain's value tree
///
/// Trees are immutable once constructed and compare structurally.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Prim {
    /// Integer literal of arbitrary precision
    Int(BigInt),
    /// String literal
    String(String),
    /// Byte string literal
    Bytes(Vec<u8>),
    /// Ordered sequence of children
    Seq(Vec<Prim>),
    /// Opcode applied to ordered children, with optional annotations
    App {
        /// Opcode tag
        op: OpCode,
        /// Children
        args: Vec<Prim>,
        /// Annotations such as `%from`
        annots: Vec<String>,
    },
}

impl Prim {
    /// Integer node
    pub fn int(value: impl Into<BigInt>) -> Self {
        Self::Int(value.into())
    }

    /// String node
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// Byte string node
    pub fn bytes(value: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(value.into())
    }

    /// Sequence node
    pub fn seq(children: Vec<Prim>) -> Self {
        Self::Seq(children)
    }

    /// Opcode application without annotations
    pub fn app(op: OpCode, args: Vec<Prim>) -> Self {
        Self::App {
            op,
            args,
            annots: Vec::new(),
        }
    }

    /// Binary pair node
    pub fn pair(left: Prim, right: Prim) -> Self {
        Self::app(OpCode::Pair, vec![left, right])
    }

    /// Map entry node
    pub fn elt(key: Prim, value: Prim) -> Self {
        Self::app(OpCode::Elt, vec![key, value])
    }

    /// Unit node
    pub fn unit() -> Self {
        Self::app(OpCode::Unit, Vec::new())
    }

    /// Boolean node
    pub fn bool(value: bool) -> Self {
        Self::app(if value { OpCode::True } else { OpCode::False }, Vec::new())
    }

    /// Node kind
    pub fn kind(&self) -> PrimKind {
        match self {
            Self::Int(_) => PrimKind::Int,
            Self::String(_) => PrimKind::String,
            Self::Bytes(_) => PrimKind::Bytes,
            Self::Seq(_) => PrimKind::Seq,
            Self::App { .. } => PrimKind::App,
        }
    }

    /// Opcode of an application node
    pub fn op(&self) -> Option<OpCode> {
        match self {
            Self::App { op, .. } => Some(*op),
            _ => None,
        }
    }

    /// Whether this node is an application of `op`
    pub fn is_op(&self, op: OpCode) -> bool {
        self.op() == Some(op)
    }

    /// Whether this node is a pair application
    pub fn is_pair(&self) -> bool {
        self.is_op(OpCode::Pair)
    }

    /// Children of a sequence or application node
    pub fn args(&self) -> &[Prim] {
        match self {
            Self::Seq(children) | Self::App { args: children, .. } => children,
            _ => &[],
        }
    }

    /// Annotations of an application node
    pub fn annots(&self) -> &[String] {
        match self {
            Self::App { annots, .. } => annots,
            _ => &[],
        }
    }

    /// Short description used in error messages, e.g. `Pair/2` or `int`
    pub fn describe(&self) -> String {
        match self {
            Self::App { op, args, .. } => format!("{}/{}", op, args.len()),
            other => other.kind().to_string(),
        }
    }

    /// Require an application of `op` with exactly `arity` children
    pub fn expect_app(&self, op: OpCode, arity: usize) -> Result<&[Prim]> {
        match self {
            Self::App { op: found, args, .. } if *found == op => {
                if args.len() == arity {
                    Ok(args)
                } else {
                    Err(BindError::MalformedShape(format!(
                        "{} expects {} argument(s), found {}",
                        op,
                        arity,
                        args.len()
                    )))
                }
            }
            other => Err(BindError::MalformedShape(format!(
                "expected {}, found {}",
                op,
                other.describe()
            ))),
        }
    }

    /// Rewrite wide pairs along the right spine into binary pairs
    ///
    /// `Pair a b c` becomes `Pair a (Pair b c)`. Left children are left
    /// untouched; their own decoders normalize them when needed.
    pub fn unfold_comb(&self) -> Prim {
        match self {
            Self::App {
                op: OpCode::Pair,
                args,
                annots,
            } if args.len() >= 2 => {
                let right = if args.len() == 2 {
                    args[1].unfold_comb()
                } else {
                    Prim::app(OpCode::Pair, args[1..].to_vec()).unfold_comb()
                };
                Self::App {
                    op: OpCode::Pair,
                    args: vec![args[0].clone(), right],
                    annots: annots.clone(),
                }
            }
            other => other.clone(),
        }
    }

    /// Collect the leaves of a right comb into a flat list
    ///
    /// The inverse of [`fold_right_comb`](crate::fold_right_comb) for trees
    /// with at least two leaves.
    pub fn flatten_comb(&self) -> Vec<Prim> {
        let mut out = Vec::new();
        let mut node = self.unfold_comb();
        loop {
            match node {
                Self::App {
                    op: OpCode::Pair,
                    mut args,
                    ..
                } if args.len() == 2 => {
                    let right = args.pop();
                    let left = args.pop();
                    out.extend(left);
                    match right {
                        Some(right) => node = right,
                        None => break,
                    }
                }
                leaf => {
                    out.push(leaf);
                    break;
                }
            }
        }
        out
    }

    /// Look up the node at a structural path of binary pair steps
    pub fn get_path(&self, path: &[Branch]) -> Result<&Prim> {
        let mut node = self;
        for (depth, step) in path.iter().enumerate() {
            match node {
                Self::App {
                    op: OpCode::Pair,
                    args,
                    ..
                } if args.len() == 2 => {
                    node = match step {
                        Branch::Left => &args[0],
                        Branch::Right => &args[1],
                    };
                }
                other => {
                    return Err(BindError::MalformedShape(format!(
                        "no binary pair at '{}', found {}",
                        render_path(&path[..depth]),
                        other.describe()
                    )))
                }
            }
        }
        Ok(node)
    }
}

impl fmt::Display for Prim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{}", v),
            Self::String(s) => write!(f, "{:?}", s),
            Self::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
            Self::Seq(children) => {
                f.write_str("{")?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    write!(f, "{}", child)?;
                }
                f.write_str("}")
            }
            Self::App { op, args, annots } => {
                let wrap = !args.is_empty() || !annots.is_empty();
                if wrap {
                    f.write_str("(")?;
                }
                write!(f, "{}", op)?;
                for annot in annots {
                    write!(f, " {}", annot)?;
                }
                for arg in args {
                    write!(f, " {}", arg)?;
                }
                if wrap {
                    f.write_str(")")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_tables_agree() {
        for op in [OpCode::Pair, OpCode::Elt, OpCode::TChainId, OpCode::TAddress] {
            assert_eq!(OpCode::from_byte(op.byte()), Some(op));
            assert_eq!(OpCode::from_name(op.name()), Some(op));
        }
        assert!(OpCode::TPair.is_type());
        assert!(!OpCode::Pair.is_type());
    }

    #[test]
    fn test_opcode_table_is_complete() {
        for byte in 0x00..=0x9Du8 {
            let op = OpCode::from_byte(byte).unwrap_or_else(|| panic!("no opcode 0x{:02x}", byte));
            assert_eq!(op.byte(), byte);
            assert_eq!(OpCode::from_name(op.name()), Some(op));
        }
        assert_eq!(OpCode::from_byte(0x9E), None);
        assert_eq!(OpCode::from_name("DROP"), Some(OpCode::IDrop));
        assert_eq!(OpCode::IDrop.class(), OpClass::Instr);
        assert_eq!(OpCode::KParameter.class(), OpClass::Keyword);
        assert_eq!(OpCode::LambdaRec.class(), OpClass::Data);
        assert!(OpCode::TTicket.is_type());
        assert!(!OpCode::ITicket.is_type());
    }

    #[test]
    fn test_unfold_wide_pair() {
        let wide = Prim::app(
            OpCode::Pair,
            vec![Prim::int(1), Prim::int(2), Prim::int(3)],
        );
        let expected = Prim::pair(Prim::int(1), Prim::pair(Prim::int(2), Prim::int(3)));
        assert_eq!(wide.unfold_comb(), expected);
        assert_eq!(
            wide.flatten_comb(),
            vec![Prim::int(1), Prim::int(2), Prim::int(3)]
        );
    }

    #[test]
    fn test_get_path() {
        let tree = Prim::pair(Prim::int(1), Prim::pair(Prim::int(2), Prim::int(3)));
        assert_eq!(tree.get_path(&[Branch::Right, Branch::Left]), Ok(&Prim::int(2)));
        assert_eq!(tree.get_path(&[]), Ok(&tree));
        assert!(matches!(
            tree.get_path(&[Branch::Left, Branch::Left]),
            Err(BindError::MalformedShape(_))
        ));
    }

    #[test]
    fn test_display() {
        let tree = Prim::pair(Prim::string("a"), Prim::bytes(vec![0xab]));
        assert_eq!(tree.to_string(), "(Pair \"a\" 0xab)");
        assert_eq!(Prim::unit().to_string(), "Unit");
    }
}

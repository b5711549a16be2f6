//! Canonical binary form of value trees
//!
//! Packing is what digests are computed over, so the layout here must match
//! the chain byte for byte:
//!
//! | tag  | node                                   |
//! |------|----------------------------------------|
//! | 0x00 | int (zarith)                           |
//! | 0x01 | string (u32 length + utf8)             |
//! | 0x02 | sequence (u32 length + children)       |
//! | 0x03 | app, 0 args, no annots                 |
//! | 0x04 | app, 0 args, annots                    |
//! | 0x05 | app, 1 arg, no annots                  |
//! | 0x06 | app, 1 arg, annots                     |
//! | 0x07 | app, 2 args, no annots                 |
//! | 0x08 | app, 2 args, annots                    |
//! | 0x09 | app, n args (u32 length), annots       |
//! | 0x0A | bytes (u32 length + raw)               |

use crate::prim::Prim;
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::Zero;

/// Prefix marking a packed data value
pub const PACK_PREFIX: u8 = 0x05;

/// Pack a tree: `0x05 ‖ binary(tree)`
pub fn pack(prim: &Prim) -> Vec<u8> {
    let mut out = vec![PACK_PREFIX];
    write_prim(&mut out, prim);
    out
}

/// Binary form of a tree without the pack prefix
pub fn to_binary(prim: &Prim) -> Vec<u8> {
    let mut out = Vec::new();
    write_prim(&mut out, prim);
    out
}

fn write_len_prefixed(out: &mut Vec<u8>, data: &[u8]) {
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(data);
}

fn write_prim(out: &mut Vec<u8>, prim: &Prim) {
    match prim {
        Prim::Int(value) => {
            out.push(0x00);
            write_zarith(out, value);
        }
        Prim::String(s) => {
            out.push(0x01);
            write_len_prefixed(out, s.as_bytes());
        }
        Prim::Bytes(b) => {
            out.push(0x0A);
            write_len_prefixed(out, b);
        }
        Prim::Seq(children) => {
            out.push(0x02);
            let mut body = Vec::new();
            for child in children {
                write_prim(&mut body, child);
            }
            write_len_prefixed(out, &body);
        }
        Prim::App { op, args, annots } => {
            let annotated = !annots.is_empty();
            let tag = match args.len() {
                0 => 0x03,
                1 => 0x05,
                2 => 0x07,
                _ => 0x09,
            };
            if args.len() > 2 {
                out.push(tag);
                out.push(op.byte());
                let mut body = Vec::new();
                for arg in args {
                    write_prim(&mut body, arg);
                }
                write_len_prefixed(out, &body);
                write_len_prefixed(out, annots.join(" ").as_bytes());
                return;
            }
            out.push(if annotated { tag + 1 } else { tag });
            out.push(op.byte());
            for arg in args {
                write_prim(out, arg);
            }
            if annotated {
                write_len_prefixed(out, annots.join(" ").as_bytes());
            }
        }
    }
}

/// Signed zarith: 6 payload bits and a sign bit in the first byte, 7 payload
/// bits in every following byte, high bit set while more bytes follow
fn write_zarith(out: &mut Vec<u8>, value: &BigInt) {
    let mut abs = value.magnitude().clone();
    let mut first = low_bits(&abs, 0x3f);
    if value.sign() == Sign::Minus {
        first |= 0x40;
    }
    abs >>= 6u32;
    if !abs.is_zero() {
        first |= 0x80;
    }
    out.push(first);
    while !abs.is_zero() {
        let mut byte = low_bits(&abs, 0x7f);
        abs >>= 7u32;
        if !abs.is_zero() {
            byte |= 0x80;
        }
        out.push(byte);
    }
}

fn low_bits(value: &BigUint, mask: u32) -> u8 {
    (value.iter_u32_digits().next().unwrap_or(0) & mask) as u8
}

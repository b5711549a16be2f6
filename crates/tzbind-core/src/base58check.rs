//! Base58check encoding with version prefixes
//!
//! Textual forms of addresses, keys, signatures and hashes are the base58
//! encoding of `prefix ‖ payload ‖ checksum`, where the checksum is the first
//! four bytes of a double SHA-256 over `prefix ‖ payload`.

use crate::error::{BindError, Result};
use base58::{FromBase58, ToBase58};
use sha2::{Digest, Sha256};

fn checksum(data: &[u8]) -> [u8; 4] {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut out = [0u8; 4];
    out.copy_from_slice(&second[..4]);
    out
}

/// Encode `payload` under a version `prefix`
pub(crate) fn encode(prefix: &[u8], payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(prefix.len() + payload.len() + 4);
    data.extend_from_slice(prefix);
    data.extend_from_slice(payload);
    let sum = checksum(&data);
    data.extend_from_slice(&sum);
    data.to_base58()
}

/// Decode a base58check string, returning `prefix ‖ payload` with the
/// checksum verified and removed
pub(crate) fn decode(text: &str) -> Result<Vec<u8>> {
    let mut data = text
        .from_base58()
        .map_err(|e| BindError::InvalidEncoding(format!("base58 '{}': {:?}", text, e)))?;
    if data.len() < 4 {
        return Err(BindError::InvalidEncoding(format!(
            "base58 '{}': too short",
            text
        )));
    }
    let split = data.len() - 4;
    if checksum(&data[..split]) != data[split..] {
        return Err(BindError::InvalidEncoding(format!(
            "base58 '{}': checksum mismatch",
            text
        )));
    }
    data.truncate(split);
    Ok(data)
}

/// Decode a base58check string whose prefix must be one of `prefixes`
///
/// Returns the index of the matching prefix and the payload. The payload
/// length must equal `len`.
pub(crate) fn decode_prefixed(
    text: &str,
    prefixes: &[&[u8]],
    len: usize,
) -> Result<(usize, Vec<u8>)> {
    let data = decode(text)?;
    for (index, prefix) in prefixes.iter().enumerate() {
        if data.len() == prefix.len() + len && data.starts_with(prefix) {
            return Ok((index, data[prefix.len()..].to_vec()));
        }
    }
    Err(BindError::InvalidEncoding(format!(
        "'{}' has an unknown prefix or wrong length",
        text
    )))
}

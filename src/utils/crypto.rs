//! Hashing and address formatting helpers
//!
//! Keccak-256 is the only digest the ledger uses, for addresses,
//! transaction hashes and personal-message hashes alike.

use crate::error::{AccountError, AccountResult};
use ethers_core::types::Address;
use tiny_keccak::{Hasher, Keccak};

/// Keccak256 hash
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut out = [0u8; 32];
    hasher.finalize(&mut out);
    out
}

/// Convert raw address bytes to an EIP-55 checksummed string
pub fn to_checksum_address(address: &[u8]) -> String {
    let lower = hex::encode(address);
    let hash = keccak256(lower.as_bytes());

    let mut result = String::from("0x");
    for (i, ch) in lower.chars().enumerate() {
        let byte = hash[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };

        if ch.is_ascii_digit() {
            result.push(ch);
        } else if nibble >= 8 {
            result.push(ch.to_ascii_uppercase());
        } else {
            result.push(ch);
        }
    }

    result
}

/// True when `text` is shaped like an address: `0x` followed by 40 hex digits.
pub fn is_address_literal(text: &str) -> bool {
    let Some(body) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) else {
        return false;
    };
    body.len() == 40 && body.chars().all(|c| c.is_ascii_hexdigit())
}

/// Parse a hex address.
///
/// All-lowercase and all-uppercase inputs are accepted as-is. Mixed case is
/// treated as EIP-55 and must carry a correct checksum.
pub fn parse_address(text: &str) -> AccountResult<Address> {
    let trimmed = text.trim();
    if !is_address_literal(trimmed) {
        return Err(AccountError::invalid_address(format!(
            "Expected 0x followed by 40 hex digits, got {:?}",
            trimmed
        )));
    }
    let body = &trimmed[2..];
    let bytes = hex::decode(body)?;

    let has_lower = body.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = body.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper && to_checksum_address(&bytes)[2..] != *body {
        return Err(AccountError::invalid_address(format!(
            "Checksum mismatch for {}",
            trimmed
        )));
    }

    Ok(Address::from_slice(&bytes))
}

/// Decode a hex string with or without the `0x` prefix
pub fn decode_hex(text: &str) -> AccountResult<Vec<u8>> {
    let body = text.trim().trim_start_matches("0x");
    Ok(hex::decode(body)?)
}

//! Private key intake
//!
//! Keys enter the crate as raw bytes. Text is only inspected far enough to
//! tell a caller who passed an address that they wanted a read-only account.

use crate::error::{AccountError, AccountResult};
use crate::utils::is_address_literal;
use std::fmt;
use zeroize::Zeroizing;

/// Length of a secp256k1 private key
pub const PRIVATE_KEY_LEN: usize = 32;

/// Candidate key material handed to an account constructor.
pub enum KeyMaterial<'a> {
    Bytes(&'a [u8]),
    Text(&'a str),
}

impl<'a> From<&'a [u8]> for KeyMaterial<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        KeyMaterial::Bytes(bytes)
    }
}

impl<'a> From<&'a [u8; 32]> for KeyMaterial<'a> {
    fn from(bytes: &'a [u8; 32]) -> Self {
        KeyMaterial::Bytes(bytes)
    }
}

impl<'a> From<&'a Vec<u8>> for KeyMaterial<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self {
        KeyMaterial::Bytes(bytes)
    }
}

impl<'a> From<&'a str> for KeyMaterial<'a> {
    fn from(text: &'a str) -> Self {
        KeyMaterial::Text(text)
    }
}

impl fmt::Debug for KeyMaterial<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyMaterial::Bytes(b) => write!(f, "KeyMaterial::Bytes([REDACTED; {}])", b.len()),
            KeyMaterial::Text(_) => f.write_str("KeyMaterial::Text([REDACTED])"),
        }
    }
}

/// Validate key material and copy it into zeroize-on-drop storage.
///
/// Checks run in order: address-shaped text, any other text, length.
/// Scalar range is checked later, when the public key is derived.
pub fn validate_private_key(material: KeyMaterial<'_>) -> AccountResult<Zeroizing<[u8; 32]>> {
    let bytes = match material {
        KeyMaterial::Text(text) if is_address_literal(text.trim()) => {
            return Err(AccountError::wrong_account_type(
                "This constructor makes signable accounts; use AccountIdentity for an address",
            ));
        }
        KeyMaterial::Text(_) => {
            return Err(AccountError::invalid_private_key(
                "Private key must be supplied as raw bytes",
            ));
        }
        KeyMaterial::Bytes(bytes) => bytes,
    };

    if bytes.len() != PRIVATE_KEY_LEN {
        return Err(AccountError::invalid_private_key(format!(
            "Private keys must be 32 bytes in length, got {}",
            bytes.len()
        )));
    }

    let mut key = Zeroizing::new([0u8; 32]);
    key.copy_from_slice(bytes);
    Ok(key)
}

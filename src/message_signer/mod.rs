//! Message Signing Module
//!
//! EIP-191 personal messages: the payload is prefixed with
//! `"\x19Ethereum Signed Message:\n"` and its decimal byte length, hashed,
//! and signed with `v = 27 + recovery_id`.

mod personal;

pub use personal::{
    personal_message_hash, recover_message_signer, sign_personal_message, verify_personal_message,
    ETH_MESSAGE_PREFIX,
};

use crate::error::{AccountError, AccountResult};

/// A signed personal message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSignature {
    /// Digest of the prefixed message
    pub message_hash: [u8; 32],
    /// 27 or 28, plus any extra offset requested at signing time
    pub v: u64,
    pub r: [u8; 32],
    pub s: [u8; 32],
    /// `0x` ‖ r ‖ s ‖ v in hex, v padded to at least two digits
    pub signature: String,
}

impl MessageSignature {
    pub fn new(message_hash: [u8; 32], v: u64, r: [u8; 32], s: [u8; 32]) -> Self {
        Self {
            message_hash,
            v,
            r,
            s,
            signature: compact_signature(&r, &s, v),
        }
    }
}

/// Format r, s and v as a compact hex signature
pub fn compact_signature(r: &[u8; 32], s: &[u8; 32], v: u64) -> String {
    format!("0x{}{}{:02x}", hex::encode(r), hex::encode(s), v)
}

/// A signature presented for verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureInput {
    /// Compact hex form produced by [`compact_signature`]
    Compact(String),
    Parts { v: u64, r: [u8; 32], s: [u8; 32] },
}

impl SignatureInput {
    /// Split into `v` and the 64-byte r ‖ s.
    pub fn components(&self) -> AccountResult<(u64, [u8; 64])> {
        match self {
            SignatureInput::Parts { v, r, s } => {
                let mut rs = [0u8; 64];
                rs[..32].copy_from_slice(r);
                rs[32..].copy_from_slice(s);
                Ok((*v, rs))
            }
            SignatureInput::Compact(text) => parse_compact(text),
        }
    }
}

impl From<&MessageSignature> for SignatureInput {
    fn from(sig: &MessageSignature) -> Self {
        SignatureInput::Parts {
            v: sig.v,
            r: sig.r,
            s: sig.s,
        }
    }
}

impl From<&str> for SignatureInput {
    fn from(text: &str) -> Self {
        SignatureInput::Compact(text.to_string())
    }
}

fn parse_compact(text: &str) -> AccountResult<(u64, [u8; 64])> {
    let body = text.trim().trim_start_matches("0x");
    // r and s take 128 hex digits, v at least two and at most sixteen
    if !body.is_ascii() || body.len() < 130 || body.len() > 144 {
        return Err(AccountError::invalid_signature(format!(
            "Compact signature must be 130 to 144 hex digits, got {}",
            body.len()
        )));
    }

    let mut rs = [0u8; 64];
    hex::decode_to_slice(&body[..128], &mut rs)
        .map_err(|e| AccountError::invalid_signature(format!("Invalid signature hex: {}", e)))?;
    let v = u64::from_str_radix(&body[128..], 16)
        .map_err(|e| AccountError::invalid_signature(format!("Invalid v: {}", e)))?;
    Ok((v, rs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_compact_pads_v() {
        let sig = compact_signature(&[0u8; 32], &[0u8; 32], 0x1c);
        assert!(sig.ends_with("1c"));
        assert_eq!(sig.len(), 2 + 130);

        let small = compact_signature(&[0u8; 32], &[0u8; 32], 5);
        assert!(small.ends_with("05"));

        let wide = compact_signature(&[0u8; 32], &[0u8; 32], 0x125);
        assert!(wide.ends_with("125"));
        assert_eq!(wide.len(), 2 + 131);
    }

    #[test]
    fn test_compact_round_trips_through_input() {
        let sig = MessageSignature::new([9u8; 32], 28, [1u8; 32], [2u8; 32]);
        let (v, rs) = SignatureInput::Compact(sig.signature.clone()).components().unwrap();
        assert_eq!(v, 28);
        assert_eq!(&rs[..32], &[1u8; 32]);
        assert_eq!(&rs[32..], &[2u8; 32]);
        assert_eq!(SignatureInput::from(&sig).components().unwrap(), (v, rs));
    }

    #[test]
    fn test_malformed_compact_is_error() {
        let short = SignatureInput::from("0x1234");
        assert_eq!(short.components().unwrap_err().code, ErrorCode::InvalidSignature);

        let not_hex = SignatureInput::Compact(format!("0x{}1b", "zz".repeat(64)));
        assert!(not_hex.components().is_err());

        let non_ascii = SignatureInput::Compact("é".repeat(70));
        assert!(non_ascii.components().is_err());
    }
}

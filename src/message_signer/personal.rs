//! Ethereum Personal Message Signing (EIP-191)
//!
//! Reference: https://eips.ethereum.org/EIPS/eip-191

use super::{MessageSignature, SignatureInput};
use crate::account::address_from_public_key;
use crate::crypto::EcContext;
use crate::error::{AccountError, AccountResult};
use crate::utils::keccak256;
use ethers_core::types::Address;

/// Prefix for personal_sign
pub const ETH_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// Offset added to the recovery id in a message signature
const MESSAGE_V_BASE: u64 = 27;

/// Hash a message with the personal-sign prefix and its decimal length
pub fn personal_message_hash(message: &[u8]) -> [u8; 32] {
    let prefix = format!("{}{}", ETH_MESSAGE_PREFIX, message.len());
    let mut data = Vec::with_capacity(prefix.len() + message.len());
    data.extend_from_slice(prefix.as_bytes());
    data.extend_from_slice(message);
    keccak256(&data)
}

/// Sign `message`; the returned `v` is `27 + recovery_id + extra_v`.
pub fn sign_personal_message(
    ctx: &EcContext,
    private_key: &[u8; 32],
    message: &[u8],
    extra_v: u64,
) -> AccountResult<MessageSignature> {
    let hash = personal_message_hash(message);
    let parts = ctx
        .sign_recoverable(private_key, &hash)
        .map_err(|e| AccountError::signing_failed(e.message))?;

    let v = MESSAGE_V_BASE
        .checked_add(extra_v)
        .and_then(|base| base.checked_add(u64::from(parts.recovery_id)))
        .ok_or_else(|| AccountError::signing_failed(format!("v offset {} overflows", extra_v)))?;

    Ok(MessageSignature::new(hash, v, parts.r(), parts.s()))
}

/// Recovery id for `v`, or None when `v` cannot carry one
fn recovery_id(v: u64, extra_v: u64) -> Option<u8> {
    let base = MESSAGE_V_BASE.checked_add(extra_v)?;
    match v.checked_sub(base)? {
        id @ 0..=3 => Some(id as u8),
        _ => None,
    }
}

/// Check `signature` over `message` against an uncompressed public key.
///
/// Returns `Ok(false)` for a different signer, an out-of-range `v`, or a
/// signature that recovers no key. Malformed encodings are errors.
pub fn verify_personal_message(
    ctx: &EcContext,
    public_key: &[u8; 65],
    message: &[u8],
    signature: &SignatureInput,
    extra_v: u64,
) -> AccountResult<bool> {
    let (v, rs) = signature.components()?;
    let Some(id) = recovery_id(v, extra_v) else {
        return Ok(false);
    };

    let hash = personal_message_hash(message);
    match ctx.recover_public_key(&rs, id, &hash) {
        Ok(recovered) => Ok(recovered == *public_key),
        Err(_) => Ok(false),
    }
}

/// Recover the address that signed `message`
pub fn recover_message_signer(
    ctx: &EcContext,
    message: &[u8],
    signature: &SignatureInput,
    extra_v: u64,
) -> AccountResult<Address> {
    let (v, rs) = signature.components()?;
    let id = recovery_id(v, extra_v)
        .ok_or_else(|| AccountError::invalid_signature(format!("v value {} is out of range", v)))?;

    let public_key = ctx.recover_public_key(&rs, id, &personal_message_hash(message))?;
    Ok(address_from_public_key(&public_key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::to_checksum_address;

    const KEY: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    fn key() -> [u8; 32] {
        let mut key = [0u8; 32];
        hex::decode_to_slice(KEY, &mut key).unwrap();
        key
    }

    #[test]
    fn test_personal_message_hash() {
        assert_eq!(
            hex::encode(personal_message_hash(b"Some data")),
            "1da44b586eb0729ff70a73c326926f6ed5a25f5b056e7f47fbc6e58d86871655"
        );
    }

    #[test]
    fn test_reference_signature() {
        let ctx = EcContext::new();
        let sig = sign_personal_message(&ctx, &key(), b"Some data", 0).unwrap();

        assert_eq!(sig.v, 28);
        assert_eq!(
            sig.signature,
            "0xb91467e570a6466aa9e9876cbcd013baba02900b8979d43fe208a4a4f339f5fd6007e74cd82e037b800186422fc2da167c747ef045e5d18a5f5d4300f8e1a0291c"
        );
    }

    #[test]
    fn test_verify_and_recover() {
        let ctx = EcContext::new();
        let public_key = ctx.derive_public_key(&key()).unwrap();

        for message in [&b"Some data"[..], &b""[..]] {
            let sig = sign_personal_message(&ctx, &key(), message, 0).unwrap();
            let input = SignatureInput::Compact(sig.signature.clone());
            assert!(verify_personal_message(&ctx, &public_key, message, &input, 0).unwrap());

            let signer = recover_message_signer(&ctx, message, &input, 0).unwrap();
            assert_eq!(
                to_checksum_address(signer.as_bytes()),
                "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23"
            );
        }
    }

    #[test]
    fn test_other_key_does_not_verify() {
        let ctx = EcContext::new();
        let other = ctx.derive_public_key(&[7u8; 32]).unwrap();
        let sig = sign_personal_message(&ctx, &key(), b"hello", 0).unwrap();
        assert!(!verify_personal_message(&ctx, &other, b"hello", &(&sig).into(), 0).unwrap());
    }

    #[test]
    fn test_extra_offset() {
        let ctx = EcContext::new();
        let public_key = ctx.derive_public_key(&key()).unwrap();
        let sig = sign_personal_message(&ctx, &key(), b"offset", 100).unwrap();
        assert!(sig.v == 127 || sig.v == 128);

        let input = SignatureInput::from(&sig);
        assert!(verify_personal_message(&ctx, &public_key, b"offset", &input, 100).unwrap());
        // without the offset the v value is out of range
        assert!(!verify_personal_message(&ctx, &public_key, b"offset", &input, 0).unwrap());
    }

    #[test]
    fn test_out_of_range_v_is_not_verified() {
        let ctx = EcContext::new();
        let public_key = ctx.derive_public_key(&key()).unwrap();
        let input = SignatureInput::Parts {
            v: 5,
            r: [1u8; 32],
            s: [1u8; 32],
        };
        assert!(!verify_personal_message(&ctx, &public_key, b"x", &input, 0).unwrap());
        assert!(recover_message_signer(&ctx, b"x", &input, 0).is_err());
    }

    #[test]
    fn test_tampered_message_is_not_verified() {
        let ctx = EcContext::new();
        let public_key = ctx.derive_public_key(&key()).unwrap();
        let sig = sign_personal_message(&ctx, &key(), b"original", 0).unwrap();
        let input = SignatureInput::from(&sig);
        assert!(!verify_personal_message(&ctx, &public_key, b"tampered", &input, 0).unwrap());
    }
}

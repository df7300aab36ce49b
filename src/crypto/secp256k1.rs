//! secp256k1 context handle
//!
//! The curve context is created once at start-up and handed to every
//! account constructor. Nothing in the crate builds its own context, so an
//! account can never exist before the primitive is ready.

use crate::error::{AccountError, AccountResult};
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{All, Message, PublicKey, Secp256k1, SecretKey};
use std::fmt;
use std::sync::Arc;

/// Length of an uncompressed public key (0x04 marker + X + Y)
pub const UNCOMPRESSED_PUBLIC_KEY_LEN: usize = 65;
/// Length of a compressed public key (0x02/0x03 marker + X)
pub const COMPRESSED_PUBLIC_KEY_LEN: usize = 33;

/// Shared handle to an initialized secp256k1 context.
#[derive(Clone)]
pub struct EcContext {
    secp: Arc<Secp256k1<All>>,
}

/// Output of [`EcContext::sign_recoverable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoverableParts {
    /// 0 or 1 for signatures produced by this crate
    pub recovery_id: u8,
    /// r ‖ s, big-endian
    pub signature: [u8; 64],
}

impl RecoverableParts {
    pub fn r(&self) -> [u8; 32] {
        let mut r = [0u8; 32];
        r.copy_from_slice(&self.signature[..32]);
        r
    }

    pub fn s(&self) -> [u8; 32] {
        let mut s = [0u8; 32];
        s.copy_from_slice(&self.signature[32..]);
        s
    }
}

impl EcContext {
    /// Build a context with blinding randomized from the OS RNG.
    pub fn new() -> Self {
        let mut secp = Secp256k1::new();
        secp.randomize(&mut secp256k1::rand::thread_rng());
        Self {
            secp: Arc::new(secp),
        }
    }

    /// Derive the 65-byte uncompressed public key for a private key
    pub fn derive_public_key(&self, private_key: &[u8; 32]) -> AccountResult<[u8; 65]> {
        let sk = secret_key(private_key)?;
        Ok(PublicKey::from_secret_key(&self.secp, &sk).serialize_uncompressed())
    }

    /// Expand a 33-byte compressed key to its 65-byte form
    pub fn decompress_public_key(&self, compressed: &[u8]) -> AccountResult<[u8; 65]> {
        if compressed.len() != COMPRESSED_PUBLIC_KEY_LEN {
            return Err(AccountError::invalid_public_key(format!(
                "Compressed public key must be 33 bytes, got {}",
                compressed.len()
            )));
        }
        let pk = PublicKey::from_slice(compressed)
            .map_err(|e| AccountError::invalid_public_key(e.to_string()))?;
        Ok(pk.serialize_uncompressed())
    }

    /// Accept either public key encoding and return the uncompressed form.
    pub fn normalize_public_key(&self, public_key: &[u8]) -> AccountResult<[u8; 65]> {
        match public_key.len() {
            COMPRESSED_PUBLIC_KEY_LEN => self.decompress_public_key(public_key),
            UNCOMPRESSED_PUBLIC_KEY_LEN => {
                let pk = PublicKey::from_slice(public_key)
                    .map_err(|e| AccountError::invalid_public_key(e.to_string()))?;
                Ok(pk.serialize_uncompressed())
            }
            other => Err(AccountError::invalid_public_key(format!(
                "Invalid public key length {}, expected 33 or 65 bytes",
                other
            ))),
        }
    }

    /// Sign a 32-byte digest, returning the compact signature and recovery id
    pub fn sign_recoverable(
        &self,
        private_key: &[u8; 32],
        digest: &[u8; 32],
    ) -> AccountResult<RecoverableParts> {
        let sk = secret_key(private_key)?;
        let msg = Message::from_digest(*digest);
        let (recovery_id, signature) = self
            .secp
            .sign_ecdsa_recoverable(&msg, &sk)
            .serialize_compact();

        Ok(RecoverableParts {
            recovery_id: recovery_id.to_i32() as u8,
            signature,
        })
    }

    /// Recover the uncompressed public key that produced `signature` over `digest`
    pub fn recover_public_key(
        &self,
        signature: &[u8; 64],
        recovery_id: u8,
        digest: &[u8; 32],
    ) -> AccountResult<[u8; 65]> {
        let rec_id = RecoveryId::from_i32(recovery_id as i32)
            .map_err(|e| AccountError::invalid_signature(format!("Invalid recovery id: {}", e)))?;
        let sig = RecoverableSignature::from_compact(signature, rec_id)
            .map_err(|e| AccountError::invalid_signature(e.to_string()))?;
        let msg = Message::from_digest(*digest);

        let pk = self
            .secp
            .recover_ecdsa(&msg, &sig)
            .map_err(|e| AccountError::crypto_error(format!("Recovery failed: {}", e)))?;
        Ok(pk.serialize_uncompressed())
    }
}

impl Default for EcContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EcContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EcContext(secp256k1)")
    }
}

fn secret_key(private_key: &[u8; 32]) -> AccountResult<SecretKey> {
    SecretKey::from_slice(private_key)
        .map_err(|e| AccountError::invalid_private_key(e.to_string()))
}

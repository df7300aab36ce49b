//! Replay-protected transaction signing

use super::codec::{decode_raw_transaction, encode_signed, encode_unprotected, encode_unsigned};
use super::ResolvedTransaction;
use crate::account::address_from_public_key;
use crate::crypto::EcContext;
use crate::error::{AccountError, AccountResult};
use crate::utils::keccak256;
use ethers_core::types::{Address, H256};

/// Signature fields of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionSignature {
    /// Keccak-256 of the unsigned payload
    pub message_hash: [u8; 32],
    /// `chain_id * 2 + 35 + recovery_id`
    pub v: u64,
    pub r: [u8; 32],
    pub s: [u8; 32],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub signature: TransactionSignature,
    pub raw_transaction: Vec<u8>,
    /// Keccak-256 of `raw_transaction`, the id nodes report
    pub hash: H256,
}

impl SignedTransaction {
    pub fn raw_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.raw_transaction))
    }
}

/// EIP-155 `v` for a chain id and recovery id
pub fn replay_protected_v(chain_id: u64, recovery_id: u8) -> AccountResult<u64> {
    chain_id
        .checked_mul(2)
        .and_then(|v| v.checked_add(35 + u64::from(recovery_id)))
        .ok_or_else(|| {
            AccountError::invalid_transaction(format!(
                "Chain id {} is too large for a u64 v",
                chain_id
            ))
        })
}

/// Sign a resolved transaction with `private_key`.
pub fn sign_resolved(
    ctx: &EcContext,
    private_key: &[u8; 32],
    tx: &ResolvedTransaction,
) -> AccountResult<SignedTransaction> {
    let message_hash = keccak256(&encode_unsigned(tx));
    let parts = ctx
        .sign_recoverable(private_key, &message_hash)
        .map_err(|e| AccountError::signing_failed(e.message))?;

    let v = replay_protected_v(tx.chain_id, parts.recovery_id)?;
    let r = parts.r();
    let s = parts.s();
    let raw_transaction = encode_signed(tx, v, &r, &s);
    let hash = H256::from(keccak256(&raw_transaction));

    Ok(SignedTransaction {
        signature: TransactionSignature {
            message_hash,
            v,
            r,
            s,
        },
        raw_transaction,
        hash,
    })
}

/// Recover the sender of a signed legacy transaction.
///
/// Handles both EIP-155 `v` values and the unprotected 27/28 form.
pub fn recover_transaction_signer(ctx: &EcContext, raw: &[u8]) -> AccountResult<Address> {
    let decoded = decode_raw_transaction(raw)?;
    let recovery_id = decoded
        .recovery_id()
        .ok_or_else(|| {
            AccountError::invalid_signature(format!("Unsupported v value {}", decoded.v))
        })?;

    let tx = ResolvedTransaction {
        nonce: decoded.nonce,
        gas_price: decoded.gas_price,
        gas_limit: decoded.gas_limit,
        to: decoded.to,
        value: decoded.value,
        data: decoded.data.clone(),
        chain_id: decoded.chain_id().unwrap_or_default(),
    };
    let payload = match decoded.chain_id() {
        Some(_) => encode_unsigned(&tx),
        None => encode_unprotected(&tx),
    };

    let mut signature = [0u8; 64];
    signature[..32].copy_from_slice(&decoded.r);
    signature[32..].copy_from_slice(&decoded.s);

    let public_key = ctx.recover_public_key(&signature, recovery_id, &keccak256(&payload))?;
    Ok(address_from_public_key(&public_key))
}

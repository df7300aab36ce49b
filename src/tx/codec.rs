//! RLP encoding of legacy transactions
//!
//! The signing payload is the nine-item list
//! `[nonce, gasPrice, gasLimit, to, value, data, chainId, "", ""]`; the raw
//! transaction replaces the last three items with `v`, `r` and `s`. Integers
//! are big-endian with no leading zero bytes, so zero encodes as the empty
//! string.

use super::ResolvedTransaction;
use crate::error::{AccountError, AccountResult};
use ethers_core::types::{Address, U256};
use rlp::{Rlp, RlpStream};
use thiserror::Error;

/// Number of items in a legacy transaction list
pub const LEGACY_FIELD_COUNT: usize = 9;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("transaction is not an RLP list")]
    NotAList,

    #[error("expected {expected} list items, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("destination must be empty or 20 bytes, got {0} bytes")]
    Destination(usize),

    #[error("destination must be a byte string, found a list")]
    DestinationIsList,

    #[error("{0} trailing bytes after the transaction list")]
    TrailingBytes(usize),

    #[error(transparent)]
    Rlp(#[from] rlp::DecoderError),
}

impl From<CodecError> for AccountError {
    fn from(e: CodecError) -> Self {
        AccountError::decode_error(e.to_string())
    }
}

/// A legacy transaction decoded from its raw bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedTransaction {
    pub nonce: u64,
    pub gas_price: U256,
    pub gas_limit: u64,
    pub to: Option<Address>,
    pub value: U256,
    pub data: Vec<u8>,
    pub v: u64,
    /// Left-padded to 32 bytes
    pub r: [u8; 32],
    pub s: [u8; 32],
}

impl DecodedTransaction {
    /// Chain id folded into `v`, or None for a pre-replay-protection signature
    pub fn chain_id(&self) -> Option<u64> {
        if self.v >= 35 {
            Some((self.v - 35) / 2)
        } else {
            None
        }
    }

    /// Recovery id implied by `v`, if `v` is well formed
    pub fn recovery_id(&self) -> Option<u8> {
        match self.v {
            27 | 28 => Some((self.v - 27) as u8),
            v if v >= 35 => Some(((v - 35) % 2) as u8),
            _ => None,
        }
    }
}

fn append_body(stream: &mut RlpStream, tx: &ResolvedTransaction) {
    stream.append(&tx.nonce);
    stream.append(&tx.gas_price);
    stream.append(&tx.gas_limit);
    match tx.to {
        Some(ref to) => stream.append(to),
        None => stream.append_empty_data(),
    };
    stream.append(&tx.value);
    stream.append(&tx.data);
}

/// Payload hashed for an EIP-155 signature
pub fn encode_unsigned(tx: &ResolvedTransaction) -> Vec<u8> {
    let mut stream = RlpStream::new_list(LEGACY_FIELD_COUNT);
    append_body(&mut stream, tx);
    stream.append(&tx.chain_id);
    stream.append_empty_data();
    stream.append_empty_data();
    stream.out().to_vec()
}

/// Six-item payload hashed for a signature without replay protection
pub fn encode_unprotected(tx: &ResolvedTransaction) -> Vec<u8> {
    let mut stream = RlpStream::new_list(6);
    append_body(&mut stream, tx);
    stream.out().to_vec()
}

/// Raw transaction bytes with the signature attached
pub fn encode_signed(tx: &ResolvedTransaction, v: u64, r: &[u8; 32], s: &[u8; 32]) -> Vec<u8> {
    let mut stream = RlpStream::new_list(LEGACY_FIELD_COUNT);
    append_body(&mut stream, tx);
    stream.append(&v);
    stream.append(&U256::from_big_endian(r));
    stream.append(&U256::from_big_endian(s));
    stream.out().to_vec()
}

fn decode(raw: &[u8]) -> Result<DecodedTransaction, CodecError> {
    let rlp = Rlp::new(raw);
    if !rlp.is_list() {
        return Err(CodecError::NotAList);
    }
    let total = rlp.payload_info()?.total();
    if total != raw.len() {
        return Err(CodecError::TrailingBytes(raw.len().saturating_sub(total)));
    }
    let found = rlp.item_count()?;
    if found != LEGACY_FIELD_COUNT {
        return Err(CodecError::FieldCount {
            expected: LEGACY_FIELD_COUNT,
            found,
        });
    }

    let to_item = rlp.at(3)?;
    if to_item.is_list() {
        return Err(CodecError::DestinationIsList);
    }
    let to_bytes = to_item.data()?;
    let to = match to_bytes.len() {
        0 => None,
        20 => Some(Address::from_slice(to_bytes)),
        n => return Err(CodecError::Destination(n)),
    };

    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    rlp.val_at::<U256>(7)?.to_big_endian(&mut r);
    rlp.val_at::<U256>(8)?.to_big_endian(&mut s);

    Ok(DecodedTransaction {
        nonce: rlp.val_at(0)?,
        gas_price: rlp.val_at(1)?,
        gas_limit: rlp.val_at(2)?,
        to,
        value: rlp.val_at(4)?,
        data: rlp.val_at(5)?,
        v: rlp.val_at(6)?,
        r,
        s,
    })
}

/// Decode a signed legacy transaction.
pub fn decode_raw_transaction(raw: &[u8]) -> AccountResult<DecodedTransaction> {
    Ok(decode(raw)?)
}

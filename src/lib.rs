//! Signable Account Library
//!
//! Lets the holder of a secp256k1 private key act as an account on an
//! Ethereum-style ledger.
//!
//! # Architecture
//!
//! This crate provides:
//! - **account**: Address derivation, read-only identities and signable accounts
//! - **tx**: Legacy/EIP-155 transaction requests, RLP codec, signing, assembly
//! - **message_signer**: EIP-191 personal message signing and verification
//! - **network**: The `Connection` trait plus JSON-RPC, offline and mock connections
//! - **crypto**: The injected secp256k1 context
//! - **config**: Gas policy and RPC settings
//!
//! # Security
//!
//! Private keys are held in `zeroize` storage, cleared on drop, and never
//! printed by `Debug` or the logger.
//!
//! # Example
//!
//! ```rust,ignore
//! use signable_account::{EcContext, JsonRpcConnection, SignableAccount, TransactionRequest};
//!
//! let ctx = EcContext::new();
//! let conn = Arc::new(JsonRpcConnection::new(&config.rpc)?);
//! let mut account = SignableAccount::new(&ctx, conn, &private_key)?;
//! let sent = account
//!     .send_transaction(TransactionRequest::new().to(recipient).value(1_000u64))
//!     .await?;
//! println!("{:#x}", sent.hash);
//! ```

pub mod account;
pub mod config;
pub mod crypto;
pub mod error;
pub mod message_signer;
pub mod network;
pub mod tx;
pub mod utils;

pub use account::{address_from_public_key, AccountIdentity, KeyMaterial, SignableAccount};
pub use config::{RpcSettings, SignerConfig};
pub use crypto::EcContext;
pub use error::{AccountError, AccountResult, ErrorCategory, ErrorCode};
pub use message_signer::{MessageSignature, SignatureInput};
pub use network::{BlockRef, Connection, JsonRpcConnection, MockConnection, OfflineConnection};
pub use tx::{
    AccountHandle, ContractHandle, Destination, GasPolicy, ResolvedTransaction, SentTransaction,
    SignedTransaction, TransactionRequest,
};
pub use utils::{keccak256, parse_address, to_checksum_address};

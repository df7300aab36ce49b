//! Transaction Module
//!
//! Legacy transactions with EIP-155 replay protection:
//! - Requests and the resolution of their defaults
//! - RLP encoding and decoding
//! - Signing and sender recovery
//! - Gas-limit policy
//! - Network-assisted assembly and broadcast

mod assembly;
pub mod codec;
mod gas;
mod request;
mod signer;

pub use assembly::SentTransaction;
pub use codec::{decode_raw_transaction, CodecError, DecodedTransaction};
pub use gas::*;
pub use request::*;
pub use signer::*;

//! Accounts
//!
//! [`AccountIdentity`] is a read-only address bound to a connection.
//! [`SignableAccount`] adds a private key on top of it.

mod identity;
mod key;
mod signable;

pub use identity::AccountIdentity;
pub use key::{validate_private_key, KeyMaterial, PRIVATE_KEY_LEN};
pub use signable::SignableAccount;

use crate::utils::keccak256;
use ethers_core::types::Address;

/// Ledger address of an uncompressed public key.
///
/// The 0x04 marker is dropped before hashing; the address is the low
/// 20 bytes of the Keccak-256 digest.
pub fn address_from_public_key(public_key: &[u8; 65]) -> Address {
    let hash = keccak256(&public_key[1..]);
    Address::from_slice(&hash[12..])
}

//! Read-only account identity

use crate::error::AccountResult;
use crate::network::{BlockRef, Connection};
use crate::tx::AccountHandle;
use crate::utils::{parse_address, to_checksum_address};
use ethers_core::types::{Address, U256};
use std::fmt;
use std::sync::Arc;

/// An address on the ledger plus the connection used to query it.
///
/// Holds no key material. [`SignableAccount`](super::SignableAccount) wraps
/// one of these and exposes it through `Deref`.
pub struct AccountIdentity<C> {
    address: Address,
    connection: Arc<C>,
}

impl<C> AccountIdentity<C> {
    pub fn new(address: Address, connection: Arc<C>) -> Self {
        Self { address, connection }
    }

    /// Build from a hex address string, checking EIP-55 case when mixed.
    pub fn from_address_str(address: &str, connection: Arc<C>) -> AccountResult<Self> {
        Ok(Self::new(parse_address(address)?, connection))
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// EIP-55 checksummed form of [`address`](Self::address)
    pub fn checksum_address(&self) -> String {
        to_checksum_address(self.address.as_bytes())
    }

    pub fn connection(&self) -> &Arc<C> {
        &self.connection
    }

    /// A lightweight handle usable as a transaction destination
    pub fn handle(&self) -> AccountHandle {
        AccountHandle::new(self.address)
    }
}

impl<C: Connection> AccountIdentity<C> {
    pub async fn balance(&self, block: BlockRef) -> AccountResult<U256> {
        self.connection.balance(self.address, block).await
    }

    /// On-chain transaction count, i.e. the next nonce the node expects
    pub async fn transaction_count(&self) -> AccountResult<u64> {
        self.connection.transaction_count(self.address).await
    }
}

impl<C> Clone for AccountIdentity<C> {
    fn clone(&self) -> Self {
        Self {
            address: self.address,
            connection: Arc::clone(&self.connection),
        }
    }
}

impl<C> fmt::Debug for AccountIdentity<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountIdentity")
            .field("address", &self.checksum_address())
            .finish()
    }
}

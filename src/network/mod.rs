//! Network Module
//!
//! The ledger node is reached through the [`Connection`] trait. Accounts are
//! generic over it, so the JSON-RPC client, the offline stub and the test
//! mock all plug into the same assembly pipeline.

mod json_rpc;
mod mock;

pub use json_rpc::*;
pub use mock::*;

use crate::error::{AccountError, AccountResult};
use ethers_core::types::{Address, H256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Block selector for state queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockRef {
    #[default]
    Latest,
    Pending,
    Earliest,
    Number(u64),
}

impl BlockRef {
    /// JSON-RPC parameter form
    pub fn as_param(&self) -> String {
        match self {
            BlockRef::Latest => "latest".to_string(),
            BlockRef::Pending => "pending".to_string(),
            BlockRef::Earliest => "earliest".to_string(),
            BlockRef::Number(n) => format!("0x{:x}", n),
        }
    }
}

impl fmt::Display for BlockRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_param())
    }
}

/// Parameters for a gas estimate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasEstimateRequest {
    pub from: Address,
    /// None for contract creation
    pub to: Option<Address>,
    pub data: Vec<u8>,
    pub gas_price: U256,
    pub value: U256,
}

/// Capabilities the account needs from a ledger node.
///
/// Every method may fail with a transmission-category [`AccountError`];
/// the account propagates it unchanged. Timeouts belong to the implementor.
#[allow(async_fn_in_trait)]
pub trait Connection {
    /// Number of transactions sent from `address` (the next nonce)
    async fn transaction_count(&self, address: Address) -> AccountResult<u64>;

    /// Current gas price oracle value
    async fn gas_price(&self) -> AccountResult<U256>;

    /// Gas units the node expects the call to use
    async fn estimate_gas(&self, request: &GasEstimateRequest) -> AccountResult<u64>;

    /// Chain identifier used for replay protection
    async fn network_id(&self) -> AccountResult<u64>;

    /// Submit a signed transaction, returning its hash
    async fn send_raw_transaction(&self, raw: &[u8]) -> AccountResult<H256>;

    async fn balance(&self, address: Address, block: BlockRef) -> AccountResult<U256>;
}

/// A connection for signing-only use. Every call fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineConnection;

impl OfflineConnection {
    fn unavailable(what: &str) -> AccountError {
        AccountError::network_error(format!("No network connection configured ({})", what))
    }
}

impl Connection for OfflineConnection {
    async fn transaction_count(&self, _address: Address) -> AccountResult<u64> {
        Err(Self::unavailable("transaction_count"))
    }

    async fn gas_price(&self) -> AccountResult<U256> {
        Err(Self::unavailable("gas_price"))
    }

    async fn estimate_gas(&self, _request: &GasEstimateRequest) -> AccountResult<u64> {
        Err(Self::unavailable("estimate_gas"))
    }

    async fn network_id(&self) -> AccountResult<u64> {
        Err(Self::unavailable("network_id"))
    }

    async fn send_raw_transaction(&self, _raw: &[u8]) -> AccountResult<H256> {
        Err(Self::unavailable("send_raw_transaction"))
    }

    async fn balance(&self, _address: Address, _block: BlockRef) -> AccountResult<U256> {
        Err(Self::unavailable("balance"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;

    #[test]
    fn test_block_ref_params() {
        assert_eq!(BlockRef::Latest.as_param(), "latest");
        assert_eq!(BlockRef::Pending.as_param(), "pending");
        assert_eq!(BlockRef::Number(255).as_param(), "0xff");
    }

    #[tokio::test]
    async fn test_offline_connection_fails_as_transmission() {
        let conn = OfflineConnection;
        let err = conn.network_id().await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Transmission);
        assert!(err.message.contains("network_id"));
    }
}

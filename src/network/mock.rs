//! Scriptable in-memory connection

use super::{BlockRef, Connection, GasEstimateRequest};
use crate::error::{AccountError, AccountResult};
use crate::utils::keccak256;
use ethers_core::types::{Address, H256, U256};
use std::sync::Mutex;

#[derive(Debug)]
struct MockState {
    transaction_count: u64,
    gas_price: U256,
    gas_estimate: u64,
    network_id: u64,
    balance: U256,
    failing: Vec<&'static str>,
    calls: Vec<&'static str>,
    estimate_requests: Vec<GasEstimateRequest>,
    sent: Vec<Vec<u8>>,
}

/// A [`Connection`] that answers from fixed values and records every call.
///
/// Methods named with [`fail`](MockConnection::fail) return a network error
/// until [`recover`](MockConnection::recover) is called. Successful
/// broadcasts return the Keccak-256 hash of the raw bytes.
#[derive(Debug)]
pub struct MockConnection {
    state: Mutex<MockState>,
}

impl MockConnection {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                transaction_count: 0,
                gas_price: U256::from(1_000_000_000u64),
                gas_estimate: 21_000,
                network_id: 1,
                balance: U256::zero(),
                failing: Vec::new(),
                calls: Vec::new(),
                estimate_requests: Vec::new(),
                sent: Vec::new(),
            }),
        }
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut MockState) -> T) -> T {
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut state)
    }

    pub fn set_transaction_count(&self, count: u64) {
        self.with_state(|s| s.transaction_count = count);
    }

    pub fn set_gas_price(&self, price: U256) {
        self.with_state(|s| s.gas_price = price);
    }

    pub fn set_gas_estimate(&self, estimate: u64) {
        self.with_state(|s| s.gas_estimate = estimate);
    }

    pub fn set_network_id(&self, id: u64) {
        self.with_state(|s| s.network_id = id);
    }

    pub fn set_balance(&self, balance: U256) {
        self.with_state(|s| s.balance = balance);
    }

    /// Make `method` fail until [`recover`](Self::recover) is called
    pub fn fail(&self, method: &'static str) {
        self.with_state(|s| s.failing.push(method));
    }

    pub fn recover(&self) {
        self.with_state(|s| s.failing.clear());
    }

    /// Names of the methods called so far, in order
    pub fn calls(&self) -> Vec<&'static str> {
        self.with_state(|s| s.calls.clone())
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.with_state(|s| s.calls.iter().filter(|c| **c == method).count())
    }

    pub fn estimate_requests(&self) -> Vec<GasEstimateRequest> {
        self.with_state(|s| s.estimate_requests.clone())
    }

    /// Raw transactions accepted by `send_raw_transaction`
    pub fn sent_transactions(&self) -> Vec<Vec<u8>> {
        self.with_state(|s| s.sent.clone())
    }

    fn enter(&self, method: &'static str) -> AccountResult<()> {
        self.with_state(|s| {
            s.calls.push(method);
            if s.failing.contains(&method) {
                Err(AccountError::network_error(format!("mock {} failure", method)))
            } else {
                Ok(())
            }
        })
    }
}

impl Default for MockConnection {
    fn default() -> Self {
        Self::new()
    }
}

impl Connection for MockConnection {
    async fn transaction_count(&self, _address: Address) -> AccountResult<u64> {
        self.enter("transaction_count")?;
        Ok(self.with_state(|s| s.transaction_count))
    }

    async fn gas_price(&self) -> AccountResult<U256> {
        self.enter("gas_price")?;
        Ok(self.with_state(|s| s.gas_price))
    }

    async fn estimate_gas(&self, request: &GasEstimateRequest) -> AccountResult<u64> {
        self.enter("estimate_gas")?;
        Ok(self.with_state(|s| {
            s.estimate_requests.push(request.clone());
            s.gas_estimate
        }))
    }

    async fn network_id(&self) -> AccountResult<u64> {
        self.enter("network_id")?;
        Ok(self.with_state(|s| s.network_id))
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> AccountResult<H256> {
        self.enter("send_raw_transaction")?;
        self.with_state(|s| s.sent.push(raw.to_vec()));
        Ok(H256::from(keccak256(raw)))
    }

    async fn balance(&self, _address: Address, _block: BlockRef) -> AccountResult<U256> {
        self.enter("balance")?;
        Ok(self.with_state(|s| s.balance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_values_and_call_log() {
        let conn = MockConnection::new();
        conn.set_network_id(1337);
        conn.set_gas_price(U256::from(7u64));

        assert_eq!(conn.network_id().await.unwrap(), 1337);
        assert_eq!(conn.gas_price().await.unwrap(), U256::from(7u64));
        assert_eq!(conn.calls(), vec!["network_id", "gas_price"]);
    }

    #[tokio::test]
    async fn test_failure_switch() {
        let conn = MockConnection::new();
        conn.fail("send_raw_transaction");
        assert!(conn.send_raw_transaction(&[0xc0]).await.is_err());
        assert!(conn.sent_transactions().is_empty());

        conn.recover();
        let hash = conn.send_raw_transaction(&[0xc0]).await.unwrap();
        assert_eq!(hash, H256::from(keccak256(&[0xc0])));
        assert_eq!(conn.call_count("send_raw_transaction"), 2);
    }
}

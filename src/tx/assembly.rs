//! Transaction assembly
//!
//! Fills the gaps in a [`TransactionRequest`] from the network, signs the
//! result and broadcasts it. Resolution order is fixed: chain id, nonce,
//! gas price, destination, gas limit. The first failure aborts the send and
//! leaves the account untouched; the nonce counter only moves after the
//! node accepts the transaction.

use super::{sign_resolved, Destination, ResolvedTransaction, SignedTransaction, TransactionRequest};
use crate::account::SignableAccount;
use crate::error::AccountResult;
use crate::network::{Connection, GasEstimateRequest};
use crate::{log_debug, log_error, log_info};
use ethers_core::types::H256;

/// Result of a successful broadcast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentTransaction {
    /// Hash reported by the node
    pub hash: H256,
    pub nonce: u64,
    pub signed: SignedTransaction,
}

impl<C: Connection> SignableAccount<C> {
    /// Resolve, sign and broadcast `request`.
    ///
    /// Takes `&mut self`, so one account has at most one send in flight.
    /// Callers sharing an account across tasks must serialize access.
    pub async fn send_transaction(
        &mut self,
        request: TransactionRequest,
    ) -> AccountResult<SentTransaction> {
        if self.chain_id().is_none() {
            self.discover_chain_id().await?;
        }

        let nonce = match request.nonce {
            Some(nonce) => nonce,
            None => self.next_nonce().await?,
        };

        let gas_price = match request.gas_price {
            Some(price) => price,
            None => {
                let price = self.connection().gas_price().await?;
                log_debug!("assembly", "gas price resolved", gas_price = price);
                price
            }
        };

        let to = request.to.as_ref().map(Destination::address);
        let value = request.value.unwrap_or_default();
        let data = request.data.clone().unwrap_or_default();

        let gas_limit = match request.gas_limit {
            Some(limit) => limit,
            None => {
                let estimate = self
                    .connection()
                    .estimate_gas(&GasEstimateRequest {
                        from: self.address(),
                        to,
                        data: data.clone(),
                        gas_price,
                        value,
                    })
                    .await?;
                let limit = self.gas_policy().apply(estimate);
                log_debug!(
                    "assembly",
                    "gas limit resolved",
                    estimate = estimate,
                    gas_limit = limit,
                );
                limit
            }
        };

        let filled = TransactionRequest {
            nonce: Some(nonce),
            gas_price: Some(gas_price),
            gas_limit: Some(gas_limit),
            to: to.map(Destination::Address),
            value: Some(value),
            data: Some(data),
            chain_id: request.chain_id,
        };
        let resolved = ResolvedTransaction::resolve(&filled, self.chain_id())?;
        let signed = sign_resolved(self.ec_context(), self.secret(), &resolved)?;

        let hash = match self.connection().send_raw_transaction(&signed.raw_transaction).await {
            Ok(hash) => hash,
            Err(e) => {
                log_error!("assembly", "broadcast failed", nonce = nonce, error = e);
                return Err(e);
            }
        };

        self.commit_nonce(resolved.nonce);
        log_info!(
            "assembly",
            "transaction broadcast",
            tx_hash = format!("{:#x}", hash),
            nonce = resolved.nonce,
            chain_id = resolved.chain_id,
        );

        Ok(SentTransaction {
            hash,
            nonce: resolved.nonce,
            signed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::EcContext;
    use crate::error::{ErrorCategory, ErrorCode};
    use crate::network::MockConnection;
    use crate::tx::{decode_raw_transaction, AccountHandle, ContractHandle, GasPolicy};
    use ethers_core::types::{Address, U256};
    use std::sync::Arc;

    fn setup() -> (Arc<MockConnection>, SignableAccount<MockConnection>) {
        let conn = Arc::new(MockConnection::new());
        let account = SignableAccount::new(&EcContext::new(), conn.clone(), &[0x46u8; 32]).unwrap();
        (conn, account)
    }

    fn transfer() -> TransactionRequest {
        TransactionRequest::new()
            .to(Address::repeat_byte(0x35))
            .value(1_000u64)
    }

    fn gas_limit_of(sent: &SentTransaction) -> u64 {
        decode_raw_transaction(&sent.signed.raw_transaction).unwrap().gas_limit
    }

    #[tokio::test]
    async fn test_fills_every_field_in_order() {
        let (conn, mut account) = setup();
        conn.set_network_id(5);
        conn.set_transaction_count(3);
        conn.set_gas_price(U256::from(7u64));

        let sent = account.send_transaction(transfer()).await.unwrap();

        assert_eq!(
            conn.calls(),
            vec![
                "network_id",
                "transaction_count",
                "gas_price",
                "estimate_gas",
                "send_raw_transaction",
            ]
        );
        assert_eq!(sent.nonce, 3);
        assert_eq!(account.chain_id(), Some(5));
        assert_eq!(account.nonce(), Some(4));

        let decoded = decode_raw_transaction(&sent.signed.raw_transaction).unwrap();
        assert_eq!(decoded.nonce, 3);
        assert_eq!(decoded.gas_price, U256::from(7u64));
        assert_eq!(decoded.gas_limit, 21_000);
        assert_eq!(decoded.chain_id(), Some(5));
        assert_eq!(conn.sent_transactions(), vec![sent.signed.raw_transaction.clone()]);
    }

    #[tokio::test]
    async fn test_chain_id_queried_once() {
        let (conn, mut account) = setup();
        account.send_transaction(transfer()).await.unwrap();
        account.send_transaction(transfer()).await.unwrap();
        assert_eq!(conn.call_count("network_id"), 1);
    }

    #[tokio::test]
    async fn test_override_does_not_replace_cache() {
        let (conn, mut account) = setup();
        conn.set_network_id(1);

        let sent = account.send_transaction(transfer().chain_id(137)).await.unwrap();
        let v = sent.signed.signature.v;
        assert!(v == 309 || v == 310);
        assert_eq!(account.chain_id(), Some(1));

        let sent = account.send_transaction(transfer()).await.unwrap();
        assert!(sent.signed.signature.v == 37 || sent.signed.signature.v == 38);
    }

    #[tokio::test]
    async fn test_nonce_takes_the_larger_value() {
        let (conn, mut account) = setup();
        conn.set_transaction_count(2);
        account.set_nonce(6);

        let sent = account.send_transaction(transfer()).await.unwrap();
        assert_eq!(sent.nonce, 6);
        assert_eq!(account.nonce(), Some(7));

        conn.set_transaction_count(10);
        let sent = account.send_transaction(transfer()).await.unwrap();
        assert_eq!(sent.nonce, 10);
        assert_eq!(account.nonce(), Some(11));
    }

    #[tokio::test]
    async fn test_explicit_fields_skip_queries() {
        let (conn, mut account) = setup();
        account.set_chain_id(1);
        let request = transfer().nonce(0).gas_price(1u64).gas_limit(30_000);

        account.send_transaction(request).await.unwrap();
        assert_eq!(conn.calls(), vec!["send_raw_transaction"]);
        assert_eq!(account.nonce(), Some(1));
    }

    #[tokio::test]
    async fn test_gas_margin_policy() {
        let (conn, mut account) = setup();

        conn.set_gas_estimate(21_000);
        let sent = account.send_transaction(transfer()).await.unwrap();
        assert_eq!(gas_limit_of(&sent), 21_000);

        conn.set_gas_estimate(50_000);
        let sent = account.send_transaction(transfer()).await.unwrap();
        assert_eq!(gas_limit_of(&sent), 62_500);

        conn.set_gas_estimate(20_000_000);
        let sent = account.send_transaction(transfer()).await.unwrap();
        assert_eq!(gas_limit_of(&sent), 12_400_000);
    }

    #[tokio::test]
    async fn test_conservative_policy() {
        let (conn, account) = setup();
        let mut account = account.with_gas_policy(GasPolicy::conservative()).unwrap();
        conn.set_gas_estimate(50_000);

        let sent = account.send_transaction(transfer()).await.unwrap();
        assert_eq!(gas_limit_of(&sent), 75_000);
    }

    #[tokio::test]
    async fn test_broadcast_failure_keeps_nonce() {
        let (conn, mut account) = setup();
        conn.set_transaction_count(4);
        account.set_nonce(4);
        conn.fail("send_raw_transaction");

        let err = account.send_transaction(transfer()).await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Transmission);
        assert_eq!(account.nonce(), Some(4));

        conn.recover();
        let sent = account.send_transaction(transfer()).await.unwrap();
        assert_eq!(sent.nonce, 4);
        assert_eq!(account.nonce(), Some(5));
    }

    #[tokio::test]
    async fn test_resolution_failures_propagate_unchanged() {
        for method in ["network_id", "transaction_count", "gas_price", "estimate_gas"] {
            let (conn, mut account) = setup();
            conn.fail(method);

            let err = account.send_transaction(transfer()).await.unwrap_err();
            assert_eq!(err.code, ErrorCode::NetworkError);
            assert!(err.message.contains(method));
            assert_eq!(account.nonce(), None);
            assert!(conn.sent_transactions().is_empty());
        }
    }

    #[tokio::test]
    async fn test_handles_normalized_to_address() {
        let (conn, mut account) = setup();
        let target = Address::repeat_byte(0x77);

        let sent = account
            .send_transaction(TransactionRequest::new().to(AccountHandle::new(target)))
            .await
            .unwrap();
        let decoded = decode_raw_transaction(&sent.signed.raw_transaction).unwrap();
        assert_eq!(decoded.to, Some(target));

        let call = TransactionRequest::new()
            .to(ContractHandle::named(target, "Vault"))
            .data(vec![0xa9, 0x05, 0x9c, 0xbb]);
        account.send_transaction(call).await.unwrap();

        let estimates = conn.estimate_requests();
        assert_eq!(estimates.len(), 2);
        assert!(estimates.iter().all(|e| e.to == Some(target)));
        assert_eq!(estimates[0].from, account.address());
        assert_eq!(estimates[1].data, vec![0xa9, 0x05, 0x9c, 0xbb]);
    }

    #[tokio::test]
    async fn test_creation_without_data_rejected() {
        let (conn, mut account) = setup();
        let err = account.send_transaction(TransactionRequest::new()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingField);
        assert!(conn.sent_transactions().is_empty());
        assert_eq!(account.nonce(), None);
    }

    #[tokio::test]
    async fn test_contract_creation() {
        let (conn, mut account) = setup();
        conn.set_gas_estimate(100_000);
        let sent = account
            .send_transaction(TransactionRequest::new().data(vec![0x60, 0x80, 0x60, 0x40]))
            .await
            .unwrap();

        let decoded = decode_raw_transaction(&sent.signed.raw_transaction).unwrap();
        assert_eq!(decoded.to, None);
        assert_eq!(decoded.gas_limit, 125_000);
        assert_eq!(conn.estimate_requests()[0].to, None);
    }

    #[tokio::test]
    async fn test_hash_comes_from_node() {
        let (conn, mut account) = setup();
        let sent = account.send_transaction(transfer()).await.unwrap();
        assert_eq!(sent.hash, sent.signed.hash);
        assert_eq!(conn.call_count("send_raw_transaction"), 1);
    }
}

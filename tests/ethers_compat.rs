//! Cross-checks against ethers-signers' LocalWallet.

use ethers_core::types::transaction::eip2718::TypedTransaction;
use ethers_core::types::{Address, Signature, TransactionRequest as EthersRequest, U256};
use ethers_signers::{LocalWallet, Signer};
use signable_account::{
    EcContext, MockConnection, OfflineConnection, SignableAccount, TransactionRequest,
};
use std::str::FromStr;
use std::sync::Arc;

const KEY_HEX: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

fn key() -> Vec<u8> {
    hex::decode(KEY_HEX).unwrap()
}

fn wallet(chain_id: u64) -> LocalWallet {
    LocalWallet::from_str(KEY_HEX).unwrap().with_chain_id(chain_id)
}

fn offline_account() -> SignableAccount<OfflineConnection> {
    SignableAccount::new(&EcContext::new(), Arc::new(OfflineConnection), &key()).unwrap()
}

#[test]
fn addresses_agree() {
    let account = offline_account();
    assert_eq!(account.address(), wallet(1).address());
}

#[tokio::test]
async fn legacy_transactions_match_byte_for_byte() {
    let account = offline_account();
    let to = Address::from_str("0x70997970C51812dc3A010C7d01b50e0d17dc79C8").unwrap();

    let cases: Vec<(u64, u64, u64, Option<Address>, u64, Vec<u8>)> = vec![
        (0, 1, 21_000, Some(to), 0, Vec::new()),
        (7, 20_000_000_000, 60_000, Some(to), 1_000_000, vec![0xa9, 0x05, 0x9c, 0xbb, 0x00, 0x01]),
        (1, 3_000_000_000, 500_000, None, 0, vec![0x60, 0x80, 0x60, 0x40, 0x52]),
        (42, 1, 21_000, Some(to), 5, Vec::new()),
    ];

    for chain_id in [1u64, 5, 137, 31_337] {
        for (nonce, gas_price, gas_limit, dest, value, data) in &cases {
            let mut ours = TransactionRequest::new()
                .nonce(*nonce)
                .gas_price(*gas_price)
                .gas_limit(*gas_limit)
                .value(*value)
                .data(data.clone())
                .chain_id(chain_id);
            if let Some(dest) = dest {
                ours = ours.to(*dest);
            }
            let signed = account.sign_transaction(&ours).unwrap();

            let mut theirs = EthersRequest::new()
                .nonce(*nonce)
                .gas_price(*gas_price)
                .gas(*gas_limit)
                .value(*value)
                .data(data.clone())
                .chain_id(chain_id);
            if let Some(dest) = dest {
                theirs = theirs.to(*dest);
            }
            let typed: TypedTransaction = theirs.into();
            let signature = wallet(chain_id).sign_transaction(&typed).await.unwrap();
            let expected = typed.rlp_signed(&signature);

            assert_eq!(
                signed.raw_transaction,
                expected.to_vec(),
                "chain {} nonce {}",
                chain_id,
                nonce
            );
            assert_eq!(signed.signature.v, signature.v);
        }
    }
}

#[tokio::test]
async fn personal_messages_match() {
    let account = offline_account();

    for message in ["hello", "", "Some data"] {
        let ours = account.sign_message(message.as_bytes()).unwrap();
        let theirs = wallet(1).sign_message(message).await.unwrap();

        assert_eq!(U256::from_big_endian(&ours.r), theirs.r);
        assert_eq!(U256::from_big_endian(&ours.s), theirs.s);
        assert_eq!(ours.v, theirs.v);

        let as_ethers = Signature {
            r: U256::from_big_endian(&ours.r),
            s: U256::from_big_endian(&ours.s),
            v: ours.v,
        };
        assert_eq!(as_ethers.recover(message).unwrap(), account.address());
        assert!(account.verify_message(message.as_bytes(), &(&ours).into()).unwrap());
    }
}

#[tokio::test]
async fn broadcast_bytes_verify_with_ethers() {
    let conn = Arc::new(MockConnection::new());
    conn.set_network_id(31_337);
    conn.set_transaction_count(12);
    let mut account = SignableAccount::new(&EcContext::new(), conn.clone(), &key()).unwrap();

    let sent = account
        .send_transaction(
            TransactionRequest::new()
                .to(Address::repeat_byte(0x99))
                .value(U256::exp10(18)),
        )
        .await
        .unwrap();

    let raw = conn.sent_transactions().remove(0);
    let rlp = rlp::Rlp::new(&raw);
    let (decoded, signature) = EthersRequest::decode_signed_rlp(&rlp).unwrap();
    assert_eq!(decoded.nonce, Some(U256::from(12u64)));

    let typed: TypedTransaction = decoded.into();
    assert_eq!(signature.recover(typed.sighash()).unwrap(), account.address());
    assert_eq!(sent.nonce, 12);
}

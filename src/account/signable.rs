//! Signable account
//!
//! Composes an [`AccountIdentity`] with a private key. The address, public
//! key and key are fixed at construction. The nonce counter and chain id are
//! lazily filled caches; the network stays authoritative for both.

use super::address_from_public_key;
use super::identity::AccountIdentity;
use super::key::{validate_private_key, KeyMaterial};
use crate::crypto::{EcContext, RecoverableParts};
use crate::error::{AccountError, AccountResult};
use crate::message_signer::{self, MessageSignature, SignatureInput};
use crate::network::Connection;
use crate::tx::{
    sign_resolved, GasPolicy, ResolvedTransaction, SignedTransaction, TransactionRequest,
};
use crate::{log_debug, log_info};
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use zeroize::Zeroizing;

pub struct SignableAccount<C> {
    identity: AccountIdentity<C>,
    private_key: Zeroizing<[u8; 32]>,
    public_key: [u8; 65],
    ctx: EcContext,
    nonce: Option<u64>,
    chain_id: Option<u64>,
    gas_policy: GasPolicy,
}

impl<C> SignableAccount<C> {
    /// Create an account from a 32-byte private key, deriving its public key.
    pub fn new<'k>(
        ctx: &EcContext,
        connection: Arc<C>,
        private_key: impl Into<KeyMaterial<'k>>,
    ) -> AccountResult<Self> {
        let private_key = validate_private_key(private_key.into())?;
        let public_key = ctx.derive_public_key(&private_key)?;
        Ok(Self::assemble(ctx, connection, private_key, public_key))
    }

    /// Create an account when the public key is already known.
    ///
    /// Accepts the 33-byte compressed or 65-byte uncompressed encoding. The
    /// key must belong to `private_key`.
    pub fn with_public_key<'k>(
        ctx: &EcContext,
        connection: Arc<C>,
        private_key: impl Into<KeyMaterial<'k>>,
        public_key: &[u8],
    ) -> AccountResult<Self> {
        let private_key = validate_private_key(private_key.into())?;
        let public_key = ctx.normalize_public_key(public_key)?;
        if ctx.derive_public_key(&private_key)? != public_key {
            return Err(AccountError::invalid_public_key(
                "Public key does not belong to the private key",
            ));
        }
        Ok(Self::assemble(ctx, connection, private_key, public_key))
    }

    fn assemble(
        ctx: &EcContext,
        connection: Arc<C>,
        private_key: Zeroizing<[u8; 32]>,
        public_key: [u8; 65],
    ) -> Self {
        let address = address_from_public_key(&public_key);
        log_debug!("account", "signable account created", address = format!("{:#x}", address));

        Self {
            identity: AccountIdentity::new(address, connection),
            private_key,
            public_key,
            ctx: ctx.clone(),
            nonce: None,
            chain_id: None,
            gas_policy: GasPolicy::default(),
        }
    }

    /// Replace the gas-limit policy used by `send_transaction`.
    pub fn with_gas_policy(mut self, policy: GasPolicy) -> AccountResult<Self> {
        policy.validate()?;
        self.gas_policy = policy;
        Ok(self)
    }

    pub fn identity(&self) -> &AccountIdentity<C> {
        &self.identity
    }

    /// 65-byte uncompressed public key
    pub fn public_key(&self) -> &[u8; 65] {
        &self.public_key
    }

    /// Local nonce counter, if it has been populated
    pub fn nonce(&self) -> Option<u64> {
        self.nonce
    }

    /// Overwrite the local nonce counter.
    pub fn set_nonce(&mut self, nonce: u64) {
        self.nonce = Some(nonce);
    }

    /// Cached chain id used when a request carries no override
    pub fn chain_id(&self) -> Option<u64> {
        self.chain_id
    }

    pub fn set_chain_id(&mut self, chain_id: u64) {
        self.chain_id = Some(chain_id);
    }

    pub fn gas_policy(&self) -> &GasPolicy {
        &self.gas_policy
    }

    pub fn ec_context(&self) -> &EcContext {
        &self.ctx
    }

    pub(crate) fn secret(&self) -> &[u8; 32] {
        &self.private_key
    }

    /// Advance the local counter past a nonce the network accepted.
    pub(crate) fn commit_nonce(&mut self, used: u64) {
        let next = self.nonce.unwrap_or(0).max(used).saturating_add(1);
        self.nonce = Some(next);
    }

    /// Sign a 32-byte digest with the account key
    pub fn sign_digest(&self, digest: &[u8; 32]) -> AccountResult<RecoverableParts> {
        self.ctx.sign_recoverable(&self.private_key, digest)
    }

    /// Sign a fully specified request without touching the network.
    ///
    /// Nonce, gas price and gas limit must be present. The chain id comes
    /// from the request or from the cache. The nonce counter is not advanced.
    pub fn sign_transaction(
        &self,
        request: &TransactionRequest,
    ) -> AccountResult<SignedTransaction> {
        let resolved = ResolvedTransaction::resolve(request, self.chain_id)?;
        sign_resolved(&self.ctx, &self.private_key, &resolved)
    }

    /// Sign `data` as an EIP-191 personal message
    pub fn sign_message(&self, data: &[u8]) -> AccountResult<MessageSignature> {
        self.sign_message_with_offset(data, 0)
    }

    /// Sign a personal message, adding `extra_v` on top of the usual 27.
    pub fn sign_message_with_offset(
        &self,
        data: &[u8],
        extra_v: u64,
    ) -> AccountResult<MessageSignature> {
        message_signer::sign_personal_message(&self.ctx, &self.private_key, data, extra_v)
    }

    /// Check that `signature` over `data` was made by this account.
    ///
    /// A signature from another key, or one whose `v` cannot be a recovery
    /// id, yields `Ok(false)`. Malformed encodings are errors.
    pub fn verify_message(&self, data: &[u8], signature: &SignatureInput) -> AccountResult<bool> {
        self.verify_message_with_offset(data, signature, 0)
    }

    pub fn verify_message_with_offset(
        &self,
        data: &[u8],
        signature: &SignatureInput,
        extra_v: u64,
    ) -> AccountResult<bool> {
        message_signer::verify_personal_message(
            &self.ctx,
            &self.public_key,
            data,
            signature,
            extra_v,
        )
    }
}

impl<C: Connection> SignableAccount<C> {
    /// Ask the network for its chain id and cache it.
    pub async fn discover_chain_id(&mut self) -> AccountResult<u64> {
        let chain_id = self.identity.connection().network_id().await?;
        self.chain_id = Some(chain_id);
        log_info!("account", "chain id discovered", chain_id = chain_id);
        Ok(chain_id)
    }

    /// Re-query the on-chain nonce and merge it into the local counter.
    ///
    /// The counter never moves backwards.
    pub async fn update_nonce(&mut self) -> AccountResult<u64> {
        let nonce = self.next_nonce().await?;
        self.nonce = Some(nonce);
        Ok(nonce)
    }

    /// Larger of the on-chain count and the local counter. Does not mutate.
    pub(crate) async fn next_nonce(&self) -> AccountResult<u64> {
        let network = self.identity.transaction_count().await?;
        let merged = self.nonce.map_or(network, |local| local.max(network));
        log_debug!("account", "nonce resolved", network = network, nonce = merged);
        Ok(merged)
    }
}

impl<C> Deref for SignableAccount<C> {
    type Target = AccountIdentity<C>;

    fn deref(&self) -> &Self::Target {
        &self.identity
    }
}

impl<C> fmt::Debug for SignableAccount<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignableAccount")
            .field("address", &self.identity.checksum_address())
            .field("private_key", &"[REDACTED]")
            .field("nonce", &self.nonce)
            .field("chain_id", &self.chain_id)
            .finish()
    }
}

//! Transaction requests
//!
//! A [`TransactionRequest`] is what the caller hands in, with any field left
//! unset. [`ResolvedTransaction::resolve`] turns a request whose gaps have
//! been filled into the complete record the signer consumes.

use crate::error::{AccountError, AccountResult};
use crate::utils::parse_address;
use ethers_core::types::{Address, U256};

/// Reference to another account, used as a transaction destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountHandle {
    address: Address,
}

impl AccountHandle {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    pub fn address(&self) -> Address {
        self.address
    }
}

/// Reference to a deployed contract
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContractHandle {
    address: Address,
    name: Option<String>,
}

impl ContractHandle {
    pub fn new(address: Address) -> Self {
        Self { address, name: None }
    }

    pub fn named(address: Address, name: impl Into<String>) -> Self {
        Self {
            address,
            name: Some(name.into()),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Where a transaction is sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Address(Address),
    Account(AccountHandle),
    Contract(ContractHandle),
}

impl Destination {
    /// Parse a hex address string
    pub fn parse(text: &str) -> AccountResult<Self> {
        Ok(Destination::Address(parse_address(text)?))
    }

    pub fn address(&self) -> Address {
        match self {
            Destination::Address(address) => *address,
            Destination::Account(handle) => handle.address(),
            Destination::Contract(handle) => handle.address(),
        }
    }
}

impl From<Address> for Destination {
    fn from(address: Address) -> Self {
        Destination::Address(address)
    }
}

impl From<AccountHandle> for Destination {
    fn from(handle: AccountHandle) -> Self {
        Destination::Account(handle)
    }
}

impl From<ContractHandle> for Destination {
    fn from(handle: ContractHandle) -> Self {
        Destination::Contract(handle)
    }
}

/// Caller-supplied transaction fields, any of which may be left unset.
///
/// `chain_id` overrides the account's cached chain id for this request only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionRequest {
    pub nonce: Option<u64>,
    pub gas_price: Option<U256>,
    pub gas_limit: Option<u64>,
    pub to: Option<Destination>,
    pub value: Option<U256>,
    pub data: Option<Vec<u8>>,
    pub chain_id: Option<u64>,
}

impl TransactionRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    pub fn gas_price(mut self, gas_price: impl Into<U256>) -> Self {
        self.gas_price = Some(gas_price.into());
        self
    }

    pub fn gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }

    pub fn to(mut self, to: impl Into<Destination>) -> Self {
        self.to = Some(to.into());
        self
    }

    pub fn value(mut self, value: impl Into<U256>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn data(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }
}

/// A transaction with every field present, ready for signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTransaction {
    pub nonce: u64,
    pub gas_price: U256,
    pub gas_limit: u64,
    /// None for contract creation
    pub to: Option<Address>,
    pub value: U256,
    pub data: Vec<u8>,
    pub chain_id: u64,
}

impl ResolvedTransaction {
    /// Check a request and fill its defaults.
    ///
    /// `value` defaults to zero and `data` to empty. The chain id comes from
    /// the request, then from `cached_chain_id`. Contract creation (no
    /// destination) must carry init code.
    pub fn resolve(
        request: &TransactionRequest,
        cached_chain_id: Option<u64>,
    ) -> AccountResult<Self> {
        let nonce = request.nonce.ok_or_else(|| AccountError::missing_field("nonce"))?;

        let to = request.to.as_ref().map(Destination::address);
        let data = request.data.clone().unwrap_or_default();
        if to.is_none() && data.is_empty() {
            return Err(AccountError::missing_field("to")
                .with_details("a transaction without a destination must carry contract init code"));
        }

        let gas_price = request
            .gas_price
            .ok_or_else(|| AccountError::missing_field("gas_price"))?;
        let gas_limit = request
            .gas_limit
            .ok_or_else(|| AccountError::missing_field("gas_limit"))?;
        let chain_id = request
            .chain_id
            .or(cached_chain_id)
            .ok_or_else(AccountError::chain_id_unknown)?;

        Ok(Self {
            nonce,
            gas_price,
            gas_limit,
            to,
            value: request.value.unwrap_or_default(),
            data,
            chain_id,
        })
    }

    pub fn is_contract_creation(&self) -> bool {
        self.to.is_none()
    }
}

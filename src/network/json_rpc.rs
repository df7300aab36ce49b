//! JSON-RPC 2.0 connection over HTTP

use super::{BlockRef, Connection, GasEstimateRequest};
use crate::config::RpcSettings;
use crate::error::{AccountError, AccountResult};
use crate::{log_debug, log_warn};
use ethers_core::types::{Address, H256, U256};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: Value,
    id: u64,
}

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// [`Connection`] backed by a node's HTTP JSON-RPC endpoint.
#[derive(Debug)]
pub struct JsonRpcConnection {
    client: Client,
    url: String,
    nonce_block: BlockRef,
    next_id: AtomicU64,
}

impl JsonRpcConnection {
    pub fn new(settings: &RpcSettings) -> AccountResult<Self> {
        settings.validate()?;
        let timeout = Duration::from_secs(settings.timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| {
                AccountError::network_error(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            url: settings.url.clone(),
            nonce_block: settings.nonce_block,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> AccountResult<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        log_debug!("rpc", "request", method = method, id = id);

        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(&RpcRequest {
                jsonrpc: "2.0",
                method,
                params,
                id,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AccountError::network_error(format!(
                "RPC returned status {}",
                response.status()
            )));
        }

        let body: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| {
                AccountError::parse_error(format!("Failed to parse RPC response: {}", e))
            })?;

        if let Some(error) = body.error {
            log_warn!("rpc", "node returned an error", method = method, code = error.code);
            return Err(AccountError::rpc_error(error.code, error.message));
        }

        body.result
            .ok_or_else(|| AccountError::parse_error(format!("{} returned no result", method)))
    }
}

impl Connection for JsonRpcConnection {
    async fn transaction_count(&self, address: Address) -> AccountResult<u64> {
        let hex: String = self
            .call(
                "eth_getTransactionCount",
                json!([format!("{:#x}", address), self.nonce_block.as_param()]),
            )
            .await?;
        parse_quantity_u64(&hex)
    }

    async fn gas_price(&self) -> AccountResult<U256> {
        let hex: String = self.call("eth_gasPrice", json!([])).await?;
        parse_quantity_u256(&hex)
    }

    async fn estimate_gas(&self, request: &GasEstimateRequest) -> AccountResult<u64> {
        let hex: String = self
            .call("eth_estimateGas", json!([estimate_params(request)]))
            .await?;
        parse_quantity_u64(&hex)
    }

    async fn network_id(&self) -> AccountResult<u64> {
        let hex: String = self.call("eth_chainId", json!([])).await?;
        parse_quantity_u64(&hex)
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> AccountResult<H256> {
        let hex: String = self
            .call(
                "eth_sendRawTransaction",
                json!([format!("0x{}", hex::encode(raw))]),
            )
            .await
            .map_err(|e| match e.code {
                crate::error::ErrorCode::RpcError => {
                    let details = e.details.clone().unwrap_or_default();
                    AccountError::broadcast_failed(e.message).with_details(details)
                }
                _ => e,
            })?;
        parse_hash(&hex)
    }

    async fn balance(&self, address: Address, block: BlockRef) -> AccountResult<U256> {
        let hex: String = self
            .call(
                "eth_getBalance",
                json!([format!("{:#x}", address), block.as_param()]),
            )
            .await?;
        parse_quantity_u256(&hex)
    }
}

/// Call object for `eth_estimateGas`; `to` is omitted for contract creation
fn estimate_params(request: &GasEstimateRequest) -> Value {
    let mut params = json!({
        "from": format!("{:#x}", request.from),
        "data": format!("0x{}", hex::encode(&request.data)),
        "gasPrice": format!("{:#x}", request.gas_price),
        "value": format!("{:#x}", request.value),
    });
    if let (Some(to), Some(object)) = (request.to, params.as_object_mut()) {
        object.insert("to".to_string(), Value::String(format!("{:#x}", to)));
    }
    params
}

fn quantity_body(hex: &str) -> AccountResult<&str> {
    let body = hex
        .strip_prefix("0x")
        .ok_or_else(|| AccountError::parse_error(format!("Quantity {:?} lacks 0x prefix", hex)))?;
    if body.is_empty() {
        return Err(AccountError::parse_error("Empty quantity"));
    }
    Ok(body)
}

/// Parse a JSON-RPC hex quantity such as `0x5208`
pub fn parse_quantity_u64(hex: &str) -> AccountResult<u64> {
    let body = quantity_body(hex)?;
    u64::from_str_radix(body, 16)
        .map_err(|e| AccountError::parse_error(format!("Invalid quantity {:?}: {}", hex, e)))
}

pub fn parse_quantity_u256(hex: &str) -> AccountResult<U256> {
    let body = quantity_body(hex)?;
    U256::from_str_radix(body, 16)
        .map_err(|e| AccountError::parse_error(format!("Invalid quantity {:?}: {}", hex, e)))
}

fn parse_hash(hex: &str) -> AccountResult<H256> {
    let bytes = hex::decode(hex.trim_start_matches("0x"))
        .map_err(|e| AccountError::parse_error(format!("Invalid transaction hash: {}", e)))?;
    if bytes.len() != 32 {
        return Err(AccountError::parse_error(format!(
            "Transaction hash must be 32 bytes, got {}",
            bytes.len()
        )));
    }
    Ok(H256::from_slice(&bytes))
}

//! Signer configuration
//!
//! Loaded from JSON. Every field has a default, so an empty object is a
//! valid configuration:
//!
//! ```json
//! {
//!   "gas": { "margin_percent": 150, "ceiling": 7600000 },
//!   "rpc": { "url": "http://127.0.0.1:8545", "timeout_secs": 15, "nonce_block": "pending" }
//! }
//! ```

use crate::error::{AccountError, AccountResult};
use crate::network::BlockRef;
use crate::tx::GasPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";
pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 15;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignerConfig {
    pub gas: GasPolicy,
    pub rpc: RpcSettings,
}

/// JSON-RPC endpoint settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcSettings {
    pub url: String,
    /// Applied to connect and to the whole request
    pub timeout_secs: u64,
    /// Block tag used for `eth_getTransactionCount`
    pub nonce_block: BlockRef,
}

impl Default for RpcSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_RPC_URL.to_string(),
            timeout_secs: DEFAULT_RPC_TIMEOUT_SECS,
            nonce_block: BlockRef::Pending,
        }
    }
}

impl RpcSettings {
    pub fn validate(&self) -> AccountResult<()> {
        let parsed = url::Url::parse(&self.url)
            .map_err(|e| {
                AccountError::invalid_config(format!("Invalid RPC url {:?}: {}", self.url, e))
            })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AccountError::invalid_config(format!(
                "RPC url must use http or https, got {}",
                parsed.scheme()
            )));
        }
        if self.timeout_secs == 0 {
            return Err(AccountError::invalid_config("timeout_secs must be greater than zero"));
        }
        Ok(())
    }
}

impl SignerConfig {
    pub fn from_json_str(json: &str) -> AccountResult<Self> {
        let config: SignerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> AccountResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AccountError::invalid_config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> AccountResult<()> {
        self.gas.validate()?;
        self.rpc.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_empty_object_gives_defaults() {
        let config = SignerConfig::from_json_str("{}").unwrap();
        assert_eq!(config, SignerConfig::default());
        assert_eq!(config.gas.margin_percent, 125);
        assert_eq!(config.gas.ceiling, 12_400_000);
        assert_eq!(config.rpc.nonce_block, BlockRef::Pending);
    }

    #[test]
    fn test_partial_override() {
        let config = SignerConfig::from_json_str(
            r#"{"gas": {"margin_percent": 150}, "rpc": {"url": "https://rpc.example.org", "nonce_block": "latest"}}"#,
        )
        .unwrap();
        assert_eq!(config.gas.margin_percent, 150);
        assert_eq!(config.gas.ceiling, 12_400_000);
        assert_eq!(config.rpc.url, "https://rpc.example.org");
        assert_eq!(config.rpc.nonce_block, BlockRef::Latest);
        assert_eq!(config.rpc.timeout_secs, DEFAULT_RPC_TIMEOUT_SECS);
    }

    #[test]
    fn test_numbered_block() {
        let config =
            SignerConfig::from_json_str(r#"{"rpc": {"nonce_block": {"number": 100}}}"#).unwrap();
        assert_eq!(config.rpc.nonce_block, BlockRef::Number(100));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = SignerConfig::from_json_str(r#"{"gas": {"margin_percent": 110}}"#).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidConfig);

        let err = SignerConfig::from_json_str(r#"{"rpc": {"url": "ftp://node"}}"#).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidConfig);

        let err = SignerConfig::from_json_str(r#"{"rpc": {"timeout_secs": 0}}"#).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidConfig);

        let err = SignerConfig::from_json_str("{not json").unwrap_err();
        assert_eq!(err.code, ErrorCode::JsonError);
    }

    #[test]
    fn test_missing_file() {
        let err = SignerConfig::from_file("/nonexistent/signer.json").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidConfig);
    }
}

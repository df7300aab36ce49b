//! Unified error types for signable accounts
//!
//! All errors flow through this module so callers can branch on a
//! stable [`ErrorCode`] or on its coarser [`ErrorCategory`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Main error type for all account operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl AccountError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn category(&self) -> ErrorCategory {
        self.code.category()
    }

    // Convenience constructors
    pub fn wrong_account_type(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::WrongAccountType, msg)
    }

    pub fn invalid_private_key(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidPrivateKey, msg)
    }

    pub fn invalid_public_key(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidPublicKey, msg)
    }

    pub fn chain_id_unknown() -> Self {
        Self::new(
            ErrorCode::ChainIdUnknown,
            "The chain ID is unknown; call discover_chain_id() or set an explicit chain ID before signing",
        )
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidConfig, msg)
    }

    pub fn missing_field(field: &str) -> Self {
        Self::new(ErrorCode::MissingField, format!("{} isn't set", field))
    }

    pub fn invalid_transaction(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidTransaction, msg)
    }

    pub fn invalid_address(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidAddress, msg)
    }

    pub fn invalid_signature(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidSignature, msg)
    }

    pub fn network_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::NetworkError, msg)
    }

    pub fn broadcast_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::BroadcastFailed, msg)
    }

    pub fn rpc_error(code: i64, msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::RpcError, msg).with_details(format!("rpc code {}", code))
    }

    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ParseError, msg)
    }

    pub fn crypto_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::CryptoError, msg)
    }

    pub fn signing_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::SigningFailed, msg)
    }

    pub fn decode_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::DecodeError, msg)
    }
}

impl fmt::Display for AccountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for AccountError {}

/// Error codes for categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // Configuration errors
    WrongAccountType,
    InvalidPrivateKey,
    InvalidPublicKey,
    ChainIdUnknown,
    InvalidConfig,

    // Validation errors
    MissingField,
    InvalidTransaction,
    InvalidAddress,
    InvalidSignature,

    // Transmission errors
    NetworkError,
    Timeout,
    BroadcastFailed,
    RpcError,
    ParseError,

    // Crypto errors
    CryptoError,
    SigningFailed,

    // Codec errors
    DecodeError,
    HexError,
    JsonError,
}

/// Coarse grouping of [`ErrorCode`]s that decides how a caller reacts.
///
/// Configuration and validation errors are fatal to the call. Transmission
/// errors leave the account untouched, so the same request can be retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Configuration,
    Validation,
    Transmission,
    Crypto,
    Codec,
}

impl ErrorCode {
    pub fn category(self) -> ErrorCategory {
        match self {
            ErrorCode::WrongAccountType
            | ErrorCode::InvalidPrivateKey
            | ErrorCode::InvalidPublicKey
            | ErrorCode::ChainIdUnknown
            | ErrorCode::InvalidConfig => ErrorCategory::Configuration,
            ErrorCode::MissingField
            | ErrorCode::InvalidTransaction
            | ErrorCode::InvalidAddress
            | ErrorCode::InvalidSignature => ErrorCategory::Validation,
            ErrorCode::NetworkError
            | ErrorCode::Timeout
            | ErrorCode::BroadcastFailed
            | ErrorCode::RpcError
            | ErrorCode::ParseError => ErrorCategory::Transmission,
            ErrorCode::CryptoError | ErrorCode::SigningFailed => ErrorCategory::Crypto,
            ErrorCode::DecodeError | ErrorCode::HexError | ErrorCode::JsonError => {
                ErrorCategory::Codec
            }
        }
    }
}

/// Result type alias for account operations
pub type AccountResult<T> = Result<T, AccountError>;

// Conversions from common error types

impl From<serde_json::Error> for AccountError {
    fn from(e: serde_json::Error) -> Self {
        AccountError::new(ErrorCode::JsonError, e.to_string())
    }
}

impl From<hex::FromHexError> for AccountError {
    fn from(e: hex::FromHexError) -> Self {
        AccountError::new(ErrorCode::HexError, e.to_string())
    }
}

impl From<reqwest::Error> for AccountError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AccountError::new(ErrorCode::Timeout, "Request timed out")
        } else if e.is_connect() {
            AccountError::new(ErrorCode::NetworkError, "Connection failed")
        } else {
            AccountError::new(ErrorCode::NetworkError, e.to_string())
        }
    }
}

impl From<secp256k1::Error> for AccountError {
    fn from(e: secp256k1::Error) -> Self {
        AccountError::new(ErrorCode::CryptoError, format!("Secp256k1 error: {}", e))
    }
}

impl From<rlp::DecoderError> for AccountError {
    fn from(e: rlp::DecoderError) -> Self {
        AccountError::new(ErrorCode::DecodeError, format!("RLP error: {}", e))
    }
}

//! # signable-account CLI
//!
//! Derive addresses, sign and verify personal messages, sign transactions
//! offline, and send them through a JSON-RPC node. Results are printed to
//! stdout as JSON.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use ethers_core::types::U256;
use serde_json::json;
use signable_account::account::{validate_private_key, KeyMaterial};
use signable_account::message_signer::recover_message_signer;
use signable_account::tx::{decode_raw_transaction, recover_transaction_signer};
use signable_account::utils::{decode_hex, is_address_literal, logging};
use signable_account::{
    parse_address, to_checksum_address, BlockRef, Destination, EcContext, JsonRpcConnection,
    OfflineConnection, SignableAccount, SignatureInput, SignerConfig, TransactionRequest,
};
use std::path::PathBuf;
use std::sync::Arc;
use zeroize::Zeroizing;

/// Sign and send transactions for a secp256k1 key.
#[derive(Parser)]
#[command(name = "signable-account")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON configuration file (gas policy and RPC settings).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print debug logs to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the address of a private key.
    Address {
        /// Private key as 64 hex digits.
        #[arg(long)]
        key: String,
    },

    /// Sign a personal message.
    SignMessage {
        #[arg(long)]
        key: String,

        #[arg(long)]
        message: String,

        /// Treat the message as hex-encoded bytes.
        #[arg(long)]
        hex: bool,

        /// Extra amount added to v.
        #[arg(long, default_value = "0")]
        v_offset: u64,
    },

    /// Check a personal-message signature against an address.
    VerifyMessage {
        #[arg(long)]
        address: String,

        #[arg(long)]
        message: String,

        /// Compact 0x-prefixed signature.
        #[arg(long)]
        signature: String,

        #[arg(long)]
        hex: bool,

        #[arg(long, default_value = "0")]
        v_offset: u64,
    },

    /// Sign a fully specified transaction without contacting a node.
    SignTx {
        #[arg(long)]
        key: String,

        #[command(flatten)]
        tx: TxArgs,
    },

    /// Fill missing fields from the node, sign and broadcast.
    Send {
        #[arg(long)]
        key: String,

        #[command(flatten)]
        tx: TxArgs,

        /// Overrides the configured RPC url.
        #[arg(long)]
        rpc_url: Option<String>,
    },

    /// Decode a raw transaction and recover its sender.
    DecodeTx {
        /// Raw transaction hex.
        #[arg(long)]
        raw: String,
    },

    /// Query an address balance.
    Balance {
        #[arg(long)]
        address: String,

        /// Block number; latest when omitted.
        #[arg(long)]
        block: Option<u64>,

        #[arg(long)]
        rpc_url: Option<String>,
    },
}

#[derive(clap::Args)]
struct TxArgs {
    /// Destination address; omit for contract creation.
    #[arg(long)]
    to: Option<String>,

    /// Value in wei.
    #[arg(long)]
    value: Option<String>,

    /// Call data or init code as hex.
    #[arg(long)]
    data: Option<String>,

    #[arg(long)]
    nonce: Option<u64>,

    /// Gas price in wei.
    #[arg(long)]
    gas_price: Option<String>,

    #[arg(long)]
    gas_limit: Option<u64>,

    #[arg(long)]
    chain_id: Option<u64>,
}

impl TxArgs {
    fn into_request(self) -> Result<TransactionRequest> {
        let mut request = TransactionRequest::new();
        request.nonce = self.nonce;
        request.gas_limit = self.gas_limit;
        request.chain_id = self.chain_id;
        if let Some(to) = self.to {
            request.to = Some(Destination::parse(&to)?);
        }
        if let Some(value) = self.value {
            request.value = Some(parse_wei(&value)?);
        }
        if let Some(price) = self.gas_price {
            request.gas_price = Some(parse_wei(&price)?);
        }
        if let Some(data) = self.data {
            request.data = Some(decode_hex(&data)?);
        }
        Ok(request)
    }
}

fn parse_wei(text: &str) -> Result<U256> {
    U256::from_dec_str(text.trim()).map_err(|e| anyhow!("invalid amount {:?}: {}", text, e))
}

fn parse_key(text: &str) -> Result<Zeroizing<Vec<u8>>> {
    if is_address_literal(text.trim()) {
        validate_private_key(KeyMaterial::Text(text))?;
    }
    let key = Zeroizing::new(decode_hex(text).context("private key must be hex")?);
    Ok(key)
}

fn message_bytes(message: &str, hex: bool) -> Result<Vec<u8>> {
    if hex {
        Ok(decode_hex(message)?)
    } else {
        Ok(message.as_bytes().to_vec())
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<SignerConfig> {
    match path {
        Some(path) => Ok(SignerConfig::from_file(path)?),
        None => Ok(SignerConfig::default()),
    }
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.verbose {
        logging::enable_debug();
    }
    let config = load_config(cli.config.as_ref())?;
    let ctx = EcContext::new();

    match cli.command {
        Commands::Address { key } => {
            let key = parse_key(&key)?;
            let account = SignableAccount::new(&ctx, Arc::new(OfflineConnection), &*key)?;
            print_json(&json!({
                "address": account.checksum_address(),
                "public_key": format!("0x{}", hex::encode(account.public_key())),
            }))
        }

        Commands::SignMessage {
            key,
            message,
            hex,
            v_offset,
        } => {
            let key = parse_key(&key)?;
            let account = SignableAccount::new(&ctx, Arc::new(OfflineConnection), &*key)?;
            let sig = account.sign_message_with_offset(&message_bytes(&message, hex)?, v_offset)?;
            print_json(&json!({
                "address": account.checksum_address(),
                "message_hash": format!("0x{}", hex::encode(sig.message_hash)),
                "v": sig.v,
                "r": format!("0x{}", hex::encode(sig.r)),
                "s": format!("0x{}", hex::encode(sig.s)),
                "signature": sig.signature,
            }))
        }

        Commands::VerifyMessage {
            address,
            message,
            signature,
            hex,
            v_offset,
        } => {
            let expected = parse_address(&address)?;
            let input = SignatureInput::Compact(signature);
            input.components()?;
            let message = message_bytes(&message, hex)?;
            let signer = recover_message_signer(&ctx, &message, &input, v_offset).ok();
            print_json(&json!({
                "valid": signer == Some(expected),
                "signer": signer.map(|s| to_checksum_address(s.as_bytes())),
            }))
        }

        Commands::SignTx { key, tx } => {
            let key = parse_key(&key)?;
            let account = SignableAccount::new(&ctx, Arc::new(OfflineConnection), &*key)?;
            let signed = account.sign_transaction(&tx.into_request()?)?;
            print_json(&json!({
                "from": account.checksum_address(),
                "hash": format!("{:#x}", signed.hash),
                "raw_transaction": signed.raw_hex(),
                "v": signed.signature.v,
                "r": format!("0x{}", hex::encode(signed.signature.r)),
                "s": format!("0x{}", hex::encode(signed.signature.s)),
            }))
        }

        Commands::Send { key, tx, rpc_url } => {
            let mut rpc = config.rpc.clone();
            if let Some(url) = rpc_url {
                rpc.url = url;
            }
            let key = parse_key(&key)?;
            let conn = Arc::new(JsonRpcConnection::new(&rpc)?);
            let mut account =
                SignableAccount::new(&ctx, conn, &*key)?.with_gas_policy(config.gas)?;
            let sent = account.send_transaction(tx.into_request()?).await?;
            print_json(&json!({
                "from": account.checksum_address(),
                "hash": format!("{:#x}", sent.hash),
                "nonce": sent.nonce,
                "raw_transaction": sent.signed.raw_hex(),
            }))
        }

        Commands::DecodeTx { raw } => {
            let raw = decode_hex(&raw)?;
            let decoded = decode_raw_transaction(&raw)?;
            let sender = recover_transaction_signer(&ctx, &raw)?;
            print_json(&json!({
                "from": to_checksum_address(sender.as_bytes()),
                "nonce": decoded.nonce,
                "gas_price": decoded.gas_price.to_string(),
                "gas_limit": decoded.gas_limit,
                "to": decoded.to.map(|to| to_checksum_address(to.as_bytes())),
                "value": decoded.value.to_string(),
                "data": format!("0x{}", hex::encode(&decoded.data)),
                "chain_id": decoded.chain_id(),
                "v": decoded.v,
            }))
        }

        Commands::Balance {
            address,
            block,
            rpc_url,
        } => {
            let mut rpc = config.rpc.clone();
            if let Some(url) = rpc_url {
                rpc.url = url;
            }
            let conn = Arc::new(JsonRpcConnection::new(&rpc)?);
            let identity = signable_account::AccountIdentity::from_address_str(&address, conn)?;
            let block = block.map_or(BlockRef::Latest, BlockRef::Number);
            let balance = identity.balance(block).await?;
            print_json(&json!({
                "address": identity.checksum_address(),
                "block": block.as_param(),
                "balance": balance.to_string(),
            }))
        }
    }
}

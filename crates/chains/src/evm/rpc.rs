//! EVM JSON-RPC client.
//!
//! Thin async wrapper over an `eth_*` endpoint, covering exactly the calls
//! the deployment flow needs: gas estimation and pricing, nonce lookup, raw
//! transaction submission, and receipt polling.

use std::time::Duration;

use common::QuizDropError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::EvmAddress;

/// A transaction hash as returned by the node (`0x` + 64 hex digits).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(pub String);

impl std::fmt::Display for TxHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Call parameters for `eth_estimateGas`.
#[derive(Debug, Clone, Serialize)]
pub struct CallRequest {
    pub from: String,
    pub to: String,
    /// Calldata as 0x-prefixed hex.
    pub data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Transaction receipt as returned by `eth_getTransactionReceipt`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: String,
    /// "0x1" on success, "0x0" on revert.
    pub status: String,
    #[serde(default)]
    pub contract_address: Option<String>,
    #[serde(default)]
    pub block_number: Option<String>,
    #[serde(default)]
    pub logs: Vec<LogEntry>,
}

impl TransactionReceipt {
    pub fn succeeded(&self) -> bool {
        parse_quantity(&self.status).map(|s| s == 1).unwrap_or(false)
    }
}

/// A log entry emitted during transaction execution.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub address: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub data: String,
}

/// Parse a 0x-prefixed hex quantity.
pub fn parse_quantity(s: &str) -> Result<u128, QuizDropError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    u128::from_str_radix(digits, 16)
        .map_err(|e| QuizDropError::Serialization(format!("invalid hex quantity {}: {}", s, e)))
}

/// Encode a quantity as 0x-prefixed hex, without leading zeros.
pub fn to_quantity(value: u128) -> String {
    format!("0x{:x}", value)
}

/// Async client for an EVM JSON-RPC endpoint.
#[derive(Debug)]
pub struct RpcClient {
    url: String,
    client: reqwest::Client,
}

impl RpcClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Make an RPC call.
    async fn call<T: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, QuizDropError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| QuizDropError::Rpc(format!("RPC request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(QuizDropError::Rpc(format!("RPC error {}: {}", status, body)));
        }

        let result: RpcResponse<T> = response.json().await.map_err(|e| {
            QuizDropError::Serialization(format!("Failed to parse RPC response: {}", e))
        })?;

        if let Some(error) = result.error {
            return Err(QuizDropError::Rpc(format!(
                "RPC error {}: {}",
                error.code, error.message
            )));
        }

        result
            .result
            .ok_or_else(|| QuizDropError::Rpc("RPC returned null result".to_string()))
    }

    /// Chain id reported by the node.
    pub async fn chain_id(&self) -> Result<u64, QuizDropError> {
        let raw: String = self.call("eth_chainId", vec![]).await?;
        Ok(parse_quantity(&raw)? as u64)
    }

    /// Current gas price in wei.
    pub async fn gas_price(&self) -> Result<u128, QuizDropError> {
        let raw: String = self.call("eth_gasPrice", vec![]).await?;
        parse_quantity(&raw)
    }

    /// Pending-inclusive nonce for an account.
    pub async fn transaction_count(&self, address: &EvmAddress) -> Result<u64, QuizDropError> {
        let raw: String = self
            .call(
                "eth_getTransactionCount",
                vec![json!(address.to_checksum()), json!("pending")],
            )
            .await?;
        Ok(parse_quantity(&raw)? as u64)
    }

    /// Estimate gas for a call.
    pub async fn estimate_gas(&self, request: &CallRequest) -> Result<u64, QuizDropError> {
        let raw: String = self
            .call("eth_estimateGas", vec![json!(request)])
            .await?;
        Ok(parse_quantity(&raw)? as u64)
    }

    /// Submit a signed transaction; returns its hash.
    pub async fn send_raw_transaction(&self, raw_tx: &[u8]) -> Result<TxHash, QuizDropError> {
        let hex_tx = format!("0x{}", hex::encode(raw_tx));
        self.call("eth_sendRawTransaction", vec![json!(hex_tx)]).await
    }

    /// Fetch a receipt; `None` while the transaction is unconfirmed.
    pub async fn transaction_receipt(
        &self,
        hash: &TxHash,
    ) -> Result<Option<TransactionReceipt>, QuizDropError> {
        self.call("eth_getTransactionReceipt", vec![json!(hash.0)])
            .await
    }

    /// Poll until the transaction is mined.
    ///
    /// Confirmation latency is unbounded and there is no cancellation; the
    /// caller decides how long it is willing to wait by dropping the future.
    pub async fn wait_for_receipt(
        &self,
        hash: &TxHash,
        poll_interval: Duration,
    ) -> Result<TransactionReceipt, QuizDropError> {
        loop {
            if let Some(receipt) = self.transaction_receipt(hash).await? {
                return Ok(receipt);
            }
            debug!("Transaction {} pending, polling again", hash);
            tokio::time::sleep(poll_interval).await;
        }
    }
}

// ============================================================================
// RPC Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

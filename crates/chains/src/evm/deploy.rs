//! Coin-deployment boundary.
//!
//! `CoinDeployer` is the seam the workflow drives; `CoinFactoryClient` is the
//! production implementation: it registers coin metadata with the deployment
//! service, encodes the factory call, prices it, signs it through a
//! `TransactionSigner`, submits it, and waits for the receipt.
//!
//! Failures are classified into `DeployErrorKind` here, at the boundary, so
//! downstream handling is an exhaustive match instead of string inspection.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use common::QuizDropError;
use serde_json::json;
use tracing::info;

use super::rpc::{CallRequest, RpcClient, TransactionReceipt, TxHash};
use super::signer::TransactionSigner;
use super::tx::TransactionRequest;
use super::{keccak256, EvmAddress};

/// Content URI used when a quiz has no description.
pub const FALLBACK_CONTENT_URI: &str =
    "ipfs://bafybeigoxzqzbnxsn35vq7lls3ljxdcwjafxvbvkivprsodzrptpiguysy";

/// Coin factory contract on Base.
pub const COIN_FACTORY: &str = "0x777777751622c0d3258f214F9DF38E35BF45baF3";

/// Fixed gas headroom applied to every deployment estimate.
pub const GAS_MULTIPLIER_PERCENT: u64 = 120;

/// Currency the coin trades against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeployCurrency {
    #[default]
    Zora,
    Eth,
}

impl DeployCurrency {
    /// Numeric encoding used in the factory call.
    pub fn code(&self) -> u8 {
        match self {
            DeployCurrency::Zora => 1,
            DeployCurrency::Eth => 2,
        }
    }
}

impl std::fmt::Display for DeployCurrency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeployCurrency::Zora => write!(f, "zora"),
            DeployCurrency::Eth => write!(f, "eth"),
        }
    }
}

impl std::str::FromStr for DeployCurrency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "zora" => Ok(DeployCurrency::Zora),
            "eth" | "ether" => Ok(DeployCurrency::Eth),
            _ => Err(format!("Unknown deploy currency: {}", s)),
        }
    }
}

/// Derive the coin's content URI from the quiz description.
///
/// Deterministic: identical descriptions always produce identical URIs, and
/// an absent or blank description falls back to the fixed resource.
pub fn content_uri(description: Option<&str>) -> String {
    match description {
        Some(text) if !text.trim().is_empty() => {
            format!("data:text/plain;base64,{}", BASE64.encode(text.as_bytes()))
        }
        _ => FALLBACK_CONTENT_URI.to_string(),
    }
}

/// Gas headroom policy applied to the node's estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasPolicy {
    pub multiplier_percent: u64,
}

impl Default for GasPolicy {
    fn default() -> Self {
        Self {
            multiplier_percent: GAS_MULTIPLIER_PERCENT,
        }
    }
}

impl GasPolicy {
    pub fn apply(&self, estimate: u64) -> u64 {
        estimate.saturating_mul(self.multiplier_percent) / 100
    }
}

/// A fully validated deployment request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinDeployment {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub payout_recipient: EvmAddress,
    pub chain_id: u64,
    pub currency: DeployCurrency,
}

/// Result of a successful deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentReceipt {
    pub coin_address: EvmAddress,
    pub tx_hash: TxHash,
    /// Account that deployed the coin.
    pub deployer: EvmAddress,
}

/// Failure categories surfaced by the deployment boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployErrorKind {
    InsufficientFunds,
    UserRejected,
    InvalidRecipient,
    InvalidCredential,
    MissingConfiguration,
    Other,
}

impl DeployErrorKind {
    /// Classify an error message from an external collaborator.
    ///
    /// The substring list is known to be incomplete; anything unmatched lands
    /// in `Other` and keeps its raw text.
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("insufficient funds") {
            DeployErrorKind::InsufficientFunds
        } else if lower.contains("user rejected")
            || lower.contains("user denied")
            || lower.contains("rejected the request")
        {
            DeployErrorKind::UserRejected
        } else if lower.contains("invalid payout recipient") || lower.contains("invalid recipient")
        {
            DeployErrorKind::InvalidRecipient
        } else if lower.contains("private key")
            || lower.contains("api key")
            || lower.contains("invalid credential")
            || lower.contains("unauthorized")
        {
            DeployErrorKind::InvalidCredential
        } else if lower.contains("missing required environment")
            || lower.contains("missing configuration")
        {
            DeployErrorKind::MissingConfiguration
        } else {
            DeployErrorKind::Other
        }
    }
}

/// Error returned by the deployment boundary.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct DeployError {
    pub kind: DeployErrorKind,
    pub message: String,
}

impl DeployError {
    pub fn new(kind: DeployErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Build from a raw message, classifying it by content.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: DeployErrorKind::classify(&message),
            message,
        }
    }
}

impl From<QuizDropError> for DeployError {
    fn from(err: QuizDropError) -> Self {
        DeployError::from_message(err.to_string())
    }
}

/// The deployment seam the workflow drives.
#[async_trait]
pub trait CoinDeployer: Send + Sync {
    /// Submit one deployment transaction and wait for its outcome.
    async fn submit_deployment(
        &self,
        deployment: &CoinDeployment,
        signer: &dyn TransactionSigner,
        gas: GasPolicy,
    ) -> Result<DeploymentReceipt, DeployError>;
}

/// Production deployment client.
///
/// The service credential is a constructor parameter; a client cannot exist
/// without one, so no call can run unauthenticated.
#[derive(Debug)]
pub struct CoinFactoryClient {
    api_key: String,
    api_base: String,
    factory: EvmAddress,
    rpc: RpcClient,
    http: reqwest::Client,
    poll_interval: Duration,
}

impl CoinFactoryClient {
    pub const DEFAULT_API_BASE: &'static str = "https://api.zora.co";

    pub fn new(api_key: impl Into<String>, rpc: RpcClient) -> Result<Self, DeployError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(DeployError::new(
                DeployErrorKind::InvalidCredential,
                "API key must not be empty",
            ));
        }

        let factory = COIN_FACTORY
            .parse()
            .map_err(|e: QuizDropError| DeployError::from_message(e.to_string()))?;

        Ok(Self {
            api_key,
            api_base: Self::DEFAULT_API_BASE.to_string(),
            factory,
            rpc,
            http: reqwest::Client::new(),
            poll_interval: Duration::from_secs(2),
        })
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_factory(mut self, factory: EvmAddress) -> Self {
        self.factory = factory;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Register the coin metadata with the deployment service.
    async fn register_metadata(&self, deployment: &CoinDeployment) -> Result<(), DeployError> {
        let url = format!("{}/coins/metadata", self.api_base);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "name": deployment.name,
                "symbol": deployment.symbol,
                "uri": deployment.uri,
                "chain_id": deployment.chain_id,
            }))
            .send()
            .await
            .map_err(|e| {
                DeployError::from_message(format!("Deployment service request failed: {}", e))
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(DeployError::new(
                DeployErrorKind::InvalidCredential,
                "Deployment service rejected the API key",
            ));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeployError::from_message(format!(
                "Deployment service error {}: {}",
                status, body
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl CoinDeployer for CoinFactoryClient {
    async fn submit_deployment(
        &self,
        deployment: &CoinDeployment,
        signer: &dyn TransactionSigner,
        gas: GasPolicy,
    ) -> Result<DeploymentReceipt, DeployError> {
        let deployer = signer.address();

        info!(
            "Registering coin metadata for {} ({})",
            deployment.name, deployment.symbol
        );
        self.register_metadata(deployment).await?;

        let data = encode_deploy_call(deployment);
        let call = CallRequest {
            from: deployer.to_checksum(),
            to: self.factory.to_checksum(),
            data: format!("0x{}", hex::encode(&data)),
            value: None,
        };

        let estimate = self.rpc.estimate_gas(&call).await.map_err(DeployError::from)?;
        let gas_limit = gas.apply(estimate);
        info!("Gas estimate {} -> limit {}", estimate, gas_limit);

        let nonce = self
            .rpc
            .transaction_count(&deployer)
            .await
            .map_err(DeployError::from)?;
        let gas_price = self.rpc.gas_price().await.map_err(DeployError::from)?;

        let tx = TransactionRequest {
            nonce,
            gas_price,
            gas_limit,
            to: Some(self.factory),
            value: 0,
            data,
            chain_id: deployment.chain_id,
        };

        let raw = signer.sign_transaction(&tx).await.map_err(DeployError::from)?;
        let tx_hash = self
            .rpc
            .send_raw_transaction(&raw)
            .await
            .map_err(DeployError::from)?;
        info!("Deployment transaction submitted: {}", tx_hash);

        let receipt = self
            .rpc
            .wait_for_receipt(&tx_hash, self.poll_interval)
            .await
            .map_err(DeployError::from)?;

        if !receipt.succeeded() {
            return Err(DeployError::from_message(format!(
                "Deployment transaction reverted: {}",
                tx_hash
            )));
        }

        let coin_address = extract_coin_address(&receipt, &self.factory)?;
        info!("Coin deployed at {}", coin_address);

        Ok(DeploymentReceipt {
            coin_address,
            tx_hash,
            deployer,
        })
    }
}

/// Pull the deployed coin address out of a receipt.
///
/// Preference order: the receipt's contract address, a log emitted by the
/// coin itself, then the first indexed address topic in a factory event.
fn extract_coin_address(
    receipt: &TransactionReceipt,
    factory: &EvmAddress,
) -> Result<EvmAddress, DeployError> {
    if let Some(created) = receipt
        .contract_address
        .as_deref()
        .and_then(|s| s.parse::<EvmAddress>().ok())
    {
        return Ok(created);
    }

    for log in &receipt.logs {
        if let Ok(address) = log.address.parse::<EvmAddress>() {
            if address != *factory {
                return Ok(address);
            }
        }
    }

    for log in &receipt.logs {
        for topic in log.topics.iter().skip(1) {
            if let Some(address) = address_from_topic(topic) {
                if address != *factory {
                    return Ok(address);
                }
            }
        }
    }

    Err(DeployError::from_message(format!(
        "Deployment succeeded but no coin address found in receipt {}",
        receipt.transaction_hash
    )))
}

/// Decode an address from a 32-byte event topic.
fn address_from_topic(topic: &str) -> Option<EvmAddress> {
    let digits = topic.strip_prefix("0x")?;
    if digits.len() != 64 || !digits[..24].bytes().all(|b| b == b'0') {
        return None;
    }
    format!("0x{}", &digits[24..]).parse().ok()
}

// ============================================================================
// Factory call encoding
// ============================================================================

/// ABI-encode `deploy(address,string,string,string,uint8)`.
fn encode_deploy_call(deployment: &CoinDeployment) -> Vec<u8> {
    let selector = &keccak256(b"deploy(address,string,string,string,uint8)")[..4];

    let strings = [
        deployment.name.as_str(),
        deployment.symbol.as_str(),
        deployment.uri.as_str(),
    ];
    let head_len = 5 * 32;

    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    head.extend_from_slice(&abi_address(&deployment.payout_recipient));
    for s in strings {
        head.extend_from_slice(&abi_uint((head_len + tail.len()) as u128));
        tail.extend_from_slice(&abi_string(s));
    }
    head.extend_from_slice(&abi_uint(deployment.currency.code() as u128));

    let mut out = Vec::with_capacity(4 + head.len() + tail.len());
    out.extend_from_slice(selector);
    out.extend_from_slice(&head);
    out.extend_from_slice(&tail);
    out
}

/// One 32-byte big-endian word.
fn abi_uint(value: u128) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

fn abi_address(address: &EvmAddress) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_bytes());
    word
}

/// Dynamic string: length word followed by the bytes, zero-padded to a word.
fn abi_string(s: &str) -> Vec<u8> {
    let bytes = s.as_bytes();
    let padded_len = bytes.len().div_ceil(32) * 32;

    let mut out = Vec::with_capacity(32 + padded_len);
    out.extend_from_slice(&abi_uint(bytes.len() as u128));
    out.extend_from_slice(bytes);
    out.resize(32 + padded_len, 0);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evm::rpc::LogEntry;

    fn sample_deployment() -> CoinDeployment {
        CoinDeployment {
            name: "Crypto Quiz".to_string(),
            symbol: "CRYPTO".to_string(),
            uri: content_uri(None),
            payout_recipient: "0x0000000000000000000000000000000000000001"
                .parse()
                .unwrap(),
            chain_id: 8453,
            currency: DeployCurrency::Zora,
        }
    }

    #[test]
    fn test_content_uri_is_deterministic() {
        let a = content_uri(Some("A quiz about crypto"));
        let b = content_uri(Some("A quiz about crypto"));
        assert_eq!(a, b);
        assert!(a.starts_with("data:text/plain;base64,"));

        assert_ne!(a, content_uri(Some("A different quiz")));
    }

    #[test]
    fn test_content_uri_fallback() {
        assert_eq!(content_uri(None), FALLBACK_CONTENT_URI);
        assert_eq!(content_uri(Some("")), FALLBACK_CONTENT_URI);
        assert_eq!(content_uri(Some("   ")), FALLBACK_CONTENT_URI);
    }

    #[test]
    fn test_gas_policy() {
        let policy = GasPolicy::default();
        assert_eq!(policy.multiplier_percent, 120);
        assert_eq!(policy.apply(100_000), 120_000);
        assert_eq!(policy.apply(0), 0);
    }

    #[test]
    fn test_classify_known_categories() {
        use DeployErrorKind::*;

        let cases = [
            ("insufficient funds for gas * price + value", InsufficientFunds),
            ("User rejected the request.", UserRejected),
            ("Invalid payout recipient: bad address", InvalidRecipient),
            ("Invalid private key in environment", InvalidCredential),
            ("401 Unauthorized", InvalidCredential),
            ("Missing required environment variables: RPC_URL", MissingConfiguration),
            ("execution reverted: something novel", Other),
        ];

        for (message, expected) in cases {
            assert_eq!(DeployErrorKind::classify(message), expected, "{}", message);
        }
    }

    #[test]
    fn test_deploy_error_keeps_raw_message() {
        let err = DeployError::from_message("execution reverted: weird");
        assert_eq!(err.kind, DeployErrorKind::Other);
        assert_eq!(err.to_string(), "execution reverted: weird");
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let rpc = RpcClient::new("http://localhost:8545");
        let err = CoinFactoryClient::new("  ", rpc).unwrap_err();
        assert_eq!(err.kind, DeployErrorKind::InvalidCredential);
    }

    #[test]
    fn test_encode_deploy_call_layout() {
        let deployment = sample_deployment();
        let data = encode_deploy_call(&deployment);

        // Selector plus five head words, then the three string tails.
        assert_eq!(data.len() % 32, 4);
        assert!(data.len() > 4 + 5 * 32);

        // First dynamic offset points just past the head.
        let offset_word = &data[4 + 32..4 + 64];
        assert_eq!(offset_word[31], 160);

        // Payout recipient sits in the first word, left-padded.
        assert_eq!(&data[4 + 12..4 + 32], deployment.payout_recipient.as_bytes());
    }

    #[test]
    fn test_abi_string_padding() {
        let encoded = abi_string("dog");
        assert_eq!(encoded.len(), 64);
        assert_eq!(encoded[31], 3);
        assert_eq!(&encoded[32..35], b"dog");
        assert!(encoded[35..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_extract_coin_address_prefers_contract_address() {
        let factory: EvmAddress = COIN_FACTORY.parse().unwrap();
        let receipt = TransactionReceipt {
            transaction_hash: "0xabc".to_string(),
            status: "0x1".to_string(),
            contract_address: Some("0x0000000000000000000000000000000000000007".to_string()),
            block_number: None,
            logs: vec![],
        };

        let address = extract_coin_address(&receipt, &factory).unwrap();
        assert_eq!(
            address,
            "0x0000000000000000000000000000000000000007".parse().unwrap()
        );
    }

    #[test]
    fn test_extract_coin_address_from_logs() {
        let factory: EvmAddress = COIN_FACTORY.parse().unwrap();
        let receipt = TransactionReceipt {
            transaction_hash: "0xabc".to_string(),
            status: "0x1".to_string(),
            contract_address: None,
            block_number: None,
            logs: vec![
                LogEntry {
                    address: COIN_FACTORY.to_string(),
                    topics: vec![],
                    data: "0x".to_string(),
                },
                LogEntry {
                    address: "0x0000000000000000000000000000000000000009".to_string(),
                    topics: vec![],
                    data: "0x".to_string(),
                },
            ],
        };

        let address = extract_coin_address(&receipt, &factory).unwrap();
        assert_eq!(
            address,
            "0x0000000000000000000000000000000000000009".parse().unwrap()
        );
    }

    #[test]
    fn test_extract_coin_address_from_topic() {
        let factory: EvmAddress = COIN_FACTORY.parse().unwrap();
        let receipt = TransactionReceipt {
            transaction_hash: "0xabc".to_string(),
            status: "0x1".to_string(),
            contract_address: None,
            block_number: None,
            logs: vec![LogEntry {
                address: COIN_FACTORY.to_string(),
                topics: vec![
                    "0x1111111111111111111111111111111111111111111111111111111111111111"
                        .to_string(),
                    format!("0x{}{}", "0".repeat(24), "0000000000000000000000000000000000000009"),
                ],
                data: "0x".to_string(),
            }],
        };

        let address = extract_coin_address(&receipt, &factory).unwrap();
        assert_eq!(
            address,
            "0x0000000000000000000000000000000000000009".parse().unwrap()
        );
    }

    #[test]
    fn test_missing_coin_address_is_error() {
        let factory: EvmAddress = COIN_FACTORY.parse().unwrap();
        let receipt = TransactionReceipt {
            transaction_hash: "0xabc".to_string(),
            status: "0x1".to_string(),
            contract_address: None,
            block_number: None,
            logs: vec![],
        };

        assert!(extract_coin_address(&receipt, &factory).is_err());
    }
}

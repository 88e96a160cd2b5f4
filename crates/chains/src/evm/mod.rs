//! EVM chain support: Base network constants, addresses, RPC, transactions,
//! signers, and the coin-deployment boundary.

pub mod address;
pub mod deploy;
pub mod rpc;
pub mod signer;
pub mod tx;
pub mod wallet;

pub use address::EvmAddress;
pub use deploy::{
    content_uri, CoinDeployer, CoinDeployment, CoinFactoryClient, DeployCurrency, DeployError,
    DeployErrorKind, DeploymentReceipt, GasPolicy, FALLBACK_CONTENT_URI,
};
pub use rpc::{RpcClient, TransactionReceipt, TxHash};
pub use signer::{PrivateKeySigner, TransactionSigner, WalletSigner};
pub use tx::TransactionRequest;
pub use wallet::{connect_first, ConnectionStatus, WalletConnector, WalletSession};

use sha3::{Digest, Keccak256};

/// Keccak-256 digest, the EVM hash.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Keccak256::digest(data));
    out
}

/// Target chain for coin deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainTarget {
    Base,
    BaseSepolia,
}

impl ChainTarget {
    /// Parse from string (environment variable / CLI flag).
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "base-sepolia" | "sepolia" | "testnet" => ChainTarget::BaseSepolia,
            _ => ChainTarget::Base, // Default to Base mainnet
        }
    }

    /// EVM chain id.
    pub fn id(&self) -> u64 {
        match self {
            ChainTarget::Base => 8453,
            ChainTarget::BaseSepolia => 84532,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ChainTarget::Base => "base",
            ChainTarget::BaseSepolia => "base-sepolia",
        }
    }

    /// Block explorer base URL.
    pub fn explorer_url(&self) -> &'static str {
        match self {
            ChainTarget::Base => "https://basescan.org",
            ChainTarget::BaseSepolia => "https://sepolia.basescan.org",
        }
    }

    /// Get transaction URL for display.
    pub fn tx_url(&self, tx_hash: &str) -> String {
        format!("{}/tx/{}", self.explorer_url(), tx_hash)
    }

    /// Get address URL for display.
    pub fn address_url(&self, address: &str) -> String {
        format!("{}/address/{}", self.explorer_url(), address)
    }
}

impl std::fmt::Display for ChainTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

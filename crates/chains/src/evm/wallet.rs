//! Wallet-connector boundary.
//!
//! The wallet-connection library is an external collaborator; this module
//! only defines the seam the app consumes: connectors that can be asked for a
//! session, and sessions that expose an account and signing capabilities.

use std::sync::Arc;

use async_trait::async_trait;
use common::QuizDropError;
use tracing::debug;

use super::tx::TransactionRequest;
use super::EvmAddress;

/// Connection state of a wallet session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
}

/// An established wallet connection.
#[async_trait]
pub trait WalletSession: Send + Sync {
    fn status(&self) -> ConnectionStatus;

    /// Account address of the connected wallet.
    fn address(&self) -> EvmAddress;

    /// Ask the wallet to sign a transaction; returns the raw signed payload.
    async fn sign_transaction(&self, tx: &TransactionRequest) -> Result<Vec<u8>, QuizDropError>;

    /// Ask the wallet to sign an arbitrary message. Available on every
    /// session; the coin-creation flow does not use it.
    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>, QuizDropError>;
}

impl std::fmt::Debug for dyn WalletSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletSession")
            .field("status", &self.status())
            .field("address", &self.address())
            .finish()
    }
}

/// A wallet connector that can produce sessions.
#[async_trait]
pub trait WalletConnector: Send + Sync {
    fn name(&self) -> &str;

    async fn connect(&self) -> Result<Arc<dyn WalletSession>, QuizDropError>;
}

/// Connect to the first available connector.
pub async fn connect_first(
    connectors: &[Arc<dyn WalletConnector>],
) -> Result<Arc<dyn WalletSession>, QuizDropError> {
    let mut last_error = None;
    for connector in connectors {
        match connector.connect().await {
            Ok(session) => return Ok(session),
            Err(e) => {
                debug!("Connector {} unavailable: {}", connector.name(), e);
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| {
        QuizDropError::WalletConnection("No wallet connector available".to_string())
    }))
}

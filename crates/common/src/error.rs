//! Error types for the QuizDrop system.

/// Error type shared across the QuizDrop crates.
#[derive(Debug, thiserror::Error)]
pub enum QuizDropError {
    #[error("Host communication error: {0}")]
    HostCommunication(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Wallet connection error: {0}")]
    WalletConnection(String),

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

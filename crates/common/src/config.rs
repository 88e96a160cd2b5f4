//! Environment configuration for the coin-deployment flow.
//!
//! Recognized variables:
//! - `ZORA_API_KEY` - credential for the deployment service
//! - `PRIVATE_KEY` - hex signing key (with or without 0x prefix)
//! - `RPC_URL` - chain RPC endpoint
//! - `PAYOUT_RECIPIENT` - address receiving creator payouts

use crate::QuizDropError;

pub const ENV_API_KEY: &str = "ZORA_API_KEY";
pub const ENV_PRIVATE_KEY: &str = "PRIVATE_KEY";
pub const ENV_RPC_URL: &str = "RPC_URL";
pub const ENV_PAYOUT_RECIPIENT: &str = "PAYOUT_RECIPIENT";

/// Credentials and endpoints required before a deployment can be attempted.
///
/// The payout recipient is kept as entered; address-format validation happens
/// in the workflow preconditions so that a bad value surfaces as a
/// user-visible validation error rather than a construction failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployConfig {
    pub api_key: String,
    pub private_key: String,
    pub rpc_url: String,
    pub payout_recipient: String,
}

impl DeployConfig {
    /// Load from environment variables.
    ///
    /// Reports every missing variable at once so a misconfigured environment
    /// can be fixed in one pass. Variables set to an empty string count as
    /// missing.
    pub fn from_env() -> Result<Self, QuizDropError> {
        let mut missing = Vec::new();
        let mut read = |name: &'static str| -> String {
            match std::env::var(name) {
                Ok(value) if !value.trim().is_empty() => value,
                _ => {
                    missing.push(name);
                    String::new()
                }
            }
        };

        let config = Self {
            api_key: read(ENV_API_KEY),
            private_key: read(ENV_PRIVATE_KEY),
            rpc_url: read(ENV_RPC_URL),
            payout_recipient: read(ENV_PAYOUT_RECIPIENT),
        };

        if missing.is_empty() {
            Ok(config)
        } else {
            Err(QuizDropError::Configuration(format!(
                "Missing required environment variables: {}",
                missing.join(", ")
            )))
        }
    }

    /// Check that every credential is present (non-empty).
    ///
    /// Configs built by `from_env` always pass; configs assembled by hand
    /// (tests, embedding hosts) are re-checked by the workflow before any
    /// side effect.
    pub fn validate(&self) -> Result<(), QuizDropError> {
        let mut missing = Vec::new();
        if self.api_key.trim().is_empty() {
            missing.push(ENV_API_KEY);
        }
        if self.private_key.trim().is_empty() {
            missing.push(ENV_PRIVATE_KEY);
        }
        if self.rpc_url.trim().is_empty() {
            missing.push(ENV_RPC_URL);
        }
        if self.payout_recipient.trim().is_empty() {
            missing.push(ENV_PAYOUT_RECIPIENT);
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(QuizDropError::Configuration(format!(
                "Missing required environment variables: {}",
                missing.join(", ")
            )))
        }
    }
}

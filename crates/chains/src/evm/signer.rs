//! Transaction signing.
//!
//! The workflow treats "a thing that can sign a transaction" polymorphically:
//! a private key held in configuration (script/dev flow) or a connected
//! wallet session (interactive flow) behind the same trait.

use std::sync::Arc;

use async_trait::async_trait;
use common::QuizDropError;
use k256::ecdsa::SigningKey;

use super::tx::{TransactionRequest, TxSignature};
use super::wallet::WalletSession;
use super::{keccak256, EvmAddress};

/// A signing identity able to produce a raw signed transaction.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    /// Address of the signing account.
    fn address(&self) -> EvmAddress;

    /// Sign the transaction; returns the raw payload for submission.
    async fn sign_transaction(&self, tx: &TransactionRequest) -> Result<Vec<u8>, QuizDropError>;
}

/// Signer backed by a local secp256k1 private key.
pub struct PrivateKeySigner {
    key: SigningKey,
    address: EvmAddress,
}

impl PrivateKeySigner {
    /// Parse a hex private key, with or without a `0x` prefix.
    pub fn from_hex(raw: &str) -> Result<Self, QuizDropError> {
        let digits = raw
            .strip_prefix("0x")
            .or_else(|| raw.strip_prefix("0X"))
            .unwrap_or(raw);

        let bytes = hex::decode(digits)
            .map_err(|e| QuizDropError::Signing(format!("Invalid private key hex: {}", e)))?;

        let key = SigningKey::from_slice(&bytes)
            .map_err(|e| QuizDropError::Signing(format!("Invalid private key: {}", e)))?;

        let address = derive_address(&key);
        Ok(Self { key, address })
    }
}

/// Account address for a signing key: last 20 bytes of the keccak digest of
/// the uncompressed public key.
fn derive_address(key: &SigningKey) -> EvmAddress {
    let point = key.verifying_key().to_encoded_point(false);
    let digest = keccak256(&point.as_bytes()[1..]);

    let mut out = [0u8; 20];
    out.copy_from_slice(&digest[12..]);
    EvmAddress::new(out)
}

#[async_trait]
impl TransactionSigner for PrivateKeySigner {
    fn address(&self) -> EvmAddress {
        self.address
    }

    async fn sign_transaction(&self, tx: &TransactionRequest) -> Result<Vec<u8>, QuizDropError> {
        let digest = tx.signing_digest();
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(&digest)
            .map_err(|e| QuizDropError::Signing(format!("Signing failed: {}", e)))?;

        let bytes = signature.to_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);

        tx.encode_signed(&TxSignature {
            r,
            s,
            recovery_id: recovery_id.to_byte(),
        })
    }
}

/// Signer that delegates to a connected wallet session.
pub struct WalletSigner {
    session: Arc<dyn WalletSession>,
}

impl WalletSigner {
    pub fn new(session: Arc<dyn WalletSession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl TransactionSigner for WalletSigner {
    fn address(&self) -> EvmAddress {
        self.session.address()
    }

    async fn sign_transaction(&self, tx: &TransactionRequest) -> Result<Vec<u8>, QuizDropError> {
        self.session.sign_transaction(tx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known test key (hardhat/anvil account #0).
    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const TEST_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    #[test]
    fn test_address_derivation() {
        let signer = PrivateKeySigner::from_hex(TEST_KEY).unwrap();
        assert_eq!(signer.address().to_checksum(), TEST_ADDRESS);
    }

    #[test]
    fn test_prefix_is_optional() {
        let with_prefix = PrivateKeySigner::from_hex(TEST_KEY).unwrap();
        let without_prefix = PrivateKeySigner::from_hex(&TEST_KEY[2..]).unwrap();
        assert_eq!(with_prefix.address(), without_prefix.address());
    }

    #[test]
    fn test_invalid_keys_rejected() {
        assert!(PrivateKeySigner::from_hex("0xnothex").is_err());
        assert!(PrivateKeySigner::from_hex("0x1234").is_err());
    }

    #[tokio::test]
    async fn test_sign_transaction_produces_raw_payload() {
        let signer = PrivateKeySigner::from_hex(TEST_KEY).unwrap();
        let tx = TransactionRequest {
            nonce: 0,
            gas_price: 1_000_000_000,
            gas_limit: 21_000,
            to: Some(EvmAddress::ZERO),
            value: 1,
            data: Vec::new(),
            chain_id: 8453,
        };

        let raw = signer.sign_transaction(&tx).await.unwrap();
        // RLP list header plus the nine fields.
        assert!(raw.len() > 64);
        assert!(raw[0] >= 0xc0);
    }
}

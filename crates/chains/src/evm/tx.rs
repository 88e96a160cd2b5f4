//! Legacy EVM transaction encoding.
//!
//! Implements just enough RLP to serialize a legacy transaction, compute its
//! EIP-155 signing digest, and assemble the signed raw payload for
//! `eth_sendRawTransaction`.

use common::QuizDropError;

use super::{keccak256, EvmAddress};

/// An unsigned legacy transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    pub nonce: u64,
    pub gas_price: u128,
    pub gas_limit: u64,
    /// `None` deploys a contract.
    pub to: Option<EvmAddress>,
    pub value: u128,
    pub data: Vec<u8>,
    pub chain_id: u64,
}

/// A recoverable secp256k1 signature over a transaction digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxSignature {
    pub r: [u8; 32],
    pub s: [u8; 32],
    /// 0 or 1.
    pub recovery_id: u8,
}

impl TransactionRequest {
    fn to_field(&self) -> Vec<u8> {
        match &self.to {
            Some(address) => address.as_bytes().to_vec(),
            None => Vec::new(),
        }
    }

    /// EIP-155 signing digest: keccak of the RLP list
    /// `(nonce, gasPrice, gas, to, value, data, chainId, 0, 0)`.
    pub fn signing_digest(&self) -> [u8; 32] {
        let payload = rlp_list(&[
            rlp_uint(self.nonce as u128),
            rlp_uint(self.gas_price),
            rlp_uint(self.gas_limit as u128),
            rlp_bytes(&self.to_field()),
            rlp_uint(self.value),
            rlp_bytes(&self.data),
            rlp_uint(self.chain_id as u128),
            rlp_uint(0),
            rlp_uint(0),
        ]);
        keccak256(&payload)
    }

    /// Assemble the signed raw transaction.
    pub fn encode_signed(&self, signature: &TxSignature) -> Result<Vec<u8>, QuizDropError> {
        if signature.recovery_id > 1 {
            return Err(QuizDropError::Signing(format!(
                "unexpected recovery id {}",
                signature.recovery_id
            )));
        }
        let v = self.chain_id as u128 * 2 + 35 + signature.recovery_id as u128;

        Ok(rlp_list(&[
            rlp_uint(self.nonce as u128),
            rlp_uint(self.gas_price),
            rlp_uint(self.gas_limit as u128),
            rlp_bytes(&self.to_field()),
            rlp_uint(self.value),
            rlp_bytes(&self.data),
            rlp_uint(v),
            rlp_bytes(trim_leading_zeros(&signature.r)),
            rlp_bytes(trim_leading_zeros(&signature.s)),
        ]))
    }
}

fn trim_leading_zeros(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    &bytes[start..]
}

// ============================================================================
// RLP primitives
// ============================================================================

/// RLP-encode a byte string.
fn rlp_bytes(bytes: &[u8]) -> Vec<u8> {
    if bytes.len() == 1 && bytes[0] < 0x80 {
        return bytes.to_vec();
    }
    let mut out = rlp_length(bytes.len(), 0x80);
    out.extend_from_slice(bytes);
    out
}

/// RLP-encode an unsigned integer (big-endian, no leading zeros).
fn rlp_uint(value: u128) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    rlp_bytes(trim_leading_zeros(&bytes))
}

/// RLP-encode a list of already-encoded items.
fn rlp_list(items: &[Vec<u8>]) -> Vec<u8> {
    let payload_len: usize = items.iter().map(|i| i.len()).sum();
    let mut out = rlp_length(payload_len, 0xc0);
    for item in items {
        out.extend_from_slice(item);
    }
    out
}

/// Length prefix for strings (offset 0x80) or lists (offset 0xc0).
fn rlp_length(len: usize, offset: u8) -> Vec<u8> {
    if len <= 55 {
        vec![offset + len as u8]
    } else {
        let len_bytes = len.to_be_bytes();
        let trimmed = trim_leading_zeros(&len_bytes);
        let mut out = vec![offset + 55 + trimmed.len() as u8];
        out.extend_from_slice(trimmed);
        out
    }
}

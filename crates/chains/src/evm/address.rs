//! EVM address parsing and validation.
//!
//! Addresses are 20 bytes, written as `0x` followed by 40 hex digits and
//! displayed with the EIP-55 mixed-case checksum.

use common::QuizDropError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::keccak256;

/// A 20-byte EVM account or contract address.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EvmAddress([u8; 20]);

impl EvmAddress {
    pub const ZERO: EvmAddress = EvmAddress([0u8; 20]);

    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Build from a byte slice; must be exactly 20 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, QuizDropError> {
        if bytes.len() != 20 {
            return Err(QuizDropError::InvalidAddress(format!(
                "expected 20 bytes, got {}",
                bytes.len()
            )));
        }
        let mut out = [0u8; 20];
        out.copy_from_slice(bytes);
        Ok(Self(out))
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// EIP-55 mixed-case checksum rendering.
    pub fn to_checksum(&self) -> String {
        let lower = hex::encode(self.0);
        let digest = keccak256(lower.as_bytes());

        let mut out = String::with_capacity(42);
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            let nibble = (digest[i / 2] >> (if i % 2 == 0 { 4 } else { 0 })) & 0x0f;
            if c.is_ascii_alphabetic() && nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }
}

/// Check whether a string is a well-formed EVM address.
pub fn is_address(s: &str) -> bool {
    s.parse::<EvmAddress>().is_ok()
}

impl std::str::FromStr for EvmAddress {
    type Err = QuizDropError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex_part = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| {
                QuizDropError::InvalidAddress(format!("missing 0x prefix: {}", s))
            })?;

        if hex_part.len() != 40 {
            return Err(QuizDropError::InvalidAddress(format!(
                "expected 40 hex digits, got {}",
                hex_part.len()
            )));
        }

        let bytes = hex::decode(hex_part)
            .map_err(|e| QuizDropError::InvalidAddress(format!("invalid hex: {}", e)))?;

        Self::from_slice(&bytes)
    }
}

impl std::fmt::Display for EvmAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_checksum())
    }
}

impl std::fmt::Debug for EvmAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_checksum())
    }
}

impl Serialize for EvmAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_checksum())
    }
}

impl<'de> Deserialize<'de> for EvmAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrip() {
        let addr: EvmAddress = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
            .parse()
            .unwrap();
        assert_eq!(addr.to_checksum(), "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
    }

    #[test]
    fn test_checksum_vectors() {
        // Test vectors from EIP-55.
        let vectors = [
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
            "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
            "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
        ];
        for vector in vectors {
            let addr: EvmAddress = vector.to_lowercase().parse().unwrap();
            assert_eq!(addr.to_checksum(), vector);
        }
    }

    #[test]
    fn test_is_address() {
        assert!(is_address("0x0000000000000000000000000000000000000001"));
        assert!(!is_address("not-an-address"));
        assert!(!is_address("0x1234"));
        assert!(!is_address("5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"));
        assert!(!is_address("0xZZZeb6053F3E94C9b9A09f33669435E7Ef1BeAed"));
    }

    #[test]
    fn test_serde_string_form() {
        let addr: EvmAddress = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"
            .parse()
            .unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed\"");

        let back: EvmAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }
}

//! Core session and quiz types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::QuizDropError;

/// User identity obtained from the frame host at startup.
///
/// Immutable for the lifetime of the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Numeric id assigned by the host platform.
    pub fid: u64,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub pfp_url: Option<String>,
}

impl Identity {
    /// Preferred name for display: display name, then handle, then the fid.
    pub fn preferred_name(&self) -> String {
        self.display_name
            .clone()
            .or_else(|| self.username.clone())
            .unwrap_or_else(|| format!("fid:{}", self.fid))
    }
}

/// Opaque bearer token obtained from the host's auth exchange.
///
/// Used only for display/verification; the mint flow is not authorized by it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(pub String);

impl std::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A quiz as entered in the creation form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizDefinition {
    /// Quiz name; must be non-empty.
    pub name: String,
    /// Coin symbol; must be non-empty. Uppercasing and the 5-character cap
    /// are presentation constraints, not enforced here.
    pub symbol: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl QuizDefinition {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Check the form-level invariants: name and symbol non-empty.
    pub fn validate(&self) -> Result<(), QuizDropError> {
        if self.name.trim().is_empty() {
            return Err(QuizDropError::Validation(
                "Quiz name must not be empty".to_string(),
            ));
        }
        if self.symbol.trim().is_empty() {
            return Err(QuizDropError::Validation(
                "Quiz symbol must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Record of a successfully minted quiz coin.
///
/// Appended to the workflow's in-memory list; never removed within a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedQuiz {
    /// Record id; the coin contract address.
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub coin_address: String,
    pub tx_hash: String,
    /// Address of the account that deployed the coin.
    pub creator: String,
    /// Host identity of the creator, when the session is authenticated.
    pub creator_fid: Option<u64>,
    pub created: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preferred_name_fallbacks() {
        let mut identity = Identity {
            fid: 42,
            display_name: Some("Alice".to_string()),
            username: Some("alice".to_string()),
            pfp_url: None,
        };
        assert_eq!(identity.preferred_name(), "Alice");

        identity.display_name = None;
        assert_eq!(identity.preferred_name(), "alice");

        identity.username = None;
        assert_eq!(identity.preferred_name(), "fid:42");
    }

    #[test]
    fn test_quiz_definition_validate() {
        let quiz = QuizDefinition::new("Crypto Quiz", "CRYPTO");
        assert!(quiz.validate().is_ok());

        let no_name = QuizDefinition::new("", "CRYPTO");
        assert!(no_name.validate().is_err());

        let blank_symbol = QuizDefinition::new("Crypto Quiz", "   ");
        assert!(blank_symbol.validate().is_err());
    }

    #[test]
    fn test_identity_deserializes_without_optionals() {
        let identity: Identity = serde_json::from_str(r#"{"fid": 7}"#).unwrap();
        assert_eq!(identity.fid, 7);
        assert!(identity.display_name.is_none());
        assert!(identity.pfp_url.is_none());
    }
}

//! Frame-host platform boundary.
//!
//! The host runtime (authentication context, ready/signal handshake) is an
//! external collaborator; the app only consumes this seam.

use async_trait::async_trait;
use common::{Identity, QuizDropError, SessionToken};
use uuid::Uuid;

/// Context handed over by the host on request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostContext {
    /// Present when the host already knows the user.
    pub user: Option<Identity>,
}

/// Parameters for an explicit sign-in request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInRequest {
    pub nonce: String,
    pub accept_auth_address: bool,
}

impl SignInRequest {
    /// Fresh request with a random nonce.
    pub fn new() -> Self {
        Self {
            nonce: Uuid::new_v4().to_string(),
            accept_auth_address: true,
        }
    }
}

impl Default for SignInRequest {
    fn default() -> Self {
        Self::new()
    }
}

/// The host platform seam.
#[async_trait]
pub trait HostClient: Send + Sync {
    /// Current context, including the user when known.
    async fn context(&self) -> Result<HostContext, QuizDropError>;

    /// Exchange the host session for a bearer token.
    async fn auth_token(&self) -> Result<SessionToken, QuizDropError>;

    /// Tell the host the app is ready to render.
    async fn signal_ready(&self) -> Result<(), QuizDropError>;

    /// Run the host's interactive sign-in flow.
    async fn sign_in(&self, request: SignInRequest) -> Result<HostContext, QuizDropError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_in_request_nonces_are_unique() {
        let a = SignInRequest::new();
        let b = SignInRequest::new();
        assert_ne!(a.nonce, b.nonce);
        assert!(a.accept_auth_address);
    }
}

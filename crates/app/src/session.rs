//! Session bootstrap.
//!
//! Establishes identity and token before any authenticated UI renders.
//! Bootstrap failures are never fatal: they are logged and the session
//! degrades to the unauthenticated view.

use std::sync::Arc;

use common::{Identity, QuizDropError, SessionToken};
use tracing::warn;

use crate::host::{HostClient, SignInRequest};

/// Where a session landed after bootstrap.
///
/// `Loading` exists only before `initialize` completes; both other phases are
/// terminal for the bootstrapper (no re-entry without a full reload).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    Loading,
    Authenticated {
        identity: Identity,
        /// Absent when the token exchange failed; identity is still trusted.
        token: Option<SessionToken>,
    },
    Unauthenticated,
}

/// Per-session application state produced by the bootstrapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    phase: SessionPhase,
}

impl Session {
    /// State before `initialize` completes. Interactive content must not
    /// render in this phase.
    pub fn loading() -> Self {
        Self {
            phase: SessionPhase::Loading,
        }
    }

    pub fn authenticated(identity: Identity, token: Option<SessionToken>) -> Self {
        Self {
            phase: SessionPhase::Authenticated { identity, token },
        }
    }

    pub fn unauthenticated() -> Self {
        Self {
            phase: SessionPhase::Unauthenticated,
        }
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, SessionPhase::Loading)
    }

    pub fn identity(&self) -> Option<&Identity> {
        match &self.phase {
            SessionPhase::Authenticated { identity, .. } => Some(identity),
            _ => None,
        }
    }

    pub fn token(&self) -> Option<&SessionToken> {
        match &self.phase {
            SessionPhase::Authenticated { token, .. } => token.as_ref(),
            _ => None,
        }
    }
}

/// One-shot session bootstrapper.
///
/// Consuming `initialize` guarantees the ready signal fires exactly once per
/// bootstrap.
pub struct SessionBootstrapper {
    host: Arc<dyn HostClient>,
}

impl SessionBootstrapper {
    pub fn new(host: Arc<dyn HostClient>) -> Self {
        Self { host }
    }

    /// Request context and token from the host, then signal ready.
    ///
    /// Every failure along the way is logged and swallowed; the returned
    /// session is always in a terminal phase.
    pub async fn initialize(self) -> Session {
        let phase = match self.host.context().await {
            Ok(context) => match context.user {
                Some(identity) => {
                    let token = match self.host.auth_token().await {
                        Ok(token) => Some(token),
                        Err(e) => {
                            warn!("Failed to fetch auth token: {}", e);
                            None
                        }
                    };
                    SessionPhase::Authenticated { identity, token }
                }
                None => SessionPhase::Unauthenticated,
            },
            Err(e) => {
                warn!("Failed to initialize auth: {}", e);
                SessionPhase::Unauthenticated
            }
        };

        if let Err(e) = self.host.signal_ready().await {
            warn!("Failed to signal ready to host: {}", e);
        }

        Session { phase }
    }
}

/// Run the host's interactive sign-in flow and return the signed-in identity.
pub async fn sign_in(host: &dyn HostClient) -> Result<Identity, QuizDropError> {
    let context = host.sign_in(SignInRequest::new()).await?;
    context.user.ok_or_else(|| {
        QuizDropError::HostCommunication("Sign-in completed without a user".to_string())
    })
}

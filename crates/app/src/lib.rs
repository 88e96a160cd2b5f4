//! QuizDrop application core.
//!
//! Ties the boundaries together for a session:
//! - `host`: the frame-host platform seam (context, auth, ready signal)
//! - `session`: the startup bootstrapper and session state
//! - `workflow`: the coin-creation workflow and its created-quiz list

pub mod host;
pub mod session;
pub mod workflow;

pub use host::{HostClient, HostContext, SignInRequest};
pub use session::{sign_in, Session, SessionBootstrapper, SessionPhase};
pub use workflow::{CoinCreationWorkflow, SubmitError, WorkflowState};

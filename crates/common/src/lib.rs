//! Shared types for the QuizDrop mini-app.
//!
//! This crate holds everything the other crates agree on:
//! - the session identity obtained from the frame host
//! - quiz definitions and created-quiz records
//! - the environment configuration surface for coin deployment
//! - the quiz scoring state machine
//! - the common error type

pub mod config;
pub mod error;
pub mod quiz;
pub mod types;

pub use config::DeployConfig;
pub use error::QuizDropError;
pub use types::{CreatedQuiz, Identity, QuizDefinition, SessionToken};

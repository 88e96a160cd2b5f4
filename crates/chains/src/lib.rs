//! Chain boundary for the QuizDrop mini-app.
//!
//! Everything that touches the blockchain lives here:
//! - address parsing and validation
//! - the JSON-RPC client
//! - transaction encoding and signing
//! - the wallet-connector boundary
//! - the coin-deployment boundary

pub mod evm;

//! CLI command implementations.

mod coin;

pub use coin::{check_config, create_coin};

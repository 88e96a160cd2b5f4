//! Coin-creation commands.

use std::sync::Arc;

use anyhow::Result;
use tracing::error;

use app::CoinCreationWorkflow;
use chains::evm::{ChainTarget, CoinFactoryClient, RpcClient};
use common::config::{ENV_API_KEY, ENV_PAYOUT_RECIPIENT, ENV_PRIVATE_KEY, ENV_RPC_URL};
use common::{DeployConfig, QuizDefinition};

/// Create a quiz coin from environment configuration.
pub async fn create_coin(
    chain: &str,
    name: &str,
    symbol: &str,
    description: Option<&str>,
) -> Result<()> {
    let config = match DeployConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            print_config_template();
            std::process::exit(1);
        }
    };

    let chain = ChainTarget::parse(chain);
    let rpc = RpcClient::new(&config.rpc_url);
    let deployer = CoinFactoryClient::new(config.api_key.clone(), rpc)?;

    let workflow = CoinCreationWorkflow::new(Arc::new(deployer)).with_chain(chain);

    let mut quiz = QuizDefinition::new(name, symbol.to_uppercase());
    if let Some(description) = description {
        quiz = quiz.with_description(description);
    }

    println!("Creating quiz coin \"{}\" ({}) on {}...", quiz.name, quiz.symbol, chain);

    let record = workflow.submit(&quiz, &config, None).await?;

    println!();
    println!("Quiz coin created");
    println!("=================");
    println!("  Name:       {}", record.name);
    println!("  Symbol:     {}", record.symbol);
    println!("  Coin:       {}", record.coin_address);
    println!("  Tx hash:    {}", record.tx_hash);
    println!("  Creator:    {}", record.creator);
    println!("  Network:    {}", chain);
    println!();
    println!("  Explorer:   {}", chain.tx_url(&record.tx_hash));
    println!("  Contract:   {}", chain.address_url(&record.coin_address));

    Ok(())
}

/// Report which required environment variables are set.
pub fn check_config() {
    let names = [ENV_API_KEY, ENV_PRIVATE_KEY, ENV_RPC_URL, ENV_PAYOUT_RECIPIENT];

    println!("Environment configuration");
    println!("=========================");

    let mut missing = 0;
    for name in names {
        let set = std::env::var(name)
            .map(|v| !v.trim().is_empty())
            .unwrap_or(false);
        println!("  {:<18} {}", name, if set { "SET" } else { "MISSING" });
        if !set {
            missing += 1;
        }
    }

    if missing > 0 {
        println!();
        print_config_template();
        std::process::exit(1);
    }

    println!();
    println!("All required variables are set.");
}

fn print_config_template() {
    println!();
    println!("Create a .env file (or export) with:");
    println!("  {}=your_zora_key", ENV_API_KEY);
    println!("  {}=your_private_key", ENV_PRIVATE_KEY);
    println!("  {}=https://base-mainnet.example/v2/your-key", ENV_RPC_URL);
    println!("  {}=0xValidEvmAddress", ENV_PAYOUT_RECIPIENT);
}

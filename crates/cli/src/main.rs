//! QuizDrop CLI
//!
//! Non-interactive variant of the coin-creation workflow: mint a quiz coin
//! straight from environment configuration, without the frame host.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;

/// QuizDrop CLI - Mint quiz coins from the command line.
#[derive(Parser, Debug)]
#[command(name = "quizdrop")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Target chain ("base" or "base-sepolia").
    #[arg(long, default_value = "base", global = true)]
    chain: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a quiz coin on-chain.
    CreateCoin {
        /// Quiz name.
        #[arg(short, long, default_value = "QuizDrop Coin")]
        name: String,

        /// Coin symbol; uppercased before submission.
        #[arg(short, long, default_value = "QUIZ")]
        symbol: String,

        /// Optional quiz description, embedded in the coin's content URI.
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Check that the required environment variables are set.
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = if cli.verbose {
        Level::TRACE
    } else {
        Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        Commands::CreateCoin {
            name,
            symbol,
            description,
        } => {
            commands::create_coin(&cli.chain, &name, &symbol, description.as_deref()).await?;
        }
        Commands::CheckConfig => {
            commands::check_config();
        }
    }

    Ok(())
}

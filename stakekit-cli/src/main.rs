//! Stakekit CLI
//!
//! Normalize Cardano wallet addresses, inspect pool ids and delegate stake
//! through the delegation backend.

use anyhow::Result;
use clap::{Parser, Subcommand};
use stakekit_lib::address::Network;
use stakekit_lib::config::StakekitConfig;

mod commands;
mod ui;
mod wallet;

#[derive(Parser)]
#[command(name = "stakekit")]
#[command(about = "Stakekit CLI - Cardano wallet addresses and stake delegation", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Delegation backend base URL (can also be set via STAKEKIT_API_BASE)
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// Network (mainnet, testnet, preprod, preview; can also be set via STAKEKIT_NETWORK)
    #[arg(long, global = true)]
    network: Option<Network>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a wallet address (hex or bech32) to its canonical form
    Normalize {
        /// Address as hex or bech32
        raw: String,

        /// Accept any address kind, not only payment addresses
        #[arg(long)]
        any_class: bool,
    },

    /// Validate a stake pool id and show both encodings
    Pool {
        /// Pool id (bech32 or hex); defaults to the configured pool
        id: Option<String>,
    },

    /// List unspent outputs of an address
    Utxos {
        /// Address as hex or bech32
        address: String,
    },

    /// Show current protocol parameters
    Params,

    /// Delegate an address's stake to a pool
    Delegate {
        /// Address to delegate (hex or bech32)
        #[arg(short, long)]
        address: String,

        /// Target pool; defaults to the configured pool
        #[arg(short, long)]
        pool: Option<String>,

        /// Send UTxOs and protocol parameters with the submit request
        #[arg(long)]
        attach_context: bool,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("stakekit=debug,stakekit_lib=debug")
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("stakekit=info,stakekit_lib=warn")
            .init();
    }

    let mut config = StakekitConfig::from_env()?;
    if let Some(api_base) = cli.api_base {
        config = config.with_api_base(api_base);
    }
    if let Some(network) = cli.network {
        config = config.with_network(network);
    }
    config.validate()?;

    match cli.command {
        Commands::Normalize { raw, any_class } => {
            commands::normalize::run(&config, &raw, any_class, cli.verbose)?;
        }
        Commands::Pool { id } => {
            commands::pool::run(&config, id.as_deref())?;
        }
        Commands::Utxos { address } => {
            commands::backend::utxos(&config, &address, cli.verbose).await?;
        }
        Commands::Params => {
            commands::backend::params(&config, cli.verbose).await?;
        }
        Commands::Delegate {
            address,
            pool,
            attach_context,
            yes,
        } => {
            commands::delegate::run(&config, &address, pool.as_deref(), attach_context, yes)
                .await?;
        }
        Commands::Config => {
            commands::config::run(&config)?;
        }
    }

    Ok(())
}

//! InstaTip CLI - instant off-chain tipping sessions
//!
//! # Quick Start
//!
//! ```bash
//! # Run a full session: open, tip, stats, settle
//! instatip demo --owner 0x1234...5678 --allowance 50
//!
//! # Show a failed settlement being retried
//! instatip demo --fail-settlements 2
//!
//! # Score a post and get a suggested tip
//! instatip score "Step by step guide to web3 wallets!"
//!
//! # Print the effective configuration
//! INSTATIP__SESSION__MAX_ALLOWANCE=200 instatip config
//! ```

use clap::{Parser, Subcommand};
use instatip_types::Amount;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod display;

use commands::{demo, score};
use config::{AppConfig, LoggingConfig};

/// InstaTip CLI - bounded tipping sessions with single-shot settlement
#[derive(Parser)]
#[command(name = "instatip")]
#[command(version)]
#[command(about = "Instant off-chain tips, settled once", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file (toml, json or yaml)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a tipping session from open to settlement
    Demo {
        /// Owner address for the session
        #[arg(long, default_value = "0x1234...5678")]
        owner: String,

        /// Session allowance (defaults to the configured allowance)
        #[arg(long)]
        allowance: Option<Amount>,

        /// Number of settlement attempts the network should fail first
        #[arg(long, default_value = "0")]
        fail_settlements: usize,
    },

    /// Score content and suggest a tip
    Score {
        /// Text to analyze
        text: String,

        /// Print the analysis as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration
    Config,
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let app_config = AppConfig::load(cli.config.as_deref())?;
    init_tracing(&app_config.logging);

    match cli.command {
        Commands::Demo {
            owner,
            allowance,
            fail_settlements,
        } => {
            demo::run_demo(
                &app_config,
                demo::DemoOptions {
                    owner,
                    allowance,
                    fail_settlements,
                },
            )
            .await?;
        }
        Commands::Score { text, json } => {
            score::run_score(&app_config, &text, json)?;
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&app_config)?);
        }
    }

    Ok(())
}

//! CLI definitions and command implementations for explorer-kit.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use url::Url;

use crate::chain::Connection;
use crate::config::load_config;
use crate::context::AppContext;
use crate::error::Error;
use crate::growthbook::FileStore;

pub mod init;
pub mod scan_report;
pub mod switch_chain;
pub mod track;

/// explorer-kit — wallet chain negotiation and experiment exposure tracking.
#[derive(Debug, Parser)]
#[command(name = "explorer-kit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate a default TOML configuration file.
    Init {
        /// Output path for the configuration file.
        #[arg(short, long, default_value = "config.toml")]
        output: PathBuf,

        /// Overwrite the file if it already exists.
        #[arg(long, default_value_t = false)]
        force: bool,
    },

    /// Switch the connected wallet to the configured chain, registering it if needed.
    SwitchChain {
        /// Path to the TOML configuration file.
        #[arg(short, long, env = "CONFIG", default_value = "config.toml")]
        config: PathBuf,

        /// JSON-RPC endpoint of the wallet bridge.
        #[arg(long, env = "WALLET_URL")]
        wallet_url: Url,

        /// Connected account address; without it the wallet counts as disconnected.
        #[arg(long, env = "WALLET_ACCOUNT")]
        account: Option<String>,

        /// Chain the wallet currently reports.
        #[arg(long)]
        wallet_chain_id: Option<u64>,
    },

    /// Report a variant assignment, once per experiment.
    Track {
        /// Path to the TOML configuration file.
        #[arg(short, long, env = "CONFIG", default_value = "config.toml")]
        config: PathBuf,

        /// Experiment key.
        experiment: String,

        /// Assigned variant (JSON value, or a plain string).
        variant: String,
    },

    /// Fetch the SolidityScan report of a contract.
    ScanReport {
        /// Path to the TOML configuration file.
        #[arg(short, long, env = "CONFIG", default_value = "config.toml")]
        config: PathBuf,

        /// Contract address.
        hash: String,
    },
}

/// Load configuration and initialise the application context for `connection`.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded.
pub fn load_context(
    config_path: &Path,
    connection: impl FnOnce(&crate::config::Config) -> Connection,
) -> Result<AppContext, Error> {
    let config = load_config(config_path)?;
    let store = Arc::new(FileStore::new(&config.storage.path));
    let connection = connection(&config);
    Ok(AppContext::init(config, store, &connection))
}

//! explorer-kit CLI
//!
//! ```sh
//! explorer-kit init                                   # Generate default config.toml
//! explorer-kit switch-chain --wallet-url http://127.0.0.1:8545 --account 0x…
//! explorer-kit track test_value '"variant-b"'
//! explorer-kit scan-report 0x4200000000000000000000000000000000000006
//! ```

use clap::Parser;
use dotenvy::dotenv;
use explorer_kit::cmd::{self, Cli, Commands};
use explorer_kit::telemetry::Telemetry;

#[tokio::main(flavor = "current_thread")]
#[allow(clippy::print_stderr)]
async fn main() {
    let cli = Cli::parse();

    // Load .env variables
    dotenv().ok();
    // An already-installed provider is fine.
    let _ = rustls::crypto::CryptoProvider::install_default(
        rustls::crypto::ring::default_provider(),
    );

    let _telemetry = Telemetry::new()
        .with_name(env!("CARGO_PKG_NAME"))
        .with_version(env!("CARGO_PKG_VERSION"))
        .register();

    let result = match cli.command {
        Commands::Init { output, force } => cmd::init::run(&output, force),
        Commands::SwitchChain {
            config,
            wallet_url,
            account,
            wallet_chain_id,
        } => cmd::switch_chain::run(&config, &wallet_url, account, wallet_chain_id).await,
        Commands::Track {
            config,
            experiment,
            variant,
        } => cmd::track::run(&config, &experiment, &variant),
        Commands::ScanReport { config, hash } => cmd::scan_report::run(&config, &hash).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

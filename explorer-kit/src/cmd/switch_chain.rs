//! `explorer-kit switch-chain` command — point the connected wallet at the
//! explorer's chain.

use std::path::Path;
use std::sync::Arc;

use url::Url;

use super::load_context;
use crate::chain::{Account, Connection, HttpWalletProvider, WalletProvider};
use crate::error::Error;

/// Execute the `switch-chain` command.
///
/// # Errors
///
/// Returns an error if configuration loading fails or the wallet rejects the
/// request with anything other than an unknown-chain error.
#[allow(clippy::print_stdout)]
pub async fn run(
    config_path: &Path,
    wallet_url: &Url,
    account: Option<String>,
    wallet_chain_id: Option<u64>,
) -> Result<(), Error> {
    let ctx = load_context(config_path, |config| {
        let provider: Arc<dyn WalletProvider> = Arc::new(HttpWalletProvider::new(wallet_url.clone()));
        let account = account.map_or_else(Account::disconnected, |address| {
            Account::connected(address, wallet_chain_id)
        });
        Connection::resolve(
            config.features.blockchain_interaction.enabled,
            account,
            Some(provider),
        )
    })?;

    match ctx.negotiator().switch_or_add_chain().await? {
        Some(result) => println!("{result}"),
        None => tracing::info!("wallet not connected, nothing to do"),
    }
    Ok(())
}

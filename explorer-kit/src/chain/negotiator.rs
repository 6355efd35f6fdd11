//! Switch the connected wallet to the explorer's chain, registering the chain
//! first if the wallet has never seen it.

use std::sync::Arc;

use super::account::{Account, Connection};
use super::provider::{ProviderError, RequestResult, RpcRequest, WalletProvider};
use super::spec::ChainSpec;
use crate::config::Config;

/// Bound switch-or-add operation for one pair of wallet/provider handles.
///
/// Cloning is cheap and keeps the same handles; a new value is only needed
/// when the connection changes (see [`ChainNegotiator::rebind`]).
#[derive(Debug, Clone)]
pub struct ChainNegotiator {
    config: Arc<Config>,
    wallet: Option<Account>,
    provider: Option<Arc<dyn WalletProvider>>,
}

impl ChainNegotiator {
    /// Binds the negotiator to the handles of `connection`.
    #[must_use]
    pub fn new(config: Arc<Config>, connection: &Connection) -> Self {
        Self {
            config,
            wallet: connection.wallet.clone(),
            provider: connection.provider.clone(),
        }
    }

    /// Whether this negotiator is bound to exactly the handles of `connection`.
    #[must_use]
    pub fn same_handles(&self, connection: &Connection) -> bool {
        let same_provider = match (&self.provider, &connection.provider) {
            (Some(ours), Some(theirs)) => {
                Arc::as_ptr(ours).cast::<()>() == Arc::as_ptr(theirs).cast::<()>()
            }
            (None, None) => true,
            _ => false,
        };
        same_provider && self.wallet == connection.wallet
    }

    /// Re-binds to `connection` if its handles differ. Returns `true` when the
    /// negotiator changed.
    pub fn rebind(&mut self, connection: &Connection) -> bool {
        if self.same_handles(connection) {
            return false;
        }
        self.wallet.clone_from(&connection.wallet);
        self.provider.clone_from(&connection.provider);
        true
    }

    /// Ask the wallet to switch to the configured chain, registering it when
    /// the wallet reports the chain as unknown.
    ///
    /// Returns `Ok(None)` without contacting the wallet when either handle is
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns the switch error unchanged unless it carries the
    /// unrecognized-chain code, and the registration error unchanged if the
    /// fallback itself fails. Nothing is retried.
    pub async fn switch_or_add_chain(&self) -> Result<Option<RequestResult>, ProviderError> {
        let (Some(_), Some(provider)) = (&self.wallet, &self.provider) else {
            tracing::debug!("wallet not connected, skipping chain switch");
            return Ok(None);
        };

        let chain = ChainSpec::from_config(&self.config);
        let chain_id = chain.hex_id();
        tracing::debug!(%chain_id, "requesting wallet chain switch");

        match provider.request(RpcRequest::switch_chain(&chain.switch_params())).await {
            Ok(result) => Ok(Some(result)),
            Err(error) if error.is_unrecognized_chain() => {
                tracing::info!(%chain_id, chain_name = %chain.name, "chain unknown to wallet, registering it");
                let result = provider
                    .request(RpcRequest::add_chain(&chain.add_params()))
                    .await
                    .inspect_err(|e| tracing::warn!(%chain_id, error = %e, "chain registration failed"))?;
                Ok(Some(result))
            }
            Err(error) => {
                tracing::warn!(%chain_id, %error, "chain switch failed");
                Err(error)
            }
        }
    }
}

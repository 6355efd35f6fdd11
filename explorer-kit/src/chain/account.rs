//! Wallet connection state.
//!
//! When blockchain interaction is switched off the explorer never talks to a
//! wallet; [`Account::disconnected`] stands in for whatever the wallet
//! reports so that every consumer sees a quiescent "not connected" state.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::provider::WalletProvider;

/// Lifecycle of the wallet connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    /// Connected to an account.
    Connected,
    /// First connection in progress.
    Connecting,
    /// Restoring a previous session.
    Reconnecting,
    /// No account connected.
    #[default]
    Disconnected,
}

/// The account a wallet exposes to the explorer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Active address.
    pub address: Option<String>,
    /// Chain the wallet is currently on.
    pub chain_id: Option<u64>,
    /// Connection lifecycle.
    pub status: ConnectionStatus,
}

impl Account {
    /// A connected account.
    pub fn connected(address: impl Into<String>, chain_id: Option<u64>) -> Self {
        Self {
            address: Some(address.into()),
            chain_id,
            status: ConnectionStatus::Connected,
        }
    }

    /// The fallback state used when blockchain interaction is disabled.
    #[must_use]
    pub fn disconnected() -> Self {
        Self::default()
    }

    /// Whether the account is usable for wallet requests.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected && self.address.is_some()
    }
}

/// Wallet and provider handles as seen by the rest of the application.
#[derive(Debug, Clone, Default)]
pub struct Connection {
    /// Connected wallet account, if any.
    pub wallet: Option<Account>,
    /// Provider able to service requests, if any.
    pub provider: Option<Arc<dyn WalletProvider>>,
}

impl Connection {
    /// Resolve the handles, honouring the blockchain-interaction switch.
    ///
    /// A wallet handle is exposed only for a connected account, and neither
    /// handle is exposed while interaction is disabled.
    #[must_use]
    pub fn resolve(
        interaction_enabled: bool,
        account: Account,
        provider: Option<Arc<dyn WalletProvider>>,
    ) -> Self {
        let account = if interaction_enabled {
            account
        } else {
            Account::disconnected()
        };
        if !account.is_connected() {
            return Self::default();
        }
        Self {
            wallet: Some(account),
            provider,
        }
    }

    /// Whether both handles are present.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.wallet.is_some() && self.provider.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::provider::{ProviderError, RequestResult, RpcRequest};

    #[derive(Debug)]
    struct NullProvider;

    #[async_trait::async_trait]
    impl WalletProvider for NullProvider {
        async fn request(&self, _request: RpcRequest) -> Result<RequestResult, ProviderError> {
            Ok(serde_json::Value::Null)
        }
    }

    fn provider() -> Option<Arc<dyn WalletProvider>> {
        Some(Arc::new(NullProvider))
    }

    #[test]
    fn disconnected_fallback_shape() {
        let account = Account::disconnected();
        assert_eq!(account.address, None);
        assert_eq!(account.chain_id, None);
        assert_eq!(account.status, ConnectionStatus::Disconnected);
        assert!(!account.is_connected());
    }

    #[test]
    fn connected_account_yields_both_handles() {
        let connection = Connection::resolve(true, Account::connected("0xabc", Some(1)), provider());
        assert!(connection.is_ready());
    }

    #[test]
    fn disabled_interaction_hides_everything() {
        let connection = Connection::resolve(false, Account::connected("0xabc", Some(1)), provider());
        assert!(connection.wallet.is_none());
        assert!(connection.provider.is_none());
    }

    #[test]
    fn pending_connection_is_not_a_wallet() {
        let account = Account {
            address: Some("0xabc".to_owned()),
            chain_id: None,
            status: ConnectionStatus::Reconnecting,
        };
        let connection = Connection::resolve(true, account, provider());
        assert!(!connection.is_ready());
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_value(Account::disconnected()).expect("serialize");
        assert_eq!(json["status"], "disconnected");
    }
}

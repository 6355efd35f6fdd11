//! Application context built once at startup.

use std::sync::Arc;

use crate::chain::{ChainNegotiator, Connection};
use crate::config::Config;
use crate::growthbook::{ExperimentClient, KeyValueStore};

/// Long-lived clients shared by the explorer's commands.
///
/// Built once by [`AppContext::init`]; dropping it releases everything.
#[derive(Debug, Clone)]
pub struct AppContext {
    config: Arc<Config>,
    experiments: Option<ExperimentClient>,
    negotiator: ChainNegotiator,
}

impl AppContext {
    /// Initialise the experimentation client (if enabled) and bind the chain
    /// negotiator to `connection`.
    #[must_use]
    pub fn init(config: Config, store: Arc<dyn KeyValueStore>, connection: &Connection) -> Self {
        let config = Arc::new(config);
        let experiments = ExperimentClient::init(&config, store);
        let negotiator = ChainNegotiator::new(Arc::clone(&config), connection);
        Self {
            config,
            experiments,
            negotiator,
        }
    }

    /// Static configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Experimentation client, absent when the feature is disabled.
    #[must_use]
    pub const fn experiments(&self) -> Option<&ExperimentClient> {
        self.experiments.as_ref()
    }

    /// Chain negotiator for the current connection.
    #[must_use]
    pub const fn negotiator(&self) -> &ChainNegotiator {
        &self.negotiator
    }

    /// Follow a change of wallet connection.
    pub fn connection_changed(&mut self, connection: &Connection) {
        if self.negotiator.rebind(connection) {
            tracing::debug!(ready = connection.is_ready(), "wallet connection changed");
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::chain::Account;
    use crate::growthbook::MemoryStore;

    fn config(growthbook_enabled: bool) -> Config {
        Config::from_toml(&format!(
            r#"
            [app]
            base_url = "https://explorer.example.com"

            [chain]
            id = 1
            name = "Ethereum"
            rpc_urls = ["https://eth.example.com"]

            [chain.currency]
            name = "Ether"
            symbol = "ETH"
            decimals = 18

            [features.growthbook]
            enabled = {growthbook_enabled}
            client_key = "sdk-abc"
            "#
        ))
        .expect("test config")
    }

    #[tokio::test]
    async fn disconnected_context_is_quiescent() {
        let ctx = AppContext::init(config(false), Arc::new(MemoryStore::new()), &Connection::default());

        assert!(ctx.experiments().is_none());
        assert_eq!(ctx.config().chain.id, 1);
        assert_eq!(ctx.negotiator().switch_or_add_chain().await.expect("no-op"), None);
    }

    #[test]
    fn enabled_experiments_are_threaded_through() {
        let ctx = AppContext::init(config(true), Arc::new(MemoryStore::new()), &Connection::default());
        let experiments = ctx.experiments().expect("enabled");
        assert!(experiments.on_assignment("hero", &json!("b")));
        assert!(!experiments.on_assignment("hero", &json!("b")));
    }

    #[test]
    fn connection_change_rebinds_negotiator() {
        let mut ctx = AppContext::init(config(false), Arc::new(MemoryStore::new()), &Connection::default());
        let connected = Connection {
            wallet: Some(Account::connected("0xabc", Some(1))),
            provider: None,
        };
        assert!(!ctx.negotiator().same_handles(&connected));
        ctx.connection_changed(&connected);
        assert!(ctx.negotiator().same_handles(&connected));
    }
}

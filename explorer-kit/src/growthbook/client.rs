//! Experimentation client setup.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use super::storage::KeyValueStore;
use super::tracker::{ExposureSink, ExposureTracker, TracingSink};
use crate::config::Config;

/// Client identifier sent as the `id` targeting attribute.
pub const DEFAULT_CLIENT_ID: &str = "default-client-id";

/// Targeting attributes of this client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attributes {
    /// Client identifier.
    pub id: String,
    /// Chain the explorer serves.
    pub chain_id: u64,
}

/// Experimentation client, present only while the feature is enabled.
#[derive(Debug, Clone)]
pub struct ExperimentClient {
    api_host: String,
    client_key: String,
    enable_dev_mode: bool,
    attributes: Attributes,
    tracker: ExposureTracker,
}

impl ExperimentClient {
    /// Build the client reporting exposures through [`TracingSink`].
    ///
    /// Returns `None`, without touching `store`, when the feature is disabled.
    #[must_use]
    pub fn init(config: &Config, store: Arc<dyn KeyValueStore>) -> Option<Self> {
        Self::init_with_sink(config, store, Arc::new(TracingSink::new()))
    }

    /// Build the client with a custom exposure sink.
    ///
    /// An enabled feature without a client key also yields `None`.
    #[must_use]
    pub fn init_with_sink(
        config: &Config,
        store: Arc<dyn KeyValueStore>,
        sink: Arc<dyn ExposureSink>,
    ) -> Option<Self> {
        let feature = &config.features.growthbook;
        if !feature.enabled {
            return None;
        }
        let Some(client_key) = feature.client_key.clone() else {
            tracing::warn!("growthbook is enabled without a client key, experiments stay off");
            return None;
        };
        tracing::debug!(api_host = %feature.api_host, "experimentation client enabled");
        Some(Self {
            api_host: feature.api_host.trim_end_matches('/').to_owned(),
            client_key,
            enable_dev_mode: config.app.is_dev,
            attributes: Attributes {
                id: DEFAULT_CLIENT_ID.to_owned(),
                chain_id: config.chain.id,
            },
            tracker: ExposureTracker::new(store, sink, feature.storage_limit),
        })
    }

    /// Tracking callback: invoked whenever a variant is assigned for an experiment.
    /// Returns whether this was the first exposure to `experiment_key`.
    pub fn on_assignment(&self, experiment_key: &str, variant: &Value) -> bool {
        self.tracker.track(experiment_key, variant)
    }

    /// Feature definitions endpoint for this client key.
    #[must_use]
    pub fn features_url(&self) -> String {
        format!("{}/api/features/{}", self.api_host, self.client_key)
    }

    /// Targeting attributes.
    #[must_use]
    pub const fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Whether the SDK dev mode is on.
    #[must_use]
    pub const fn dev_mode(&self) -> bool {
        self.enable_dev_mode
    }

    /// Underlying exposure tracker.
    #[must_use]
    pub const fn tracker(&self) -> &ExposureTracker {
        &self.tracker
    }
}

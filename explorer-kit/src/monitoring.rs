//! Fire-and-forget monitoring beacons.
//!
//! [`MonitoringBeacon`] reports API responses that failed a runtime shape
//! check to the explorer's own node API. Delivery is best effort: the response
//! is ignored and failures are only logged. Pending beacons are tracked so a
//! short-lived process can wait for them with [`MonitoringBeacon::flush`].

use serde::Serialize;
use tokio_util::task::TaskTracker;
use url::Url;

use crate::error::Error;

/// Path receiving invalid-schema reports, relative to the explorer base URL.
pub const INVALID_SCHEMA_PATH: &str = "/node-api/monitoring/invalid-api-schema";

#[derive(Debug, Serialize)]
struct InvalidSchemaReport<'a> {
    resource: &'a str,
    url: &'a str,
}

/// Sender of monitoring beacons.
#[derive(Debug, Clone)]
pub struct MonitoringBeacon {
    endpoint: Url,
    client: reqwest::Client,
    tasks: TaskTracker,
}

impl MonitoringBeacon {
    /// Beacon posting to [`INVALID_SCHEMA_PATH`] under `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `base_url` is not a valid base URL.
    pub fn new(base_url: &str, client: reqwest::Client) -> Result<Self, Error> {
        let endpoint = Url::parse(base_url)
            .and_then(|base| base.join(INVALID_SCHEMA_PATH))
            .map_err(|e| Error::config_with(format!("invalid monitoring base URL '{base_url}'"), e))?;
        Ok(Self {
            endpoint,
            client,
            tasks: TaskTracker::new(),
        })
    }

    /// Report that `resource`, fetched from `url`, returned an unexpected shape.
    ///
    /// Returns immediately; must be called from within a Tokio runtime.
    pub fn report_invalid_schema(&self, resource: &str, url: &str) {
        let request = self
            .client
            .post(self.endpoint.clone())
            .json(&InvalidSchemaReport { resource, url });
        let resource = resource.to_owned();
        self.tasks.spawn(async move {
            if let Err(error) = request.send().await {
                tracing::debug!(%resource, %error, "monitoring beacon failed");
            }
        });
    }

    /// Wait until every beacon sent so far has completed.
    pub async fn flush(&self) {
        self.tasks.close();
        self.tasks.wait().await;
        self.tasks.reopen();
    }
}

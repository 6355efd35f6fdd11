//! `explorer-kit scan-report` command — fetch a contract's SolidityScan report.

use std::path::Path;

use crate::config::load_config;
use crate::error::Error;
use crate::monitoring::MonitoringBeacon;
use crate::solidity_scan::ReportClient;

/// Execute the `scan-report` command.
///
/// Pending monitoring beacons are flushed before returning, whatever the outcome.
///
/// # Errors
///
/// Returns an error if configuration loading or the fetch fails, or if the
/// response does not have the report shape.
#[allow(clippy::print_stdout)]
pub async fn run(config_path: &Path, hash: &str) -> Result<(), Error> {
    let config = load_config(config_path)?;
    let http = reqwest::Client::new();
    let beacon = MonitoringBeacon::new(&config.app.base_url, http.clone())?;
    let client = ReportClient::new(&config.app.base_url, http, beacon)?;

    let report = client.fetch(hash).await;
    client.beacon().flush().await;

    match report? {
        Some(report) => println!("{}", serde_json::to_string_pretty(&report)?),
        None => tracing::info!("no contract hash given, nothing fetched"),
    }
    Ok(())
}

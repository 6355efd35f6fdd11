//! SolidityScan security report for a verified contract.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Error;
use crate::monitoring::MonitoringBeacon;

/// API resource name used in monitoring reports.
pub const RESOURCE_NAME: &str = "contract_solidity_scan_report";

/// Number of findings per severity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityDistribution {
    /// Critical findings.
    pub critical: f64,
    /// Gas optimisation findings.
    pub gas: f64,
    /// High severity findings.
    pub high: f64,
    /// Informational findings.
    pub informational: f64,
    /// Low severity findings.
    pub low: f64,
    /// Medium severity findings.
    pub medium: f64,
}

/// Summary block of a scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSummary {
    /// Overall score.
    pub score_v2: String,
    /// Findings by severity.
    pub issue_severity_distribution: SeverityDistribution,
}

/// Body of a scan report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Contract name as seen by the scanner.
    pub contractname: String,
    /// Scanner status string.
    pub scan_status: String,
    /// Score and findings.
    pub scan_summary: ScanSummary,
    /// Link to the full report on the scanner's site.
    pub scanner_reference_url: String,
}

/// Response of the SolidityScan report endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolidityScanReport {
    /// The report.
    pub scan_report: ScanReport,
}

/// Fetches SolidityScan reports from the explorer API.
#[derive(Debug, Clone)]
pub struct ReportClient {
    api_base: Url,
    client: reqwest::Client,
    beacon: MonitoringBeacon,
}

impl ReportClient {
    /// Client for the explorer API rooted at `api_base`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `api_base` is not a valid URL.
    pub fn new(api_base: &str, client: reqwest::Client, beacon: MonitoringBeacon) -> Result<Self, Error> {
        let api_base = Url::parse(api_base)
            .map_err(|e| Error::config_with(format!("invalid API base URL '{api_base}'"), e))?;
        Ok(Self {
            api_base,
            client,
            beacon,
        })
    }

    /// Monitoring beacon used for invalid responses.
    #[must_use]
    pub const fn beacon(&self) -> &MonitoringBeacon {
        &self.beacon
    }

    /// Report endpoint for the contract at `hash`.
    ///
    /// `hash` always lands in a single escaped path segment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the API base URL cannot carry a path.
    pub fn report_url(&self, hash: &str) -> Result<Url, Error> {
        let mut url = self.api_base.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|()| Error::config(format!("API base URL '{}' cannot carry a path", self.api_base)))?
            .clear()
            .extend(["api", "v2", "smart-contracts", hash, "solidityscan-report"]);
        Ok(url)
    }

    /// Fetch the report for the contract at `hash`.
    ///
    /// An empty hash performs no request and yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on transport or HTTP status failures, and
    /// [`Error::InvalidSchema`] (after firing a monitoring beacon) when the
    /// body does not have the report shape.
    pub async fn fetch(&self, hash: &str) -> Result<Option<SolidityScanReport>, Error> {
        if hash.is_empty() {
            return Ok(None);
        }
        let url = self.report_url(hash)?;
        let body = self
            .client
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        match serde_json::from_slice(&body) {
            Ok(report) => Ok(Some(report)),
            Err(error) => {
                tracing::warn!(resource = RESOURCE_NAME, %url, %error, "invalid response schema");
                self.beacon.report_invalid_schema(RESOURCE_NAME, url.as_str());
                Err(Error::InvalidSchema {
                    resource: RESOURCE_NAME,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::monitoring::INVALID_SCHEMA_PATH;

    const HASH: &str = "0x4200000000000000000000000000000000000006";

    fn report_path() -> String {
        format!("/api/v2/smart-contracts/{HASH}/solidityscan-report")
    }

    fn client(server: &mockito::Server) -> ReportClient {
        let http = reqwest::Client::new();
        let beacon = MonitoringBeacon::new(&server.url(), http.clone()).expect("beacon");
        ReportClient::new(&server.url(), http, beacon).expect("client")
    }

    #[test]
    fn hash_stays_in_its_path_segment() {
        let http = reqwest::Client::new();
        let base = "https://explorer.example.com/";
        let beacon = MonitoringBeacon::new(base, http.clone()).expect("beacon");
        let client = ReportClient::new(base, http, beacon).expect("client");

        let url = client.report_url(HASH).expect("url");
        assert_eq!(url.as_str(), format!("https://explorer.example.com{}", report_path()));

        let url = client.report_url("../../x?q=1#frag").expect("url");
        assert_eq!(
            url.path(),
            "/api/v2/smart-contracts/..%2F..%2Fx%3Fq=1%23frag/solidityscan-report"
        );
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[tokio::test]
    async fn parses_valid_report() {
        let mut server = mockito::Server::new_async().await;
        let body = json!({
            "scan_report": {
                "contractname": "WETH9",
                "scan_status": "scan_done",
                "scan_summary": {
                    "score_v2": "87.5",
                    "issue_severity_distribution": {
                        "critical": 0, "gas": 3, "high": 0,
                        "informational": 5, "low": 1, "medium": 0
                    }
                },
                "scanner_reference_url": "https://solidityscan.com/report"
            }
        });
        let _report = server
            .mock("GET", report_path().as_str())
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;
        let beacon = server
            .mock("POST", INVALID_SCHEMA_PATH)
            .expect(0)
            .create_async()
            .await;

        let client = client(&server);
        let report = client.fetch(HASH).await.expect("fetch").expect("report");
        client.beacon().flush().await;

        assert_eq!(report.scan_report.contractname, "WETH9");
        assert!((report.scan_report.scan_summary.issue_severity_distribution.gas - 3.0).abs() < f64::EPSILON);
        beacon.assert_async().await;
    }

    #[tokio::test]
    async fn invalid_shape_fires_beacon() {
        let mut server = mockito::Server::new_async().await;
        let _report = server
            .mock("GET", report_path().as_str())
            .with_body(r#"{"scan_report":{"contractname":"WETH9"}}"#)
            .create_async()
            .await;
        let expected_url = format!("{}{}", server.url(), report_path());
        let beacon = server
            .mock("POST", INVALID_SCHEMA_PATH)
            .match_body(mockito::Matcher::Json(json!({
                "resource": RESOURCE_NAME,
                "url": expected_url,
            })))
            .expect(1)
            .create_async()
            .await;

        let client = client(&server);
        let err = client.fetch(HASH).await.expect_err("invalid schema");
        client.beacon().flush().await;

        assert!(matches!(err, Error::InvalidSchema { resource: RESOURCE_NAME }));
        beacon.assert_async().await;
    }

    #[tokio::test]
    async fn empty_hash_makes_no_request() {
        let mut server = mockito::Server::new_async().await;
        let any = server
            .mock("GET", mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        assert!(client(&server).fetch("").await.expect("no-op").is_none());
        any.assert_async().await;
    }

    #[tokio::test]
    async fn http_errors_do_not_fire_beacon() {
        let mut server = mockito::Server::new_async().await;
        let _report = server
            .mock("GET", report_path().as_str())
            .with_status(404)
            .create_async()
            .await;
        let beacon = server
            .mock("POST", INVALID_SCHEMA_PATH)
            .expect(0)
            .create_async()
            .await;

        let client = client(&server);
        let err = client.fetch(HASH).await.expect_err("not found");
        client.beacon().flush().await;

        assert!(matches!(err, Error::Http(_)));
        beacon.assert_async().await;
    }
}

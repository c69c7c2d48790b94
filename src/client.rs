// src/client.rs
//! HTTP client for the upstream county endpoint, behind the `RiskSource`
//! seam the coordinator polls through.

use std::time::Duration;

use async_trait::async_trait;
use metrics::histogram;

use crate::config::CountyCode;
use crate::dataset::{CountyRisksPayload, RiskDataset};
use crate::error::FetchError;
use crate::metrics::ensure_metrics_described;

pub const DEFAULT_BASE_URL: &str = "https://pollens.fr";
/// The upstream is slow on cold caches; match its worst observed latency.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(240);

/// Anything the coordinator can poll for a county snapshot.
#[async_trait]
pub trait RiskSource: Send + Sync {
    async fn fetch(&self, county: &CountyCode) -> Result<RiskDataset, FetchError>;
    fn name(&self) -> &'static str;
}

/// Client for the public pollens.fr risk API.
///
/// One GET per fetch, no retries. County codes are taken as given; validity
/// is the caller's concern.
#[derive(Clone)]
pub struct PollensClient {
    session: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl PollensClient {
    /// `session` is the host-owned transport; clones of a `reqwest::Client`
    /// share one connection pool.
    pub fn new(session: reqwest::Client) -> Self {
        ensure_metrics_described();
        Self {
            session,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn county_url(&self, county: &CountyCode) -> String {
        format!("{}/risks/thea/counties/{}", self.base_url, county)
    }

    fn transport_error(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::Network(e)
        }
    }

    async fn fetch_county(&self, county: &CountyCode) -> Result<RiskDataset, FetchError> {
        let url = self.county_url(county);
        tracing::debug!(target: "pollens", %url, "fetching county risks");
        let started = std::time::Instant::now();

        let resp = self
            .session
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        // The upstream intermittently labels JSON bodies as text, so the
        // content-type header is ignored and the raw bytes are parsed.
        let body = resp.bytes().await.map_err(|e| self.transport_error(e))?;
        let payload: CountyRisksPayload = serde_json::from_slice(&body)?;

        histogram!("pollens_fetch_ms").record(started.elapsed().as_secs_f64() * 1_000.0);
        tracing::debug!(
            target: "pollens",
            county = %county,
            risks = payload.risks.len(),
            "county document received"
        );

        Ok(RiskDataset::from_payload(county.clone(), payload))
    }
}

#[async_trait]
impl RiskSource for PollensClient {
    async fn fetch(&self, county: &CountyCode) -> Result<RiskDataset, FetchError> {
        self.fetch_county(county).await
    }

    fn name(&self) -> &'static str {
        "pollens.fr"
    }
}

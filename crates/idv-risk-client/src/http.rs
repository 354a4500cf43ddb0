use std::time::Duration;

use async_trait::async_trait;

use crate::{DegradedRisk, RiskClient, RiskOutcome, RiskResponseWire, DEFAULT_TIMEOUT};

/// Risk client backed by an HTTP call to the external risk evaluation
/// service. Every failure mode - connection refused, timeout, non-2xx,
/// malformed JSON, a response missing the fields we need - collapses to
/// the same `Degraded` outcome; we deliberately don't distinguish them
/// upstream because the state machine treats them identically.
pub struct HttpRiskClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRiskClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("reqwest client builds with a bounded timeout");
        Self { client, base_url: base_url.into() }
    }
}

#[async_trait]
impl RiskClient for HttpRiskClient {
    async fn evaluate(&self, signals: serde_json::Value) -> RiskOutcome {
        let url = format!("{}/v1/risk/evaluate", self.base_url.trim_end_matches('/'));

        let response = match self.client.post(&url).json(&signals).send().await {
            Ok(resp) => resp,
            Err(err) if err.is_timeout() => {
                tracing::warn!(error = %err, "risk engine call timed out");
                return RiskOutcome::Degraded(DegradedRisk::new("risk_engine_timeout"));
            }
            Err(err) => {
                tracing::warn!(error = %err, "risk engine call failed");
                return RiskOutcome::Degraded(DegradedRisk::with_detail(
                    "risk_engine_unavailable",
                    err.to_string(),
                ));
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            tracing::warn!(%status, "risk engine returned a non-success status");
            return RiskOutcome::Degraded(DegradedRisk::with_detail(
                "risk_engine_error_status",
                status.to_string(),
            ));
        }

        match response.json::<RiskResponseWire>().await {
            Ok(wire) => RiskOutcome::Ok(wire.into()),
            Err(err) => {
                tracing::warn!(error = %err, "risk engine response did not match the expected schema");
                RiskOutcome::Degraded(DegradedRisk::with_detail("risk_engine_malformed_response", err.to_string()))
            }
        }
    }
}

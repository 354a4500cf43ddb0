//! Client for the external risk evaluation service.
//!
//! The risk engine is a collaborator outside this system's control: it can
//! be slow, down, or return a payload we don't understand. None of that is
//! an error in the Rust sense — `evaluate` always returns, tagging the
//! result as either a usable [`RiskResult`] or a [`DegradedRisk`] the state
//! machine routes to `risk_failed` instead of propagating an exception.

pub mod http;
#[cfg(any(test, feature = "test-util"))]
pub mod test_util;

pub use http::HttpRiskClient;

use std::time::Duration;

use async_trait::async_trait;
use idv_types::RiskScores;
use serde::{Deserialize, Serialize};

/// Default bounded timeout for a risk evaluation call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// The raw per-dimension scores and supporting evidence the risk engine
/// hands back. Fusion into a single composite score and a decision
/// recommendation happens locally, in `idv-fusion` — this result only
/// carries what the external service actually measured. Built from
/// [`RiskResponseWire`], which mirrors the service's actual JSON shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskResult {
    pub scores: RiskScores,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub jurisdiction: Option<String>,
    #[serde(default)]
    pub reason_codes: Vec<String>,
    #[serde(default)]
    pub models: serde_json::Value,
    #[serde(default)]
    pub policy_version: Option<String>,
}

/// The risk engine's actual wire schema: an overall `final_risk` score and
/// band the engine itself fused, plus optional per-dimension scores we use
/// instead since fusion is this system's own responsibility. `final_risk`
/// and `decision` are accepted but not trusted — only the per-dimension
/// scores feed `idv-fusion`, falling back to the overall score when the
/// engine doesn't break it down.
#[derive(Debug, Clone, Deserialize)]
pub struct RiskResponseWire {
    pub final_risk: FinalRiskWire,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub jurisdiction: Option<String>,
    #[serde(default)]
    pub policy_version: Option<String>,
    #[serde(default)]
    pub fraud_score: Option<f64>,
    #[serde(default)]
    pub aml_score: Option<f64>,
    #[serde(default)]
    pub credit_score: Option<f64>,
    #[serde(default)]
    pub liquidity_score: Option<f64>,
    #[serde(default)]
    pub factors: Vec<String>,
    #[serde(default)]
    pub models: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FinalRiskWire {
    pub score: f64,
    #[serde(default)]
    #[allow(dead_code)]
    pub band: Option<String>,
}

impl From<RiskResponseWire> for RiskResult {
    fn from(wire: RiskResponseWire) -> Self {
        let overall = wire.final_risk.score;
        RiskResult {
            scores: RiskScores {
                fraud: wire.fraud_score.unwrap_or(overall),
                aml: wire.aml_score.unwrap_or(overall),
                credit: wire.credit_score.unwrap_or(overall),
                liquidity: wire.liquidity_score.unwrap_or(overall),
            },
            confidence: wire.confidence.unwrap_or(0.0),
            jurisdiction: wire.jurisdiction,
            reason_codes: wire.factors,
            models: wire.models,
            policy_version: wire.policy_version,
        }
    }
}

/// Why a risk evaluation could not be used. Never surfaced to the caller as
/// an error — it is a value the state machine transitions on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DegradedRisk {
    #[serde(rename = "error")]
    pub reason: String,
    #[serde(rename = "exception", default)]
    pub detail: Option<String>,
}

impl DegradedRisk {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into(), detail: None }
    }

    pub fn with_detail(reason: impl Into<String>, detail: impl Into<String>) -> Self {
        Self { reason: reason.into(), detail: Some(detail.into()) }
    }
}

/// The tagged outcome of a risk evaluation call. Deliberately not a
/// `Result` — a degraded evaluation is an expected, routine branch of the
/// state machine, not a failure to propagate with `?`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RiskOutcome {
    Ok(RiskResult),
    Degraded(DegradedRisk),
}

impl RiskOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }
}

/// Capability for evaluating risk signals. Injected into the engine rather
/// than reached for as a global, so tests can swap in a canned double.
#[async_trait]
pub trait RiskClient: Send + Sync {
    async fn evaluate(&self, signals: serde_json::Value) -> RiskOutcome;
}

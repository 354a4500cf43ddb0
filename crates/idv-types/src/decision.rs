//! The decision-facing closed vocabularies and the `DecisionPayload` shape
//! that `decision.finalised` events carry.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypesError;
use crate::ids::{CorrelationId, DecisionId, TenantId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionOutcome {
    Approve,
    Review,
    Decline,
}

impl DecisionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Review => "review",
            Self::Decline => "decline",
        }
    }

    /// Whether this outcome lets the subject proceed without further
    /// intervention — `approve` and `review` both do; only `decline` halts.
    pub fn can_proceed(&self) -> bool {
        !matches!(self, Self::Decline)
    }
}

impl fmt::Display for DecisionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DecisionOutcome {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(Self::Approve),
            "review" => Ok(Self::Review),
            "decline" => Ok(Self::Decline),
            other => Err(TypesError::UnknownDecisionOutcome(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskBand {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RiskBand {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            other => Err(TypesError::UnknownRiskBand(other.to_string())),
        }
    }
}

/// Jurisdiction drives both the fusion weighting and the AML decision
/// threshold. The original service treats jurisdiction as a free string;
/// `Other` preserves that escape hatch while giving the four named
/// jurisdictions exhaustive matching everywhere that matters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Jurisdiction {
    #[serde(alias = "AUSTRALIA")]
    Au,
    #[serde(alias = "EUROPE")]
    Eu,
    Gcc,
    #[serde(alias = "GULF")]
    Other(String),
}

impl Jurisdiction {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Au => "AU",
            Self::Eu => "EU",
            Self::Gcc => "GCC",
            Self::Other(s) => s.as_str(),
        }
    }
}

impl fmt::Display for Jurisdiction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Jurisdiction {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_uppercase().as_str() {
            "AU" | "AUSTRALIA" => Self::Au,
            "EU" | "EUROPE" => Self::Eu,
            "GCC" | "GULF" => Self::Gcc,
            _ => Self::Other(s.to_string()),
        })
    }
}

impl Default for Jurisdiction {
    fn default() -> Self {
        Self::Other("default".to_string())
    }
}

/// The four risk dimensions the risk engine scores independently and the
/// fusion formula combines.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RiskScores {
    #[serde(default)]
    pub fraud: f64,
    #[serde(default)]
    pub aml: f64,
    #[serde(default)]
    pub credit: f64,
    #[serde(default)]
    pub liquidity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionSubject {
    pub subject_type: String,
    pub subject_id: Option<String>,
    pub action: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionDetail {
    pub outcome: DecisionOutcome,
    pub confidence: f64,
    pub requires_human: bool,
    pub can_proceed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionPolicy {
    pub jurisdiction: String,
    pub policy_pack: String,
    pub policy_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskSummary {
    pub overall_risk: RiskBand,
    pub risk_score: f64,
    pub scores: RiskScores,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecisionLineage {
    pub supersedes_decision_id: Option<DecisionId>,
    pub overridden_by: Option<DecisionId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionAuthorityInfo {
    pub decided_by: String,
    pub service_version: String,
    #[serde(rename = "override")]
    pub is_override: bool,
}

/// The payload every `decision.finalised` event carries, byte-for-byte the
/// contract the investigator query surface and external consumers rely on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionPayload {
    pub event_id: String,
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
    pub decision_id: DecisionId,
    pub correlation_id: CorrelationId,
    pub tenant_id: TenantId,
    pub subject: DecisionSubject,
    pub decision: DecisionDetail,
    pub policy: DecisionPolicy,
    pub risk_summary: RiskSummary,
    pub reason_codes: Vec<String>,
    pub models: serde_json::Value,
    pub evidence: serde_json::Value,
    pub lineage: DecisionLineage,
    pub authority: DecisionAuthorityInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decline_cannot_proceed_others_can() {
        assert!(!DecisionOutcome::Decline.can_proceed());
        assert!(DecisionOutcome::Approve.can_proceed());
        assert!(DecisionOutcome::Review.can_proceed());
    }

    #[test]
    fn unrecognised_jurisdiction_falls_back_to_other() {
        let j: Jurisdiction = "UK".parse().unwrap();
        assert_eq!(j, Jurisdiction::Other("UK".to_string()));
    }

    #[test]
    fn bands_order_ascending_by_severity() {
        assert!(RiskBand::Low < RiskBand::Medium);
        assert!(RiskBand::Medium < RiskBand::High);
        assert!(RiskBand::High < RiskBand::Critical);
    }
}

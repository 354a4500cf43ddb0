//! The workflow aggregate: the single row of mutable state each inbound
//! event transacts against.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypesError;
use crate::ids::{TenantId, WorkflowId};

/// The fixed set of states the workflow state machine can occupy.
///
/// Kept as a closed enum (rather than the free-text column the capture
/// front-end's own store uses) so an impossible transition is a compile-time
/// non-event rather than a string typo discovered in production.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    Pending,
    SelfieUploaded,
    IdUploaded,
    MatchVerified,
    MatchFailed,
    RiskEvaluated,
    RiskFailed,
    OverrideApplied,
}

impl WorkflowState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::SelfieUploaded => "selfie_uploaded",
            Self::IdUploaded => "id_uploaded",
            Self::MatchVerified => "match_verified",
            Self::MatchFailed => "match_failed",
            Self::RiskEvaluated => "risk_evaluated",
            Self::RiskFailed => "risk_failed",
            Self::OverrideApplied => "override_applied",
        }
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for WorkflowState {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "selfie_uploaded" => Ok(Self::SelfieUploaded),
            "id_uploaded" => Ok(Self::IdUploaded),
            "match_verified" => Ok(Self::MatchVerified),
            "match_failed" => Ok(Self::MatchFailed),
            "risk_evaluated" => Ok(Self::RiskEvaluated),
            "risk_failed" => Ok(Self::RiskFailed),
            "override_applied" => Ok(Self::OverrideApplied),
            other => Err(TypesError::UnknownState(other.to_string())),
        }
    }
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self::Pending
    }
}

/// A single identity verification workflow: one row per applicant journey.
///
/// `data` is the open-ended bag the capture front-end and risk engine keep
/// extending (`selfie.liveness`, `match.raw`, `id_document.metadata`, ...);
/// known sub-fields are merged into it through typed helpers elsewhere in
/// the orchestrator rather than indexed ad hoc here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub id: WorkflowId,
    pub tenant_id: TenantId,
    pub state: WorkflowState,
    pub selfie_session_id: Option<String>,
    pub id_session_id: Option<String>,
    pub risk_score: Option<f64>,
    pub risk_band: Option<String>,
    /// Cached copy of the latest `decision.finalised` outcome. Never the
    /// source of truth — callers must re-derive it from the event ledger;
    /// this field exists only so `GET /v1/workflows/{id}` can answer
    /// without a ledger scan on the hot path.
    pub decision: Option<String>,
    pub requires_human: bool,
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Workflow {
    /// Construct a brand new workflow in the `pending` state.
    pub fn new(id: WorkflowId, tenant_id: TenantId) -> Self {
        let now = Utc::now();
        Self {
            id,
            tenant_id,
            state: WorkflowState::Pending,
            selfie_session_id: None,
            id_session_id: None,
            risk_score: None,
            risk_band: None,
            decision: None,
            requires_human: false,
            data: serde_json::json!({}),
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge a value into the workflow's free-form data bag under `key`,
    /// creating the bag's object representation if it was ever cleared.
    pub fn set_data(&mut self, key: &str, value: serde_json::Value) {
        if !self.data.is_object() {
            self.data = serde_json::json!({});
        }
        self.data[key] = value;
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_round_trips_through_its_string_form() {
        for state in [
            WorkflowState::Pending,
            WorkflowState::SelfieUploaded,
            WorkflowState::IdUploaded,
            WorkflowState::MatchVerified,
            WorkflowState::MatchFailed,
            WorkflowState::RiskEvaluated,
            WorkflowState::RiskFailed,
            WorkflowState::OverrideApplied,
        ] {
            let parsed: WorkflowState = state.as_str().parse().unwrap();
            assert_eq!(parsed, state);
        }
    }

    #[test]
    fn unknown_state_is_rejected() {
        assert!("not_a_state".parse::<WorkflowState>().is_err());
    }

    #[test]
    fn set_data_merges_rather_than_replaces() {
        let mut wf = Workflow::new(WorkflowId::new(), TenantId::from_raw("tenant_acme"));
        wf.set_data("selfie", serde_json::json!({"liveness": 0.9}));
        wf.set_data("match", serde_json::json!({"raw": 0.8}));
        assert_eq!(wf.data["selfie"]["liveness"], 0.9);
        assert_eq!(wf.data["match"]["raw"], 0.8);
    }
}

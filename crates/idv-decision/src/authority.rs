//! Private: the only code in the workspace allowed to construct a
//! `decision.finalised` payload and append it to the ledger. Everything
//! public in this crate funnels through [`build_and_append`] - there is no
//! other path to the event type anywhere else in the workspace.

use std::sync::Arc;

use chrono::Utc;
use idv_ledger::EventLedger;
use idv_types::{
    DecisionAuthorityInfo, DecisionDetail, DecisionId, DecisionLineage, DecisionOutcome,
    DecisionPayload, DecisionPolicy, DecisionSubject, RiskBand, RiskScores, RiskSummary,
    TenantId, WorkflowEvent, WorkflowId, DECISION_FINALISED_EVENT, SERVICE_VERSION,
};

use crate::error::DecisionResult;

pub(crate) struct FinalizeParams {
    pub workflow_id: WorkflowId,
    pub tenant_id: TenantId,
    pub correlation_id: idv_types::CorrelationId,
    pub subject_id: Option<String>,
    pub action: String,
    pub outcome: DecisionOutcome,
    pub requires_human: bool,
    pub confidence: f64,
    pub jurisdiction: String,
    pub policy_pack: String,
    pub policy_version: String,
    pub overall_risk: RiskBand,
    pub risk_score: f64,
    pub scores: RiskScores,
    pub reason_codes: Vec<String>,
    pub models: serde_json::Value,
    pub evidence: serde_json::Value,
    pub supersedes_decision_id: Option<DecisionId>,
    pub is_override: bool,
}

pub(crate) async fn build_and_append(
    ledger: &Arc<dyn EventLedger>,
    params: FinalizeParams,
) -> DecisionResult<DecisionPayload> {
    let decision_id = DecisionId::new();
    let payload = DecisionPayload {
        event_id: idv_types::EventId::new().to_string(),
        event_type: DECISION_FINALISED_EVENT.to_string(),
        timestamp: Utc::now(),
        decision_id,
        correlation_id: params.correlation_id,
        tenant_id: params.tenant_id.clone(),
        subject: DecisionSubject {
            subject_type: "user".to_string(),
            subject_id: params.subject_id,
            action: params.action,
        },
        decision: DecisionDetail {
            outcome: params.outcome,
            confidence: params.confidence,
            requires_human: params.requires_human,
            can_proceed: params.outcome.can_proceed(),
        },
        policy: DecisionPolicy {
            jurisdiction: params.jurisdiction,
            policy_pack: params.policy_pack,
            policy_version: params.policy_version,
        },
        risk_summary: RiskSummary {
            overall_risk: params.overall_risk,
            risk_score: params.risk_score,
            scores: params.scores,
        },
        reason_codes: params.reason_codes,
        models: params.models,
        evidence: params.evidence,
        lineage: DecisionLineage {
            supersedes_decision_id: params.supersedes_decision_id,
            overridden_by: None,
        },
        authority: DecisionAuthorityInfo {
            decided_by: if params.is_override { "human_operator" } else { "turing_orchestrate" }.to_string(),
            service_version: SERVICE_VERSION.to_string(),
            is_override: params.is_override,
        },
    };

    let event_payload = serde_json::to_value(&payload)?;
    let event = WorkflowEvent::new(
        params.workflow_id,
        params.tenant_id,
        DECISION_FINALISED_EVENT,
        event_payload,
    );
    ledger.append(event).await?;

    Ok(payload)
}

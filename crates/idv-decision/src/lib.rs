//! Decision Authority: the single place in the workspace that decides a
//! `decision.finalised` event has to be written, and the only place that
//! writes one.
//!
//! Every other component - the state machine's `risk_evaluate` and
//! `override_applied` handlers included - calls one of the two public
//! entry points here instead of touching the ledger itself for this event
//! type. The payload construction and the append live together in a
//! private submodule so there is exactly one call site in the codebase
//! that can produce a `decision.finalised` row.

mod authority;
pub mod error;

pub use error::{DecisionError, DecisionResult};

use std::sync::Arc;

use dashmap::DashMap;
use idv_fusion::{aml_threshold, band_for, fuse_scores, recommend, requires_human};
use idv_ledger::EventLedger;
use idv_types::{
    CorrelationId, DecisionId, DecisionOutcome, DecisionPayload, Jurisdiction, RiskScores,
    TenantId, WorkflowId, DECISION_FINALISED_EVENT,
};

use authority::{build_and_append, FinalizeParams};

/// Inputs gathered by the `risk_evaluate` handler once a risk evaluation
/// has come back `Ok`.
pub struct RiskFinalizeInput {
    pub workflow_id: WorkflowId,
    pub tenant_id: TenantId,
    pub correlation_id: CorrelationId,
    pub subject_id: Option<String>,
    pub action: String,
    pub jurisdiction: Jurisdiction,
    pub policy_pack: String,
    pub policy_version: String,
    pub scores: RiskScores,
    pub confidence: f64,
    pub reason_codes: Vec<String>,
    pub models: serde_json::Value,
    pub evidence: serde_json::Value,
}

/// Inputs gathered by the `override_applied` handler for a human reviewer's
/// decision.
pub struct OverrideFinalizeInput {
    pub workflow_id: WorkflowId,
    pub tenant_id: TenantId,
    pub correlation_id: CorrelationId,
    pub subject_id: Option<String>,
    pub action: String,
    pub outcome: DecisionOutcome,
    pub reason: String,
}

pub struct DecisionAuthority {
    ledger: Arc<dyn EventLedger>,
    /// Deduplicates a retried `risk_evaluate` delivery (same correlation id)
    /// so it returns the decision already emitted instead of appending a
    /// second `decision.finalised` row.
    dedup: DashMap<(WorkflowId, CorrelationId), DecisionId>,
}

impl DecisionAuthority {
    pub fn new(ledger: Arc<dyn EventLedger>) -> Self {
        Self { ledger, dedup: DashMap::new() }
    }

    /// Finalise a decision from a completed risk evaluation, running the
    /// fusion/policy recommendation locally over the scores the risk
    /// engine returned.
    pub async fn finalize_after_risk(&self, input: RiskFinalizeInput) -> DecisionResult<DecisionPayload> {
        let dedup_key = (input.workflow_id.clone(), input.correlation_id.clone());
        if let Some(existing) = self.dedup.get(&dedup_key) {
            if let Some(payload) = self.find_decision(&input.workflow_id, &existing).await? {
                tracing::info!(
                    workflow_id = %input.workflow_id,
                    correlation_id = %input.correlation_id,
                    "duplicate risk_evaluate delivery, returning previously emitted decision"
                );
                return Ok(payload);
            }
        }

        let composite = fuse_scores(input.scores, &input.jurisdiction);
        let band = band_for(composite);
        let outcome = recommend(band, input.scores, &input.jurisdiction);

        let params = FinalizeParams {
            workflow_id: input.workflow_id.clone(),
            tenant_id: input.tenant_id,
            correlation_id: input.correlation_id.clone(),
            subject_id: input.subject_id,
            action: input.action,
            outcome,
            requires_human: requires_human(outcome),
            confidence: input.confidence,
            jurisdiction: input.jurisdiction.to_string(),
            policy_pack: input.policy_pack,
            policy_version: input.policy_version,
            overall_risk: band,
            risk_score: composite,
            scores: input.scores,
            reason_codes: input.reason_codes,
            models: input.models,
            evidence: input.evidence,
            supersedes_decision_id: None,
            is_override: false,
        };

        let payload = build_and_append(&self.ledger, params).await?;
        self.dedup.insert(dedup_key, payload.decision_id.clone());
        Ok(payload)
    }

    /// Finalise a decision from a human reviewer's override, superseding
    /// the *earliest* decision ever finalised for the workflow - the
    /// original decision the lineage chain traces back to, not whatever was
    /// most recently superseded.
    pub async fn finalize_after_override(&self, input: OverrideFinalizeInput) -> DecisionResult<DecisionPayload> {
        let earliest = self
            .ledger
            .list_of_type(&input.workflow_id, DECISION_FINALISED_EVENT)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DecisionError::NoPriorDecision(input.workflow_id.to_string()))?;

        let previous_payload: DecisionPayload = serde_json::from_value(earliest.payload)?;

        let params = FinalizeParams {
            workflow_id: input.workflow_id.clone(),
            tenant_id: input.tenant_id,
            correlation_id: input.correlation_id.clone(),
            subject_id: input.subject_id,
            action: input.action,
            outcome: input.outcome,
            requires_human: false,
            confidence: 1.0,
            jurisdiction: previous_payload.policy.jurisdiction.clone(),
            policy_pack: previous_payload.policy.policy_pack.clone(),
            policy_version: previous_payload.policy.policy_version.clone(),
            overall_risk: previous_payload.risk_summary.overall_risk,
            risk_score: previous_payload.risk_summary.risk_score,
            scores: previous_payload.risk_summary.scores,
            reason_codes: vec![input.reason],
            models: previous_payload.models.clone(),
            evidence: previous_payload.evidence.clone(),
            supersedes_decision_id: Some(previous_payload.decision_id),
            is_override: true,
        };

        let payload = build_and_append(&self.ledger, params).await?;
        self.dedup.insert((input.workflow_id, input.correlation_id), payload.decision_id.clone());
        Ok(payload)
    }

    async fn find_decision(
        &self,
        workflow_id: &WorkflowId,
        decision_id: &DecisionId,
    ) -> DecisionResult<Option<DecisionPayload>> {
        let events = self.ledger.list_of_type(workflow_id, DECISION_FINALISED_EVENT).await?;
        for event in events {
            let payload: DecisionPayload = serde_json::from_value(event.payload)?;
            if &payload.decision_id == decision_id {
                return Ok(Some(payload));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idv_ledger::InMemoryLedger;
    use idv_types::{RiskScores, TenantId};

    fn input(workflow_id: WorkflowId, tenant_id: TenantId, correlation_id: CorrelationId) -> RiskFinalizeInput {
        RiskFinalizeInput {
            workflow_id,
            tenant_id,
            correlation_id,
            subject_id: Some("user_1".to_string()),
            action: "onboarding".to_string(),
            jurisdiction: Jurisdiction::Au,
            policy_pack: "au-core".to_string(),
            policy_version: "1.0.0".to_string(),
            scores: RiskScores { fraud: 0.1, aml: 0.1, credit: 0.1, liquidity: 0.1 },
            confidence: 0.9,
            reason_codes: vec![],
            models: serde_json::json!({}),
            evidence: serde_json::json!({}),
        }
    }

    #[tokio::test]
    async fn low_risk_scores_approve() {
        let ledger: Arc<dyn EventLedger> = Arc::new(InMemoryLedger::new());
        let authority = DecisionAuthority::new(ledger);
        let wf = WorkflowId::new();
        let tenant = TenantId::from_raw("tenant_acme");
        let corr = CorrelationId::new();

        let payload = authority.finalize_after_risk(input(wf, tenant, corr)).await.unwrap();
        assert_eq!(payload.decision.outcome, DecisionOutcome::Approve);
        assert!(payload.decision.can_proceed);
        assert!(!payload.decision.requires_human);
    }

    #[tokio::test]
    async fn duplicate_correlation_id_does_not_append_twice() {
        let ledger = Arc::new(InMemoryLedger::new());
        let authority = DecisionAuthority::new(ledger.clone());
        let wf = WorkflowId::new();
        let tenant = TenantId::from_raw("tenant_acme");
        let corr = CorrelationId::new();

        let first = authority.finalize_after_risk(input(wf.clone(), tenant.clone(), corr.clone())).await.unwrap();
        let second = authority.finalize_after_risk(input(wf.clone(), tenant, corr)).await.unwrap();
        assert_eq!(first.decision_id, second.decision_id);

        let events = ledger.list_of_type(&wf, DECISION_FINALISED_EVENT).await.unwrap();
        assert_eq!(events.len(), 1);
    }

    #[tokio::test]
    async fn override_supersedes_the_earliest_decision() {
        let ledger: Arc<dyn EventLedger> = Arc::new(InMemoryLedger::new());
        let authority = DecisionAuthority::new(ledger);
        let wf = WorkflowId::new();
        let tenant = TenantId::from_raw("tenant_acme");

        let first = authority
            .finalize_after_risk(input(wf.clone(), tenant.clone(), CorrelationId::new()))
            .await
            .unwrap();

        let overridden = authority
            .finalize_after_override(OverrideFinalizeInput {
                workflow_id: wf,
                tenant_id: tenant,
                correlation_id: CorrelationId::new(),
                subject_id: Some("user_1".to_string()),
                action: "onboarding".to_string(),
                outcome: DecisionOutcome::Decline,
                reason: "manual review flagged a mismatch".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(overridden.lineage.supersedes_decision_id, Some(first.decision_id));
        assert!(overridden.authority.is_override);
        assert_eq!(overridden.decision.outcome, DecisionOutcome::Decline);
    }

    #[tokio::test]
    async fn second_override_still_supersedes_the_original_decision() {
        let ledger: Arc<dyn EventLedger> = Arc::new(InMemoryLedger::new());
        let authority = DecisionAuthority::new(ledger);
        let wf = WorkflowId::new();
        let tenant = TenantId::from_raw("tenant_acme");

        let original = authority
            .finalize_after_risk(input(wf.clone(), tenant.clone(), CorrelationId::new()))
            .await
            .unwrap();

        authority
            .finalize_after_override(OverrideFinalizeInput {
                workflow_id: wf.clone(),
                tenant_id: tenant.clone(),
                correlation_id: CorrelationId::new(),
                subject_id: Some("user_1".to_string()),
                action: "onboarding".to_string(),
                outcome: DecisionOutcome::Decline,
                reason: "manual review flagged a mismatch".to_string(),
            })
            .await
            .unwrap();

        let second_override = authority
            .finalize_after_override(OverrideFinalizeInput {
                workflow_id: wf,
                tenant_id: tenant,
                correlation_id: CorrelationId::new(),
                subject_id: Some("user_1".to_string()),
                action: "onboarding".to_string(),
                outcome: DecisionOutcome::Approve,
                reason: "second review reversed the flag".to_string(),
            })
            .await
            .unwrap();

        // Lineage must always trace back to the original decision, not the
        // decision the prior override superseded.
        assert_eq!(second_override.lineage.supersedes_decision_id, Some(original.decision_id));
    }

    #[tokio::test]
    async fn override_without_a_prior_decision_is_rejected() {
        let ledger: Arc<dyn EventLedger> = Arc::new(InMemoryLedger::new());
        let authority = DecisionAuthority::new(ledger);
        let wf = WorkflowId::new();
        let tenant = TenantId::from_raw("tenant_acme");

        let result = authority
            .finalize_after_override(OverrideFinalizeInput {
                workflow_id: wf,
                tenant_id: tenant,
                correlation_id: CorrelationId::new(),
                subject_id: None,
                action: "onboarding".to_string(),
                outcome: DecisionOutcome::Approve,
                reason: "no history".to_string(),
            })
            .await;

        assert!(matches!(result, Err(DecisionError::NoPriorDecision(_))));
    }
}

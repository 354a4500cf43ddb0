use idv_decision::RiskFinalizeInput;
use idv_risk_client::RiskOutcome;
use idv_types::{CorrelationId, Jurisdiction, WorkflowEvent, WorkflowState};
use serde_json::json;

use crate::dispatch::InboundEvent;
use crate::error::{EngineError, EngineResult};
use crate::extract::require_workflow_id;
use crate::handlers::HandlerOutcome;
use crate::Engine;

/// `risk_evaluate`: the only handler (besides `override_applied`) that
/// drives the risk client and Decision Authority. Per the resolved Open
/// Question on risk_failed emission, a `decision.finalised` event is
/// emitted only on the success path - a workflow that lands in
/// `risk_failed` stays undecided until a human override finalises it,
/// rather than getting an implicit decision baked into a degraded call.
pub async fn handle(engine: &Engine, event: InboundEvent) -> EngineResult<HandlerOutcome> {
    let workflow_id = require_workflow_id(&event.payload)?;
    let signals = event
        .payload
        .get("signals")
        .cloned()
        .ok_or(EngineError::MissingField("signals"))?;

    let outcome = match tokio::time::timeout(engine.risk_timeout, engine.risk_client.evaluate(signals)).await {
        Ok(outcome) => outcome,
        Err(_) => {
            tracing::warn!(workflow_id = %workflow_id, "risk evaluation timed out at the engine boundary");
            RiskOutcome::Degraded(idv_risk_client::DegradedRisk::new("risk_engine_timeout"))
        }
    };

    let mut guard = engine.store.lock(&workflow_id, &event.tenant_id).await?;

    let risk_event_payload = match &outcome {
        RiskOutcome::Ok(result) => {
            let jurisdiction: Jurisdiction = result
                .jurisdiction
                .as_deref()
                .map(|j| j.parse().unwrap_or_default())
                .unwrap_or(Jurisdiction::Au);
            let subject_id = guard
                .workflow()
                .data
                .get("user_id")
                .and_then(|v| v.as_str())
                .map(str::to_string);
            let action = guard
                .workflow()
                .data
                .get("action")
                .and_then(|v| v.as_str())
                .unwrap_or("onboarding")
                .to_string();
            let evidence = guard
                .workflow()
                .data
                .get("evidence_hashes")
                .cloned()
                .unwrap_or_else(|| json!({}));
            let correlation_id = event
                .correlation_id
                .clone()
                .map(CorrelationId::from_raw)
                .unwrap_or_else(CorrelationId::new);

            let payload = engine
                .decision_authority
                .finalize_after_risk(RiskFinalizeInput {
                    workflow_id: workflow_id.clone(),
                    tenant_id: event.tenant_id.clone(),
                    correlation_id,
                    subject_id,
                    action,
                    jurisdiction,
                    policy_pack: "au-core".to_string(),
                    policy_version: result.policy_version.clone().unwrap_or_else(|| "1.0.0".to_string()),
                    scores: result.scores,
                    confidence: result.confidence,
                    reason_codes: result.reason_codes.clone(),
                    models: result.models.clone(),
                    evidence,
                })
                .await?;

            guard.workflow_mut().risk_score = Some(payload.risk_summary.risk_score);
            guard.workflow_mut().risk_band = Some(payload.risk_summary.overall_risk.to_string());
            guard.workflow_mut().decision = Some(payload.decision.outcome.to_string());
            guard.workflow_mut().requires_human = payload.decision.requires_human;
            guard.workflow_mut().state = WorkflowState::RiskEvaluated;
            let result_json = serde_json::to_value(result).unwrap_or_else(|_| json!({}));
            guard.workflow_mut().set_data("risk_result", result_json);

            serde_json::to_value(&payload).unwrap_or_else(|_| json!({}))
        }
        RiskOutcome::Degraded(degraded) => {
            guard.workflow_mut().state = WorkflowState::RiskFailed;
            let error_json = serde_json::to_value(degraded).unwrap_or_else(|_| json!({}));
            guard.workflow_mut().set_data("risk_result", error_json.clone());
            guard.workflow_mut().set_data("risk_error", error_json.clone());
            error_json
        }
    };

    guard.commit().await.map_err(EngineError::from)?;

    engine
        .ledger
        .append(WorkflowEvent::new(
            workflow_id.clone(),
            event.tenant_id,
            "risk_evaluated",
            risk_event_payload,
        ))
        .await?;

    Ok(HandlerOutcome::Processed { workflow_id, event_type: "risk_evaluate".to_string() })
}

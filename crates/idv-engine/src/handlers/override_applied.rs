use std::str::FromStr;

use idv_decision::OverrideFinalizeInput;
use idv_types::{CorrelationId, DecisionOutcome, ManualDecision, WorkflowEvent, WorkflowState};

use crate::dispatch::InboundEvent;
use crate::error::{EngineError, EngineResult};
use crate::extract::{optional_str, require_str, require_workflow_id};
use crate::handlers::HandlerOutcome;
use crate::Engine;

/// `override_applied`: synthesised either from a direct `/v1/events` post
/// or from the manual-decision HTTP endpoint. Resolves the "manual decision
/// bypasses Decision Authority" gap: the outcome is always finalised
/// through [`idv_decision::DecisionAuthority::finalize_after_override`]
/// before the workflow row is touched, so there is no path that writes a
/// decision without going through the single authoritative emitter.
pub async fn handle(engine: &Engine, event: InboundEvent) -> EngineResult<HandlerOutcome> {
    let workflow_id = require_workflow_id(&event.payload)?;
    let decision_str = require_str(&event.payload, "decision")?;
    let outcome = DecisionOutcome::from_str(decision_str)
        .map_err(|_| EngineError::MalformedPayload(format!("unknown decision outcome: {decision_str}")))?;
    let reason = optional_str(&event.payload, "reason").unwrap_or("not_specified").to_string();
    let overridden_by = optional_str(&event.payload, "overridden_by").unwrap_or("manual_reviewer").to_string();
    let subject_id = optional_str(&event.payload, "subject_id").map(str::to_string);
    let action = optional_str(&event.payload, "action").unwrap_or("onboarding").to_string();
    let correlation_id = event
        .correlation_id
        .clone()
        .map(CorrelationId::from_raw)
        .unwrap_or_else(CorrelationId::new);

    // Finalise through Decision Authority first: if there is no prior
    // decision to supersede, this fails before any workflow row is written.
    engine
        .decision_authority
        .finalize_after_override(OverrideFinalizeInput {
            workflow_id: workflow_id.clone(),
            tenant_id: event.tenant_id.clone(),
            correlation_id,
            subject_id,
            action,
            outcome,
            reason: reason.clone(),
        })
        .await?;

    engine
        .manual_decisions
        .record(ManualDecision::new(
            workflow_id.clone(),
            event.tenant_id.clone(),
            outcome.to_string(),
            reason,
            overridden_by,
        ))
        .await
        .map_err(EngineError::from)?;

    let mut guard = engine.store.lock(&workflow_id, &event.tenant_id).await?;
    guard.workflow_mut().state = WorkflowState::OverrideApplied;
    guard.workflow_mut().decision = Some(outcome.to_string());
    guard.workflow_mut().requires_human = false;
    guard.commit().await.map_err(EngineError::from)?;

    engine
        .ledger
        .append(WorkflowEvent::new(
            workflow_id.clone(),
            event.tenant_id,
            "override_applied",
            event.payload,
        ))
        .await?;

    Ok(HandlerOutcome::Processed { workflow_id, event_type: "override_applied".to_string() })
}

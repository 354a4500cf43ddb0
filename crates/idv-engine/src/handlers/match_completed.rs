use idv_types::{WorkflowEvent, WorkflowState};
use serde_json::{json, Value};

use crate::dispatch::InboundEvent;
use crate::error::{EngineError, EngineResult};
use crate::extract::require_workflow_id;
use crate::handlers::HandlerOutcome;
use crate::Engine;

/// `match_completed`: the face/document biometric match result. `is_match`
/// is the only field that drives the transition; `raw`/`fused_score` are
/// carried into the data bag for later evidence/audit purposes.
pub async fn handle(engine: &Engine, event: InboundEvent) -> EngineResult<HandlerOutcome> {
    let workflow_id = require_workflow_id(&event.payload)?;
    let is_match = event
        .payload
        .get("match")
        .and_then(Value::as_bool)
        .ok_or(EngineError::MissingField("match"))?;
    let raw = event.payload.get("raw_score").cloned();
    let fused_score = event.payload.get("fused_score").cloned();

    let mut guard = engine.store.lock(&workflow_id, &event.tenant_id).await?;
    guard.workflow_mut().state = if is_match { WorkflowState::MatchVerified } else { WorkflowState::MatchFailed };
    guard.workflow_mut().set_data(
        "match",
        json!({ "raw": raw, "fused_score": fused_score, "is_match": is_match }),
    );
    guard.commit().await.map_err(EngineError::from)?;

    engine
        .ledger
        .append(WorkflowEvent::new(
            workflow_id.clone(),
            event.tenant_id,
            "match_completed",
            event.payload,
        ))
        .await?;

    Ok(HandlerOutcome::Processed { workflow_id, event_type: "match_completed".to_string() })
}

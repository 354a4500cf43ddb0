use idv_types::{WorkflowEvent, WorkflowState};
use serde_json::json;

use crate::dispatch::InboundEvent;
use crate::error::{EngineError, EngineResult};
use crate::extract::{require_str, workflow_id_or_session};
use crate::handlers::HandlerOutcome;
use crate::Engine;

/// `selfie_uploaded`: `workflow_id` falls back to `session_id` because this
/// is typically the first event a workflow ever sees, and the capture
/// front-end only hands back the capture session id at this point.
pub async fn handle(engine: &Engine, event: InboundEvent) -> EngineResult<HandlerOutcome> {
    let workflow_id = workflow_id_or_session(&event.payload)?;
    let selfie_session_id = require_str(&event.payload, "session_id")?.to_string();
    let liveness = event.payload.pointer("/selfie/liveness").cloned();

    let mut guard = engine.store.lock(&workflow_id, &event.tenant_id).await?;
    guard.workflow_mut().selfie_session_id = Some(selfie_session_id);
    guard.workflow_mut().state = WorkflowState::SelfieUploaded;
    if let Some(liveness) = liveness {
        guard.workflow_mut().set_data("selfie", json!({ "liveness": liveness }));
    }
    guard.commit().await.map_err(EngineError::from)?;

    engine
        .ledger
        .append(WorkflowEvent::new(
            workflow_id.clone(),
            event.tenant_id,
            "selfie_uploaded",
            event.payload,
        ))
        .await?;

    Ok(HandlerOutcome::Processed { workflow_id, event_type: "selfie_uploaded".to_string() })
}

use idv_types::{WorkflowEvent, WorkflowState};
use serde_json::json;

use crate::dispatch::InboundEvent;
use crate::error::{EngineError, EngineResult};
use crate::extract::{require_str, require_workflow_id};
use crate::handlers::HandlerOutcome;
use crate::Engine;

/// `id_uploaded`: requires an explicit `workflow_id` - by this point the
/// workflow was already created by `selfie_uploaded`.
pub async fn handle(engine: &Engine, event: InboundEvent) -> EngineResult<HandlerOutcome> {
    let workflow_id = require_workflow_id(&event.payload)?;
    let id_session_id = require_str(&event.payload, "session_id")?.to_string();
    let metadata = event.payload.pointer("/id_document/metadata").cloned();

    let mut guard = engine.store.lock(&workflow_id, &event.tenant_id).await?;
    guard.workflow_mut().id_session_id = Some(id_session_id);
    guard.workflow_mut().state = WorkflowState::IdUploaded;
    if let Some(metadata) = metadata {
        guard.workflow_mut().set_data("id_document", json!({ "metadata": metadata }));
    }
    guard.commit().await.map_err(EngineError::from)?;

    engine
        .ledger
        .append(WorkflowEvent::new(
            workflow_id.clone(),
            event.tenant_id,
            "id_uploaded",
            event.payload,
        ))
        .await?;

    Ok(HandlerOutcome::Processed { workflow_id, event_type: "id_uploaded".to_string() })
}

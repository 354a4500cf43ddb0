//! Small payload field-extraction helpers shared by the handlers.

use idv_types::WorkflowId;
use serde_json::Value;

use crate::error::{EngineError, EngineResult};

pub fn require_str<'a>(payload: &'a Value, field: &'static str) -> EngineResult<&'a str> {
    payload
        .get(field)
        .and_then(Value::as_str)
        .ok_or(EngineError::MissingField(field))
}

pub fn optional_str<'a>(payload: &'a Value, field: &'static str) -> Option<&'a str> {
    payload.get(field).and_then(Value::as_str)
}

/// `workflow_id` falls back to `session_id` only where the spec's
/// transition table says so (the `selfie_uploaded` handler); other handlers
/// require `workflow_id` outright.
pub fn workflow_id_or_session(payload: &Value) -> EngineResult<WorkflowId> {
    if let Some(id) = optional_str(payload, "workflow_id") {
        return Ok(WorkflowId::from_raw(id));
    }
    if let Some(id) = optional_str(payload, "session_id") {
        return Ok(WorkflowId::from_raw(id));
    }
    Err(EngineError::MissingField("workflow_id"))
}

pub fn require_workflow_id(payload: &Value) -> EngineResult<WorkflowId> {
    require_str(payload, "workflow_id").map(WorkflowId::from_raw)
}

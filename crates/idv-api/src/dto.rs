//! Request/response shapes for the HTTP surface. Kept separate from the
//! engine's internal types so the wire format can evolve independently of
//! `idv-types`.

use serde::{Deserialize, Serialize};

/// `POST /v1/events` body. Either `event` or `event_type` must be present;
/// `payload.tenant_id` is required and checked by the engine's dispatcher,
/// not here.
#[derive(Debug, Deserialize)]
pub struct EventIngressRequest {
    pub event: Option<String>,
    pub event_type: Option<String>,
    pub payload: serde_json::Value,
    pub correlation_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EventIngressResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl EventIngressResponse {
    pub fn processed(event_type: String) -> Self {
        Self { status: "ok", processed: Some(event_type), reason: None }
    }

    pub fn ignored(reason: String) -> Self {
        Self { status: "ignored", processed: None, reason: Some(reason) }
    }
}

#[derive(Debug, Deserialize)]
pub struct WorkflowListQuery {
    pub tenant_id: Option<String>,
    pub state: Option<String>,
    pub limit: Option<usize>,
}

/// `POST /v1/workflows/{id}/manual-decision` body. Synthesised into an
/// `override_applied` event and routed through the same dispatcher as
/// `/v1/events`, so this never bypasses Decision Authority.
#[derive(Debug, Deserialize)]
pub struct ManualDecisionRequest {
    pub tenant_id: String,
    pub decision: String,
    pub reason: String,
    pub actor: Option<String>,
    pub subject_id: Option<String>,
    pub action: Option<String>,
    pub correlation_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

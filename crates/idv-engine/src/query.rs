//! Read-only query surface. Every query here derives the authoritative
//! decision from the event ledger's `decision.finalised` rows - never from
//! the workflow's cached `decision` field, which exists only to answer
//! cheaply when no caller needs full lineage.

use idv_types::{DecisionPayload, Workflow, WorkflowId, WorkflowState, DECISION_FINALISED_EVENT};
use serde::Serialize;

use crate::error::EngineResult;
use crate::Engine;

#[derive(Debug, Clone, Serialize)]
pub struct WorkflowView {
    pub id: WorkflowId,
    pub tenant_id: idv_types::TenantId,
    pub state: WorkflowState,
    pub decision: Option<String>,
    pub decision_confidence: Option<f64>,
    pub requires_human: Option<bool>,
    pub risk_score: Option<f64>,
    pub risk_band: Option<String>,
    pub data: serde_json::Value,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub latest_decision_event: Option<DecisionPayload>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DecisionTimeline {
    pub workflow_id: WorkflowId,
    pub decision_count: usize,
    pub current_decision: DecisionPayload,
    pub timeline: Vec<DecisionPayload>,
    pub has_overrides: bool,
}

/// `GET /v1/workflows/{id}`.
pub async fn get_workflow(engine: &Engine, workflow_id: &WorkflowId) -> EngineResult<Option<WorkflowView>> {
    let workflow = match engine.store().get(workflow_id).await? {
        Some(wf) => wf,
        None => return Ok(None),
    };
    let latest = latest_decision_payload(engine, workflow_id).await?;
    Ok(Some(to_view(workflow, latest)))
}

/// `GET /v1/workflows`.
pub async fn list_workflows(engine: &Engine, filter: idv_store::WorkflowFilter) -> EngineResult<Vec<Workflow>> {
    Ok(engine.store().list(filter).await?)
}

/// `GET /v1/investigator/workflows/{id}/decisions`.
pub async fn decision_timeline(engine: &Engine, workflow_id: &WorkflowId) -> EngineResult<Option<DecisionTimeline>> {
    let events = engine.ledger().list_of_type(workflow_id, DECISION_FINALISED_EVENT).await?;
    if events.is_empty() {
        return Ok(None);
    }
    let timeline: Vec<DecisionPayload> = events
        .into_iter()
        .filter_map(|e| serde_json::from_value(e.payload).ok())
        .collect();
    let current = timeline.last().cloned().expect("non-empty timeline has a last element");
    let has_overrides = timeline.iter().any(|d| d.authority.is_override);

    Ok(Some(DecisionTimeline {
        workflow_id: workflow_id.clone(),
        decision_count: timeline.len(),
        current_decision: current,
        timeline,
        has_overrides,
    }))
}

/// `GET /v1/investigator/workflows/{id}/decisions/current`.
pub async fn current_decision(engine: &Engine, workflow_id: &WorkflowId) -> EngineResult<Option<DecisionPayload>> {
    latest_decision_payload(engine, workflow_id).await
}

async fn latest_decision_payload(engine: &Engine, workflow_id: &WorkflowId) -> EngineResult<Option<DecisionPayload>> {
    let latest = engine.ledger().latest_of_type(workflow_id, DECISION_FINALISED_EVENT).await?;
    Ok(latest.and_then(|e| serde_json::from_value(e.payload).ok()))
}

fn to_view(workflow: Workflow, latest: Option<DecisionPayload>) -> WorkflowView {
    WorkflowView {
        id: workflow.id,
        tenant_id: workflow.tenant_id,
        state: workflow.state,
        decision: latest.as_ref().map(|d| d.decision.outcome.to_string()),
        decision_confidence: latest.as_ref().map(|d| d.decision.confidence),
        requires_human: latest.as_ref().map(|d| d.decision.requires_human),
        risk_score: workflow.risk_score,
        risk_band: workflow.risk_band,
        data: workflow.data,
        created_at: workflow.created_at,
        updated_at: workflow.updated_at,
        latest_decision_event: latest,
    }
}

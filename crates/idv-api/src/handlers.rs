use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use idv_engine::HandlerOutcome;
use idv_store::WorkflowFilter;
use idv_types::{TenantId, WorkflowId, WorkflowState};
use serde_json::json;

use crate::dto::{
    EventIngressRequest, EventIngressResponse, HealthResponse, ManualDecisionRequest, WorkflowListQuery,
};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

/// `POST /v1/events`.
pub async fn ingest_event(
    State(state): State<Arc<AppState>>,
    Json(request): Json<EventIngressRequest>,
) -> ApiResult<(StatusCode, Json<EventIngressResponse>)> {
    let outcome = state
        .engine
        .dispatch(request.event, request.event_type, request.payload, request.correlation_id)
        .await?;

    let body = match outcome {
        HandlerOutcome::Processed { event_type, .. } => EventIngressResponse::processed(event_type),
        HandlerOutcome::Ignored { reason } => EventIngressResponse::ignored(reason),
    };

    Ok((StatusCode::ACCEPTED, Json(body)))
}

/// `GET /v1/workflows/{id}`.
pub async fn get_workflow(
    State(state): State<Arc<AppState>>,
    Path(workflow_id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let workflow_id = WorkflowId::from_raw(workflow_id);
    let view = idv_engine::query::get_workflow(&state.engine, &workflow_id)
        .await?
        .ok_or_else(|| ApiError::from(idv_engine::EngineError::Store(idv_store::StoreError::NotFound(workflow_id.to_string()))))?;

    Ok(Json(serde_json::to_value(view).unwrap_or_else(|_| json!({}))))
}

/// `GET /v1/workflows`.
pub async fn list_workflows(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WorkflowListQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let filter = WorkflowFilter {
        tenant_id: query.tenant_id.map(TenantId::from_raw),
        state: query.state.as_deref().and_then(|s| WorkflowState::from_str(s).ok()),
        limit: query.limit,
    };

    let workflows = idv_engine::query::list_workflows(&state.engine, filter).await?;
    Ok(Json(serde_json::to_value(workflows).unwrap_or_else(|_| json!([]))))
}

/// `GET /v1/investigator/workflows/{id}/decisions`.
pub async fn decision_timeline(
    State(state): State<Arc<AppState>>,
    Path(workflow_id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let workflow_id = WorkflowId::from_raw(workflow_id);
    let timeline = idv_engine::query::decision_timeline(&state.engine, &workflow_id).await?;
    Ok(Json(serde_json::to_value(timeline).unwrap_or_else(|_| json!(null))))
}

/// `GET /v1/investigator/workflows/{id}/decisions/current`.
pub async fn current_decision(
    State(state): State<Arc<AppState>>,
    Path(workflow_id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let workflow_id = WorkflowId::from_raw(workflow_id);
    let decision = idv_engine::query::current_decision(&state.engine, &workflow_id).await?;
    Ok(Json(serde_json::to_value(decision).unwrap_or_else(|_| json!(null))))
}

/// `POST /v1/workflows/{id}/manual-decision`. Synthesises an
/// `override_applied` event and routes it through the same dispatcher
/// `/v1/events` uses, rather than writing the workflow cache directly -
/// this is what keeps Decision Authority from being bypassed.
pub async fn manual_decision(
    State(state): State<Arc<AppState>>,
    Path(workflow_id): Path<String>,
    Json(request): Json<ManualDecisionRequest>,
) -> ApiResult<(StatusCode, Json<EventIngressResponse>)> {
    let payload = json!({
        "tenant_id": request.tenant_id,
        "workflow_id": workflow_id,
        "decision": request.decision,
        "reason": request.reason,
        "overridden_by": request.actor,
        "subject_id": request.subject_id,
        "action": request.action,
    });

    let outcome = state
        .engine
        .dispatch(Some("override_applied".to_string()), None, payload, request.correlation_id)
        .await?;

    let body = match outcome {
        HandlerOutcome::Processed { event_type, .. } => EventIngressResponse::processed(event_type),
        HandlerOutcome::Ignored { reason } => EventIngressResponse::ignored(reason),
    };

    Ok((StatusCode::ACCEPTED, Json(body)))
}

//! Ledger rows: the append-only facts the state machine and Decision
//! Authority derive everything else from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{EventId, ManualDecisionId, TenantId, WorkflowId};

/// One immutable entry in a workflow's event ledger.
///
/// Every state transition, risk call, and decision is recorded here before
/// (or as part of) mutating the workflow row; nothing downstream is ever
/// allowed to read the workflow's cached fields as if they were authoritative
/// when a ledger entry disagrees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowEvent {
    pub id: EventId,
    pub workflow_id: WorkflowId,
    pub tenant_id: TenantId,
    pub event_type: String,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl WorkflowEvent {
    pub fn new(
        workflow_id: WorkflowId,
        tenant_id: TenantId,
        event_type: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            id: EventId::new(),
            workflow_id,
            tenant_id,
            event_type: event_type.into(),
            payload,
            created_at: Utc::now(),
        }
    }
}

/// The event type a `decision.finalised` ledger row carries. Pulled out as
/// a constant since several components (Decision Authority, the investigator
/// query surface) need to agree on the exact string.
pub const DECISION_FINALISED_EVENT: &str = "decision.finalised";

/// A human reviewer's recorded override, kept for operator-facing listings
/// even though the authoritative outcome always flows through a
/// `decision.finalised` ledger event synthesised from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualDecision {
    pub id: ManualDecisionId,
    pub workflow_id: WorkflowId,
    pub tenant_id: TenantId,
    pub decision: String,
    pub reason: String,
    pub actor: String,
    pub decided_at: DateTime<Utc>,
}

impl ManualDecision {
    pub fn new(
        workflow_id: WorkflowId,
        tenant_id: TenantId,
        decision: impl Into<String>,
        reason: impl Into<String>,
        actor: impl Into<String>,
    ) -> Self {
        Self {
            id: ManualDecisionId::new(),
            workflow_id,
            tenant_id,
            decision: decision.into(),
            reason: reason.into(),
            actor: actor.into(),
            decided_at: Utc::now(),
        }
    }
}

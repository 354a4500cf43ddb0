use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use idv_types::{ManualDecision, WorkflowId};
use tokio::sync::RwLock;

use crate::error::StoreResult;

/// Audit trail of human reviewer overrides, kept for operator-facing
/// listings even though the authoritative outcome always flows through a
/// `decision.finalised` ledger event synthesised alongside each record.
#[async_trait]
pub trait ManualDecisionStore: Send + Sync {
    async fn record(&self, decision: ManualDecision) -> StoreResult<()>;
    async fn list_for_workflow(&self, workflow_id: &WorkflowId) -> StoreResult<Vec<ManualDecision>>;
}

#[derive(Default)]
pub struct InMemoryManualDecisionStore {
    by_workflow: DashMap<WorkflowId, Arc<RwLock<Vec<ManualDecision>>>>,
}

impl InMemoryManualDecisionStore {
    pub fn new() -> Self {
        Self { by_workflow: DashMap::new() }
    }
}

#[async_trait]
impl ManualDecisionStore for InMemoryManualDecisionStore {
    async fn record(&self, decision: ManualDecision) -> StoreResult<()> {
        let lock = self
            .by_workflow
            .entry(decision.workflow_id.clone())
            .or_insert_with(|| Arc::new(RwLock::new(Vec::new())));
        lock.write().await.push(decision);
        Ok(())
    }

    async fn list_for_workflow(&self, workflow_id: &WorkflowId) -> StoreResult<Vec<ManualDecision>> {
        match self.by_workflow.get(workflow_id) {
            Some(lock) => Ok(lock.read().await.clone()),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idv_types::TenantId;

    #[tokio::test]
    async fn records_are_scoped_per_workflow() {
        let store = InMemoryManualDecisionStore::new();
        let wf = WorkflowId::new();
        let tenant = TenantId::from_raw("tenant_acme");
        store
            .record(ManualDecision::new(wf.clone(), tenant, "decline", "flagged", "reviewer_1"))
            .await
            .unwrap();

        let records = store.list_for_workflow(&wf).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].decision, "decline");
    }
}

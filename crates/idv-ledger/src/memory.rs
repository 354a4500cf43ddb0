use async_trait::async_trait;
use dashmap::DashMap;
use idv_types::{TenantId, WorkflowEvent, WorkflowId};
use tokio::sync::RwLock;

use crate::error::LedgerResult;
use crate::EventLedger;

/// In-memory event ledger, keyed per workflow so unrelated workflows never
/// contend on the same lock.
#[derive(Default)]
pub struct InMemoryLedger {
    entries: DashMap<WorkflowId, RwLock<Vec<WorkflowEvent>>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

#[async_trait]
impl EventLedger for InMemoryLedger {
    async fn append(&self, event: WorkflowEvent) -> LedgerResult<WorkflowEvent> {
        let lock = self
            .entries
            .entry(event.workflow_id.clone())
            .or_insert_with(|| RwLock::new(Vec::new()));
        lock.write().await.push(event.clone());
        Ok(event)
    }

    async fn list_for_workflow(&self, workflow_id: &WorkflowId) -> LedgerResult<Vec<WorkflowEvent>> {
        match self.entries.get(workflow_id) {
            Some(lock) => Ok(lock.read().await.clone()),
            None => Ok(Vec::new()),
        }
    }

    async fn list_of_type(
        &self,
        workflow_id: &WorkflowId,
        event_type: &str,
    ) -> LedgerResult<Vec<WorkflowEvent>> {
        let all = self.list_for_workflow(workflow_id).await?;
        Ok(all.into_iter().filter(|e| e.event_type == event_type).collect())
    }

    async fn latest_of_type(
        &self,
        workflow_id: &WorkflowId,
        event_type: &str,
    ) -> LedgerResult<Option<WorkflowEvent>> {
        Ok(self.list_of_type(workflow_id, event_type).await?.into_iter().last())
    }

    async fn list_for_tenant(&self, tenant_id: &TenantId) -> LedgerResult<Vec<WorkflowEvent>> {
        let mut out = Vec::new();
        for entry in self.entries.iter() {
            let events = entry.value().read().await;
            out.extend(events.iter().filter(|e| &e.tenant_id == tenant_id).cloned());
        }
        out.sort_by_key(|e| e.created_at);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idv_types::{TenantId, WorkflowId};
    use serde_json::json;

    fn sample_event(workflow_id: &WorkflowId, event_type: &str) -> WorkflowEvent {
        WorkflowEvent::new(
            workflow_id.clone(),
            TenantId::from_raw("tenant_acme"),
            event_type,
            json!({}),
        )
    }

    #[tokio::test]
    async fn append_then_list_returns_in_order() {
        let ledger = InMemoryLedger::new();
        let wf = WorkflowId::new();
        ledger.append(sample_event(&wf, "selfie_uploaded")).await.unwrap();
        ledger.append(sample_event(&wf, "id_uploaded")).await.unwrap();

        let events = ledger.list_for_workflow(&wf).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, "selfie_uploaded");
        assert_eq!(events[1].event_type, "id_uploaded");
    }

    #[tokio::test]
    async fn latest_of_type_returns_most_recent_only() {
        let ledger = InMemoryLedger::new();
        let wf = WorkflowId::new();
        ledger.append(sample_event(&wf, "decision.finalised")).await.unwrap();
        let second = ledger.append(sample_event(&wf, "decision.finalised")).await.unwrap();

        let latest = ledger.latest_of_type(&wf, "decision.finalised").await.unwrap().unwrap();
        assert_eq!(latest.id, second.id);
    }

    #[tokio::test]
    async fn unrelated_workflows_have_independent_ledgers() {
        let ledger = InMemoryLedger::new();
        let a = WorkflowId::new();
        let b = WorkflowId::new();
        ledger.append(sample_event(&a, "selfie_uploaded")).await.unwrap();

        assert_eq!(ledger.list_for_workflow(&a).await.unwrap().len(), 1);
        assert_eq!(ledger.list_for_workflow(&b).await.unwrap().len(), 0);
    }
}

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use idv_types::{TenantId, Workflow, WorkflowId};
use tokio::sync::Mutex;

use crate::error::StoreResult;
use crate::filter::WorkflowFilter;
use crate::guard::WorkflowGuard;
use crate::WorkflowStore;

/// In-memory workflow store. Each workflow id owns its own `Mutex`, so
/// concurrent events for different workflows never block one another —
/// there is no workspace-wide lock anywhere in this implementation.
#[derive(Default)]
pub struct InMemoryStore {
    workflows: DashMap<WorkflowId, Arc<Mutex<Workflow>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            workflows: DashMap::new(),
        }
    }

    fn entry_for(&self, id: &WorkflowId, tenant_id: &TenantId) -> Arc<Mutex<Workflow>> {
        self.workflows
            .entry(id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(Workflow::new(id.clone(), tenant_id.clone()))))
            .clone()
    }
}

#[async_trait]
impl WorkflowStore for InMemoryStore {
    async fn get_or_create(&self, workflow_id: &WorkflowId, tenant_id: &TenantId) -> StoreResult<Workflow> {
        let arc = self.entry_for(workflow_id, tenant_id);
        let wf = arc.lock().await.clone();
        Ok(wf)
    }

    async fn get(&self, workflow_id: &WorkflowId) -> StoreResult<Option<Workflow>> {
        match self.workflows.get(workflow_id) {
            Some(arc) => Ok(Some(arc.lock().await.clone())),
            None => Ok(None),
        }
    }

    async fn list(&self, filter: WorkflowFilter) -> StoreResult<Vec<Workflow>> {
        let mut out = Vec::new();
        for entry in self.workflows.iter() {
            let wf = entry.value().lock().await.clone();
            if filter.matches(&wf) {
                out.push(wf);
            }
        }
        out.sort_by_key(|w| std::cmp::Reverse(w.created_at));
        if let Some(limit) = filter.limit {
            out.truncate(limit.min(crate::filter::MAX_LIST_LIMIT));
        }
        Ok(out)
    }

    async fn lock(&self, workflow_id: &WorkflowId, tenant_id: &TenantId) -> StoreResult<WorkflowGuard> {
        let arc = self.entry_for(workflow_id, tenant_id);
        let mut owned = arc.lock_owned().await;
        let snapshot = owned.clone();
        Ok(WorkflowGuard::new(
            snapshot,
            Box::new(move |updated| {
                Box::pin(async move {
                    *owned = updated;
                    Ok(())
                })
            }),
        ))
    }
}

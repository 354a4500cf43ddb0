use idv_types::{TenantId, Workflow, WorkflowState};

/// Upper bound on `list`'s result cap, regardless of what a caller asks for.
pub const MAX_LIST_LIMIT: usize = 200;

/// Query parameters for `GET /v1/workflows` — tenant scoping, an optional
/// state filter, and a result cap.
#[derive(Debug, Clone, Default)]
pub struct WorkflowFilter {
    pub tenant_id: Option<TenantId>,
    pub state: Option<WorkflowState>,
    pub limit: Option<usize>,
}

impl WorkflowFilter {
    pub fn matches(&self, workflow: &Workflow) -> bool {
        if let Some(tenant_id) = &self.tenant_id {
            if &workflow.tenant_id != tenant_id {
                return false;
            }
        }
        if let Some(state) = &self.state {
            if &workflow.state != state {
                return false;
            }
        }
        true
    }
}

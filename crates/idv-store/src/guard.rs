use futures::future::BoxFuture;
use idv_types::Workflow;

use crate::error::StoreResult;

type ReleaseFn = Box<dyn FnOnce(Workflow) -> BoxFuture<'static, StoreResult<()>> + Send>;

/// Exclusive, transactional access to a single workflow row.
///
/// Holding a `WorkflowGuard` *is* the "exclusive write on the workflow row"
/// the state machine transacts under: acquiring one blocks every other
/// caller trying to lock the same workflow, while workflows with different
/// ids never contend with each other. The guard must be committed (or
/// dropped, discarding the mutation) before another caller can acquire the
/// same workflow's lock.
pub struct WorkflowGuard {
    workflow: Workflow,
    release: ReleaseFn,
}

impl WorkflowGuard {
    pub fn new(workflow: Workflow, release: ReleaseFn) -> Self {
        Self { workflow, release }
    }

    pub fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    pub fn workflow_mut(&mut self) -> &mut Workflow {
        &mut self.workflow
    }

    /// Persist whatever mutations were made and release the lock, returning
    /// the workflow as it was written.
    pub async fn commit(mut self) -> StoreResult<Workflow> {
        self.workflow.touch();
        let persisted = self.workflow.clone();
        (self.release)(self.workflow).await?;
        Ok(persisted)
    }
}

//! The workflow store: one row per identity verification journey, with
//! per-workflow exclusive locking standing in for the "transaction
//! boundary" the state machine needs without a workspace-wide lock.

pub mod error;
pub mod filter;
pub mod guard;
pub mod manual_decision;
pub mod memory;

pub use error::{StoreError, StoreResult};
pub use filter::WorkflowFilter;
pub use guard::WorkflowGuard;
pub use manual_decision::{InMemoryManualDecisionStore, ManualDecisionStore};
pub use memory::InMemoryStore;

use async_trait::async_trait;
use idv_types::{TenantId, Workflow, WorkflowId};

/// Abstraction over workflow persistence, implemented in-memory here and
/// over Postgres (`SELECT ... FOR UPDATE`) in `idv-db`.
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    /// Fetch the workflow, creating it in the `pending` state on first
    /// reference — matching the original's "events can arrive for a
    /// workflow id the store hasn't seen yet" behaviour.
    async fn get_or_create(&self, workflow_id: &WorkflowId, tenant_id: &TenantId) -> StoreResult<Workflow>;

    /// Fetch a workflow without creating it, for the read-only query surface.
    async fn get(&self, workflow_id: &WorkflowId) -> StoreResult<Option<Workflow>>;

    async fn list(&self, filter: WorkflowFilter) -> StoreResult<Vec<Workflow>>;

    /// Acquire exclusive access to a workflow row, creating it if needed.
    /// The caller must `commit` the returned guard to persist any change.
    async fn lock(&self, workflow_id: &WorkflowId, tenant_id: &TenantId) -> StoreResult<WorkflowGuard>;
}

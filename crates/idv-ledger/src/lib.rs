//! The event ledger: the append-only record every other component derives
//! authoritative state from.
//!
//! # Invariants
//!
//! 1. Entries are never mutated or removed once appended.
//! 2. `list_for_workflow` returns entries in the order they were appended.
//! 3. `latest_of_type` is the only way to ask "what does the ledger say
//!    right now" — callers must never prefer a cached field over it when
//!    the two could possibly disagree.

pub mod error;
pub mod memory;

pub use error::{LedgerError, LedgerResult};
pub use memory::InMemoryLedger;

use async_trait::async_trait;
use idv_types::{TenantId, WorkflowEvent, WorkflowId};

/// Abstraction over the append-only event store, implemented in-memory here
/// and over Postgres in `idv-db`.
#[async_trait]
pub trait EventLedger: Send + Sync {
    /// Append a new event. Never fails on a duplicate — the ledger has no
    /// notion of event identity beyond its own generated `EventId`.
    async fn append(&self, event: WorkflowEvent) -> LedgerResult<WorkflowEvent>;

    /// All events recorded for a workflow, oldest first.
    async fn list_for_workflow(&self, workflow_id: &WorkflowId) -> LedgerResult<Vec<WorkflowEvent>>;

    /// All events of a given type recorded for a workflow, oldest first.
    async fn list_of_type(
        &self,
        workflow_id: &WorkflowId,
        event_type: &str,
    ) -> LedgerResult<Vec<WorkflowEvent>>;

    /// The most recently appended event of a given type, if any.
    async fn latest_of_type(
        &self,
        workflow_id: &WorkflowId,
        event_type: &str,
    ) -> LedgerResult<Option<WorkflowEvent>>;

    /// All events across every workflow belonging to a tenant, oldest first.
    /// Used only by the query surface's tenant-scoped listings, not by the
    /// state machine itself.
    async fn list_for_tenant(&self, tenant_id: &TenantId) -> LedgerResult<Vec<WorkflowEvent>>;
}

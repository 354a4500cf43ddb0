use async_trait::async_trait;
use idv_ledger::{EventLedger, LedgerError, LedgerResult};
use idv_types::{EventId, TenantId, WorkflowEvent, WorkflowId};
use sqlx::PgPool;

#[derive(sqlx::FromRow)]
struct DbWorkflowEvent {
    id: String,
    workflow_id: String,
    tenant_id: String,
    event_type: String,
    payload: serde_json::Value,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<DbWorkflowEvent> for WorkflowEvent {
    fn from(row: DbWorkflowEvent) -> Self {
        WorkflowEvent {
            id: EventId::from_raw(row.id),
            workflow_id: WorkflowId::from_raw(row.workflow_id),
            tenant_id: TenantId::from_raw(row.tenant_id),
            event_type: row.event_type,
            payload: row.payload,
            created_at: row.created_at,
        }
    }
}

pub struct PgEventLedger {
    pool: PgPool,
}

impl PgEventLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventLedger for PgEventLedger {
    async fn append(&self, event: WorkflowEvent) -> LedgerResult<WorkflowEvent> {
        sqlx::query(
            r#"
            INSERT INTO workflow_events (id, workflow_id, tenant_id, event_type, payload, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(event.id.as_str())
        .bind(event.workflow_id.as_str())
        .bind(event.tenant_id.as_str())
        .bind(&event.event_type)
        .bind(&event.payload)
        .bind(event.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| LedgerError::Database(e.to_string()))?;
        Ok(event)
    }

    async fn list_for_workflow(&self, workflow_id: &WorkflowId) -> LedgerResult<Vec<WorkflowEvent>> {
        let rows = sqlx::query_as::<_, DbWorkflowEvent>(
            "SELECT * FROM workflow_events WHERE workflow_id = $1 ORDER BY created_at ASC",
        )
        .bind(workflow_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| LedgerError::Database(e.to_string()))?;
        Ok(rows.into_iter().map(WorkflowEvent::from).collect())
    }

    async fn list_of_type(&self, workflow_id: &WorkflowId, event_type: &str) -> LedgerResult<Vec<WorkflowEvent>> {
        let rows = sqlx::query_as::<_, DbWorkflowEvent>(
            r#"
            SELECT * FROM workflow_events
            WHERE workflow_id = $1 AND event_type = $2
            ORDER BY created_at ASC
            "#,
        )
        .bind(workflow_id.as_str())
        .bind(event_type)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| LedgerError::Database(e.to_string()))?;
        Ok(rows.into_iter().map(WorkflowEvent::from).collect())
    }

    async fn latest_of_type(&self, workflow_id: &WorkflowId, event_type: &str) -> LedgerResult<Option<WorkflowEvent>> {
        let row = sqlx::query_as::<_, DbWorkflowEvent>(
            r#"
            SELECT * FROM workflow_events
            WHERE workflow_id = $1 AND event_type = $2
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(workflow_id.as_str())
        .bind(event_type)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| LedgerError::Database(e.to_string()))?;
        Ok(row.map(WorkflowEvent::from))
    }

    async fn list_for_tenant(&self, tenant_id: &TenantId) -> LedgerResult<Vec<WorkflowEvent>> {
        let rows = sqlx::query_as::<_, DbWorkflowEvent>(
            "SELECT * FROM workflow_events WHERE tenant_id = $1 ORDER BY created_at ASC",
        )
        .bind(tenant_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| LedgerError::Database(e.to_string()))?;
        Ok(rows.into_iter().map(WorkflowEvent::from).collect())
    }
}

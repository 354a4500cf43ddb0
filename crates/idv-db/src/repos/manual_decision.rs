use async_trait::async_trait;
use idv_store::{ManualDecisionStore, StoreError, StoreResult};
use idv_types::{ManualDecision, ManualDecisionId, TenantId, WorkflowId};
use sqlx::PgPool;

#[derive(sqlx::FromRow)]
struct DbManualDecision {
    id: String,
    workflow_id: String,
    tenant_id: String,
    decision: String,
    reason: String,
    actor: String,
    decided_at: chrono::DateTime<chrono::Utc>,
}

impl From<DbManualDecision> for ManualDecision {
    fn from(row: DbManualDecision) -> Self {
        ManualDecision {
            id: ManualDecisionId::from_raw(row.id),
            workflow_id: WorkflowId::from_raw(row.workflow_id),
            tenant_id: TenantId::from_raw(row.tenant_id),
            decision: row.decision,
            reason: row.reason,
            actor: row.actor,
            decided_at: row.decided_at,
        }
    }
}

pub struct PgManualDecisionStore {
    pool: PgPool,
}

impl PgManualDecisionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ManualDecisionStore for PgManualDecisionStore {
    async fn record(&self, decision: ManualDecision) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO manual_decisions (id, workflow_id, tenant_id, decision, reason, actor, decided_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(decision.id.as_str())
        .bind(decision.workflow_id.as_str())
        .bind(decision.tenant_id.as_str())
        .bind(&decision.decision)
        .bind(&decision.reason)
        .bind(&decision.actor)
        .bind(decision.decided_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(())
    }

    async fn list_for_workflow(&self, workflow_id: &WorkflowId) -> StoreResult<Vec<ManualDecision>> {
        let rows = sqlx::query_as::<_, DbManualDecision>(
            "SELECT * FROM manual_decisions WHERE workflow_id = $1 ORDER BY decided_at ASC",
        )
        .bind(workflow_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(rows.into_iter().map(ManualDecision::from).collect())
    }
}

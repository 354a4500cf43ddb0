use std::str::FromStr;

use async_trait::async_trait;
use idv_store::{StoreError, StoreResult, WorkflowFilter, WorkflowGuard, WorkflowStore};
use idv_types::{TenantId, Workflow, WorkflowId, WorkflowState};
use sqlx::PgPool;

/// Row shape as it actually sits in Postgres; converted to/from the
/// domain `Workflow` at the edge so `idv-types` never needs an `sqlx`
/// dependency.
#[derive(sqlx::FromRow)]
struct DbWorkflow {
    id: String,
    tenant_id: String,
    state: String,
    selfie_session_id: Option<String>,
    id_session_id: Option<String>,
    risk_score: Option<f64>,
    risk_band: Option<String>,
    decision: Option<String>,
    requires_human: bool,
    data: serde_json::Value,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<DbWorkflow> for Workflow {
    type Error = StoreError;

    fn try_from(row: DbWorkflow) -> Result<Self, Self::Error> {
        let state = WorkflowState::from_str(&row.state)
            .map_err(|e| StoreError::Database(format!("corrupt workflow state: {e}")))?;
        Ok(Workflow {
            id: WorkflowId::from_raw(row.id),
            tenant_id: TenantId::from_raw(row.tenant_id),
            state,
            selfie_session_id: row.selfie_session_id,
            id_session_id: row.id_session_id,
            risk_score: row.risk_score,
            risk_band: row.risk_band,
            decision: row.decision,
            requires_human: row.requires_human,
            data: row.data,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub struct PgWorkflowStore {
    pool: PgPool,
}

impl PgWorkflowStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn upsert(&self, workflow: &Workflow) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO workflows
                (id, tenant_id, state, selfie_session_id, id_session_id,
                 risk_score, risk_band, decision, requires_human, data, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (id) DO UPDATE SET
                state = EXCLUDED.state,
                selfie_session_id = EXCLUDED.selfie_session_id,
                id_session_id = EXCLUDED.id_session_id,
                risk_score = EXCLUDED.risk_score,
                risk_band = EXCLUDED.risk_band,
                decision = EXCLUDED.decision,
                requires_human = EXCLUDED.requires_human,
                data = EXCLUDED.data,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(workflow.id.as_str())
        .bind(workflow.tenant_id.as_str())
        .bind(workflow.state.as_str())
        .bind(&workflow.selfie_session_id)
        .bind(&workflow.id_session_id)
        .bind(workflow.risk_score)
        .bind(&workflow.risk_band)
        .bind(&workflow.decision)
        .bind(workflow.requires_human)
        .bind(&workflow.data)
        .bind(workflow.created_at)
        .bind(workflow.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl WorkflowStore for PgWorkflowStore {
    async fn get_or_create(&self, workflow_id: &WorkflowId, tenant_id: &TenantId) -> StoreResult<Workflow> {
        if let Some(existing) = self.get(workflow_id).await? {
            return Ok(existing);
        }
        let workflow = Workflow::new(workflow_id.clone(), tenant_id.clone());
        self.upsert(&workflow).await?;
        Ok(workflow)
    }

    async fn get(&self, workflow_id: &WorkflowId) -> StoreResult<Option<Workflow>> {
        let row = sqlx::query_as::<_, DbWorkflow>("SELECT * FROM workflows WHERE id = $1")
            .bind(workflow_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;
        row.map(Workflow::try_from).transpose()
    }

    async fn list(&self, filter: WorkflowFilter) -> StoreResult<Vec<Workflow>> {
        let tenant = filter.tenant_id.as_ref().map(|t| t.as_str().to_string());
        let state = filter.state.as_ref().map(|s| s.as_str().to_string());
        let limit = filter.limit.unwrap_or(100).min(idv_store::filter::MAX_LIST_LIMIT) as i64;

        let rows = sqlx::query_as::<_, DbWorkflow>(
            r#"
            SELECT * FROM workflows
            WHERE ($1::text IS NULL OR tenant_id = $1)
              AND ($2::text IS NULL OR state = $2)
            ORDER BY created_at DESC
            LIMIT $3
            "#,
        )
        .bind(tenant)
        .bind(state)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        rows.into_iter().map(Workflow::try_from).collect()
    }

    async fn lock(&self, workflow_id: &WorkflowId, tenant_id: &TenantId) -> StoreResult<WorkflowGuard> {
        // `SELECT ... FOR UPDATE` inside a dedicated transaction is this
        // backend's equivalent of the in-memory store's per-workflow
        // mutex: it blocks any other transaction trying to lock the same
        // row, while unrelated workflows never contend.
        let mut tx = self.pool.begin().await.map_err(|e| StoreError::Database(e.to_string()))?;

        let existing = sqlx::query_as::<_, DbWorkflow>("SELECT * FROM workflows WHERE id = $1 FOR UPDATE")
            .bind(workflow_id.as_str())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let workflow = match existing {
            Some(row) => Workflow::try_from(row)?,
            None => {
                let wf = Workflow::new(workflow_id.clone(), tenant_id.clone());
                sqlx::query(
                    r#"
                    INSERT INTO workflows
                        (id, tenant_id, state, requires_human, data, created_at, updated_at)
                    VALUES ($1, $2, $3, $4, $5, $6, $7)
                    "#,
                )
                .bind(wf.id.as_str())
                .bind(wf.tenant_id.as_str())
                .bind(wf.state.as_str())
                .bind(wf.requires_human)
                .bind(&wf.data)
                .bind(wf.created_at)
                .bind(wf.updated_at)
                .execute(&mut *tx)
                .await
                .map_err(|e| StoreError::Database(e.to_string()))?;
                wf
            }
        };

        Ok(WorkflowGuard::new(
            workflow,
            Box::new(move |updated| {
                Box::pin(async move {
                    // Write the mutation inside the same transaction that
                    // holds the `FOR UPDATE` lock, then commit. Committing
                    // first and writing through a separate connection would
                    // release the lock before the update lands, letting a
                    // concurrent locker observe a stale row.
                    sqlx::query(
                        r#"
                        UPDATE workflows SET
                            tenant_id = $2,
                            state = $3,
                            selfie_session_id = $4,
                            id_session_id = $5,
                            risk_score = $6,
                            risk_band = $7,
                            decision = $8,
                            requires_human = $9,
                            data = $10,
                            updated_at = $11
                        WHERE id = $1
                        "#,
                    )
                    .bind(updated.id.as_str())
                    .bind(updated.tenant_id.as_str())
                    .bind(updated.state.as_str())
                    .bind(&updated.selfie_session_id)
                    .bind(&updated.id_session_id)
                    .bind(updated.risk_score)
                    .bind(&updated.risk_band)
                    .bind(&updated.decision)
                    .bind(updated.requires_human)
                    .bind(&updated.data)
                    .bind(updated.updated_at)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| StoreError::Database(e.to_string()))?;

                    tx.commit().await.map_err(|e| StoreError::Database(e.to_string()))?;
                    Ok(())
                })
            }),
        ))
    }
}

//! Postgres-backed persistence for the identity verification orchestrator.
//!
//! This is the durable counterpart to the in-memory store and ledger in
//! `idv-store`/`idv-ledger`: same trait objects, backed by `workflows`,
//! `workflow_events` and `manual_decisions` tables instead of `DashMap`s.

pub mod config;
pub mod error;
pub mod repos;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

pub use config::DatabaseConfig;
pub use error::{DbError, DbResult};
pub use repos::{PgEventLedger, PgManualDecisionStore, PgWorkflowStore};

/// Postgres connection pool shared by every repository.
pub struct Database {
    pub pool: PgPool,
}

impl Database {
    pub async fn connect(config: &DatabaseConfig) -> DbResult<Self> {
        info!("connecting to postgres: {}", config.postgres_url_masked());

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(std::time::Duration::from_secs(config.acquire_timeout_secs))
            .connect(&config.postgres_url)
            .await
            .map_err(|e| DbError::Connection(e.to_string()))?;

        info!("connected to postgres");
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> DbResult<()> {
        info!("running migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DbError::Migration(e.to_string()))?;
        info!("migrations complete");
        Ok(())
    }

    pub async fn health_check(&self) -> DbResult<bool> {
        let ok = sqlx::query("SELECT 1").fetch_one(&self.pool).await.is_ok();
        Ok(ok)
    }

    pub fn workflow_store(&self) -> PgWorkflowStore {
        PgWorkflowStore::new(self.pool.clone())
    }

    pub fn event_ledger(&self) -> PgEventLedger {
        PgEventLedger::new(self.pool.clone())
    }

    pub fn manual_decision_store(&self) -> PgManualDecisionStore {
        PgManualDecisionStore::new(self.pool.clone())
    }
}

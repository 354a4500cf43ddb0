use thiserror::Error;

pub type DbResult<T> = std::result::Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("migration error: {0}")]
    Migration(String),

    #[error("query error: {0}")]
    Query(#[from] sqlx::Error),

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<DbError> for idv_store::StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(id) => idv_store::StoreError::NotFound(id),
            other => idv_store::StoreError::Database(other.to_string()),
        }
    }
}

impl From<DbError> for idv_ledger::LedgerError {
    fn from(err: DbError) -> Self {
        idv_ledger::LedgerError::Database(err.to_string())
    }
}

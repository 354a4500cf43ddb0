use thiserror::Error;

pub type DecisionResult<T> = std::result::Result<T, DecisionError>;

#[derive(Debug, Error)]
pub enum DecisionError {
    #[error("cannot apply an override before any decision has been finalised for workflow {0}")]
    NoPriorDecision(String),

    #[error("malformed override payload: {0}")]
    MalformedOverride(String),

    #[error("ledger error: {0}")]
    Ledger(#[from] idv_ledger::LedgerError),

    #[error("stored decision payload is corrupt: {0}")]
    CorruptPayload(#[from] serde_json::Error),
}

use thiserror::Error;

pub type EngineResult<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("ambiguous event type: 'event' and 'event_type' disagree ({event:?} vs {event_type:?})")]
    AmbiguousEventType { event: String, event_type: String },

    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error(transparent)]
    Store(#[from] idv_store::StoreError),

    #[error(transparent)]
    Ledger(#[from] idv_ledger::LedgerError),

    #[error(transparent)]
    Decision(#[from] idv_decision::DecisionError),
}

//! Error types shared by the domain model itself (parsing, validation of
//! the closed enums). Crates built on top of `idv-types` define their own
//! richer error enums for I/O and orchestration failures.

use thiserror::Error;

/// Errors raised while constructing or parsing core domain values.
#[derive(Debug, Clone, Error)]
pub enum TypesError {
    #[error("unknown workflow state: {0}")]
    UnknownState(String),

    #[error("unknown jurisdiction: {0}")]
    UnknownJurisdiction(String),

    #[error("unknown decision outcome: {0}")]
    UnknownDecisionOutcome(String),

    #[error("unknown risk band: {0}")]
    UnknownRiskBand(String),
}

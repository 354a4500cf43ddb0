//! Canonical domain types for the identity verification orchestrator.
//!
//! This crate has zero dependencies on any other `idv-*` crate. It defines:
//!
//! - Strongly typed identifiers (`WorkflowId`, `EventId`, ...)
//! - The workflow aggregate and its closed state set
//! - Event ledger rows and manual-decision audit records
//! - The decision vocabulary (`DecisionOutcome`, `RiskBand`, `Jurisdiction`)
//!   and the `DecisionPayload` shape `decision.finalised` events carry

pub mod decision;
pub mod error;
pub mod event;
pub mod ids;
pub mod workflow;

pub use decision::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use workflow::*;

/// Version reported in `authority.service_version` on every decision payload.
pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

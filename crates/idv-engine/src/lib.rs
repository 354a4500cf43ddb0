//! The workflow state machine, its ingress dispatcher, and the read-only
//! query surface layered on top of the event ledger.

pub mod dispatch;
pub mod error;
mod extract;
pub mod handlers;
pub mod query;

pub use error::{EngineError, EngineResult};
pub use handlers::HandlerOutcome;

use std::sync::Arc;
use std::time::Duration;

use idv_decision::DecisionAuthority;
use idv_ledger::EventLedger;
use idv_risk_client::RiskClient;
use idv_store::{ManualDecisionStore, WorkflowStore};

use dispatch::InboundEvent;

/// Default bound on a `risk_evaluate` handler's wait for the risk engine,
/// independent of whatever timeout the risk client itself applies - belt
/// and braces so a misconfigured client can never stall a workflow lock.
pub const DEFAULT_RISK_TIMEOUT: Duration = Duration::from_secs(5);

/// The orchestrator's runtime: the concrete capabilities every handler is
/// given access to. Constructed once per process and shared behind `Arc`s.
pub struct Engine {
    pub(crate) store: Arc<dyn WorkflowStore>,
    pub(crate) ledger: Arc<dyn EventLedger>,
    pub(crate) risk_client: Arc<dyn RiskClient>,
    pub(crate) decision_authority: Arc<DecisionAuthority>,
    pub(crate) manual_decisions: Arc<dyn ManualDecisionStore>,
    pub(crate) risk_timeout: Duration,
}

impl Engine {
    pub fn new(
        store: Arc<dyn WorkflowStore>,
        ledger: Arc<dyn EventLedger>,
        risk_client: Arc<dyn RiskClient>,
        manual_decisions: Arc<dyn ManualDecisionStore>,
    ) -> Self {
        let decision_authority = Arc::new(DecisionAuthority::new(ledger.clone()));
        Self {
            store,
            ledger,
            risk_client,
            decision_authority,
            manual_decisions,
            risk_timeout: DEFAULT_RISK_TIMEOUT,
        }
    }

    pub fn with_risk_timeout(mut self, timeout: Duration) -> Self {
        self.risk_timeout = timeout;
        self
    }

    pub fn store(&self) -> &Arc<dyn WorkflowStore> {
        &self.store
    }

    pub fn ledger(&self) -> &Arc<dyn EventLedger> {
        &self.ledger
    }

    pub fn manual_decisions(&self) -> &Arc<dyn ManualDecisionStore> {
        &self.manual_decisions
    }

    /// Normalise and dispatch one inbound event. This is the single entry
    /// point `POST /v1/events` and the manual-decision endpoint both go
    /// through - the latter synthesises an `override_applied` event rather
    /// than mutating a workflow directly.
    pub async fn dispatch(
        &self,
        event: Option<String>,
        event_type: Option<String>,
        payload: serde_json::Value,
        correlation_id: Option<String>,
    ) -> EngineResult<HandlerOutcome> {
        let inbound: InboundEvent = dispatch::normalize(event, event_type, payload, correlation_id)?;
        handlers::dispatch_event(self, inbound).await
    }
}

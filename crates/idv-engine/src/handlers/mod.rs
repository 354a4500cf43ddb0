mod id_document;
mod match_completed;
mod override_applied;
mod risk_evaluate;
mod selfie;

use idv_types::WorkflowId;

use crate::dispatch::InboundEvent;
use crate::error::EngineResult;
use crate::Engine;

/// What happened to an inbound event once dispatched.
#[derive(Debug, Clone)]
pub enum HandlerOutcome {
    Processed { workflow_id: WorkflowId, event_type: String },
    Ignored { reason: String },
}

/// Route a normalised inbound event to its handler. An event type with no
/// registered handler is not an error - it is ignored, exactly like the
/// original dispatcher's fallthrough.
pub async fn dispatch_event(engine: &Engine, event: InboundEvent) -> EngineResult<HandlerOutcome> {
    match event.event_type.as_str() {
        "selfie_uploaded" => selfie::handle(engine, event).await,
        "id_uploaded" => id_document::handle(engine, event).await,
        "match_completed" => match_completed::handle(engine, event).await,
        "risk_evaluate" => risk_evaluate::handle(engine, event).await,
        "override_applied" => override_applied::handle(engine, event).await,
        other => Ok(HandlerOutcome::Ignored {
            reason: format!("unknown_event_type:{other}"),
        }),
    }
}

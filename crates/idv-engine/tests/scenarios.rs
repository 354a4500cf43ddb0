//! End-to-end scenarios exercising the dispatcher, state machine, and
//! Decision Authority together over the in-memory store/ledger and a
//! canned risk client.

use std::sync::Arc;

use idv_engine::{Engine, HandlerOutcome};
use idv_ledger::{EventLedger, InMemoryLedger};
use idv_risk_client::test_util::StaticRiskClient;
use idv_risk_client::{DegradedRisk, RiskOutcome, RiskResult};
use idv_store::{InMemoryManualDecisionStore, InMemoryStore, WorkflowStore};
use idv_types::{RiskScores, WorkflowState};
use serde_json::json;

fn build_engine(risk_outcome: RiskOutcome) -> (Engine, Arc<InMemoryLedger>, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    let ledger = Arc::new(InMemoryLedger::new());
    let risk_client = Arc::new(StaticRiskClient::new(risk_outcome));
    let manual_decisions = Arc::new(InMemoryManualDecisionStore::new());
    let engine = Engine::new(store.clone(), ledger.clone(), risk_client, manual_decisions);
    (engine, ledger, store)
}

fn ok_outcome(fraud: f64, aml: f64, credit: f64, liquidity: f64) -> RiskOutcome {
    RiskOutcome::Ok(RiskResult {
        scores: RiskScores { fraud, aml, credit, liquidity },
        confidence: 0.92,
        jurisdiction: Some("AU".to_string()),
        reason_codes: vec!["low_velocity".to_string()],
        models: json!({"fraud_model": "v3"}),
        policy_version: Some("1.0.0".to_string()),
    })
}

#[tokio::test]
async fn scenario_selfie_then_id_then_match_progress_the_workflow() {
    let (engine, _ledger, store) = build_engine(ok_outcome(0.1, 0.1, 0.1, 0.1));
    let workflow_id = "wf_scenario_1";

    let outcome = engine
        .dispatch(
            None,
            Some("selfie_uploaded".to_string()),
            json!({"tenant_id": "tenant_acme", "workflow_id": workflow_id, "session_id": "sel_1", "selfie": {"liveness": 0.95}}),
            None,
        )
        .await
        .unwrap();
    assert!(matches!(outcome, HandlerOutcome::Processed { .. }));

    engine
        .dispatch(
            None,
            Some("id_uploaded".to_string()),
            json!({"tenant_id": "tenant_acme", "workflow_id": workflow_id, "session_id": "id_1"}),
            None,
        )
        .await
        .unwrap();

    engine
        .dispatch(
            None,
            Some("match_completed".to_string()),
            json!({"tenant_id": "tenant_acme", "workflow_id": workflow_id, "match": true, "raw_score": 0.9}),
            None,
        )
        .await
        .unwrap();

    let wf = store.get(&workflow_id.into()).await.unwrap().unwrap();
    assert_eq!(wf.state, WorkflowState::MatchVerified);
    assert_eq!(wf.data["selfie"]["liveness"], 0.95);
}

#[tokio::test]
async fn scenario_low_risk_signals_approve_and_emit_one_decision() {
    let (engine, ledger, store) = build_engine(ok_outcome(0.05, 0.05, 0.05, 0.05));
    let workflow_id = "wf_scenario_2";

    engine
        .dispatch(
            None,
            Some("risk_evaluate".to_string()),
            json!({"tenant_id": "tenant_acme", "workflow_id": workflow_id, "signals": {"device_fingerprint": "abc"}}),
            Some("corr_fixed".to_string()),
        )
        .await
        .unwrap();

    let wf = store.get(&workflow_id.into()).await.unwrap().unwrap();
    assert_eq!(wf.state, WorkflowState::RiskEvaluated);
    assert_eq!(wf.decision.as_deref(), Some("approve"));

    let decisions = ledger
        .list_of_type(&workflow_id.into(), "decision.finalised")
        .await
        .unwrap();
    assert_eq!(decisions.len(), 1);
}

#[tokio::test]
async fn scenario_critical_risk_declines() {
    let (engine, _ledger, store) = build_engine(ok_outcome(0.95, 0.95, 0.95, 0.95));
    let workflow_id = "wf_scenario_3";

    engine
        .dispatch(
            None,
            Some("risk_evaluate".to_string()),
            json!({"tenant_id": "tenant_acme", "workflow_id": workflow_id, "signals": {}}),
            None,
        )
        .await
        .unwrap();

    let wf = store.get(&workflow_id.into()).await.unwrap().unwrap();
    assert_eq!(wf.decision.as_deref(), Some("decline"));
    assert!(wf.requires_human);
}

#[tokio::test]
async fn scenario_degraded_risk_engine_leaves_workflow_undecided() {
    let degraded = RiskOutcome::Degraded(DegradedRisk::new("risk_engine_unavailable"));
    let (engine, ledger, store) = build_engine(degraded);
    let workflow_id = "wf_scenario_4";

    engine
        .dispatch(
            None,
            Some("risk_evaluate".to_string()),
            json!({"tenant_id": "tenant_acme", "workflow_id": workflow_id, "signals": {}}),
            None,
        )
        .await
        .unwrap();

    let wf = store.get(&workflow_id.into()).await.unwrap().unwrap();
    assert_eq!(wf.state, WorkflowState::RiskFailed);
    assert!(wf.decision.is_none());

    let decisions = ledger
        .list_of_type(&workflow_id.into(), "decision.finalised")
        .await
        .unwrap();
    assert!(decisions.is_empty());
}

#[tokio::test]
async fn scenario_override_supersedes_an_automated_decision() {
    let (engine, ledger, store) = build_engine(ok_outcome(0.95, 0.95, 0.95, 0.95));
    let workflow_id = "wf_scenario_5";

    engine
        .dispatch(
            None,
            Some("risk_evaluate".to_string()),
            json!({"tenant_id": "tenant_acme", "workflow_id": workflow_id, "signals": {}}),
            None,
        )
        .await
        .unwrap();

    engine
        .dispatch(
            None,
            Some("override_applied".to_string()),
            json!({
                "tenant_id": "tenant_acme",
                "workflow_id": workflow_id,
                "decision": "approve",
                "reason": "manual KYC cleared the flagged signals",
                "overridden_by": "reviewer_42",
            }),
            None,
        )
        .await
        .unwrap();

    let wf = store.get(&workflow_id.into()).await.unwrap().unwrap();
    assert_eq!(wf.state, WorkflowState::OverrideApplied);
    assert_eq!(wf.decision.as_deref(), Some("approve"));

    let decisions = ledger
        .list_of_type(&workflow_id.into(), "decision.finalised")
        .await
        .unwrap();
    assert_eq!(decisions.len(), 2);

    let manual = engine.manual_decisions().list_for_workflow(&workflow_id.into()).await.unwrap();
    assert_eq!(manual.len(), 1);
    assert_eq!(manual[0].actor, "reviewer_42");
}

#[tokio::test]
async fn scenario_override_without_a_prior_decision_is_rejected_and_writes_nothing() {
    let (engine, ledger, store) = build_engine(ok_outcome(0.1, 0.1, 0.1, 0.1));
    let workflow_id = "wf_scenario_6";

    let result = engine
        .dispatch(
            None,
            Some("override_applied".to_string()),
            json!({
                "tenant_id": "tenant_acme",
                "workflow_id": workflow_id,
                "decision": "decline",
                "reason": "no automated decision exists yet",
            }),
            None,
        )
        .await;

    assert!(result.is_err());
    assert!(store.get(&workflow_id.into()).await.unwrap().is_none());
    assert!(ledger.list_for_workflow(&workflow_id.into()).await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_event_type_is_ignored_not_an_error() {
    let (engine, _ledger, _store) = build_engine(ok_outcome(0.1, 0.1, 0.1, 0.1));
    let outcome = engine
        .dispatch(
            None,
            Some("embeddings_ready".to_string()),
            json!({"tenant_id": "tenant_acme", "workflow_id": "wf_ignored"}),
            None,
        )
        .await
        .unwrap();

    assert!(matches!(outcome, HandlerOutcome::Ignored { .. }));
}

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(handlers::health))
        .nest("/v1", v1_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn v1_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/events", post(handlers::ingest_event))
        .route("/workflows", get(handlers::list_workflows))
        .route("/workflows/{id}", get(handlers::get_workflow))
        .route("/workflows/{id}/manual-decision", post(handlers::manual_decision))
        .route("/investigator/workflows/{id}/decisions", get(handlers::decision_timeline))
        .route("/investigator/workflows/{id}/decisions/current", get(handlers::current_decision))
}

//! Maps domain errors onto the HTTP status table from the error-handling
//! design: validation failures are 400s, an override with no prior decision
//! is a 409 conflict, everything else the store/ledger can throw is a 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use idv_engine::EngineError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    fn new(code: &str, message: impl Into<String>) -> Self {
        Self { code: code.to_string(), message: message.into() }
    }

    fn status(&self) -> StatusCode {
        match self.code.as_str() {
            "missing_field" | "ambiguous_event_type" | "malformed_payload" => StatusCode::BAD_REQUEST,
            "no_prior_decision" => StatusCode::CONFLICT,
            "not_found" => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(self)).into_response()
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match &err {
            EngineError::MissingField(_) => ApiError::new("missing_field", err.to_string()),
            EngineError::AmbiguousEventType { .. } => ApiError::new("ambiguous_event_type", err.to_string()),
            EngineError::MalformedPayload(_) => ApiError::new("malformed_payload", err.to_string()),
            EngineError::Decision(idv_decision::DecisionError::NoPriorDecision(_)) => {
                ApiError::new("no_prior_decision", err.to_string())
            }
            EngineError::Decision(idv_decision::DecisionError::MalformedOverride(_)) => {
                ApiError::new("malformed_payload", err.to_string())
            }
            EngineError::Store(idv_store::StoreError::NotFound(_)) => ApiError::new("not_found", err.to_string()),
            _ => ApiError::new("internal_error", err.to_string()),
        }
    }
}

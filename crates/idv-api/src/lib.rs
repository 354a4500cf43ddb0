//! HTTP surface for the identity verification orchestrator: one ingress
//! endpoint, a read-only query surface, and the manual-decision endpoint
//! that synthesises an `override_applied` event rather than writing the
//! workflow cache directly.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::router;
pub use state::AppState;

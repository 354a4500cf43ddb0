//! Strongly typed identifiers for the orchestrator's domain objects.
//!
//! Every identifier is a prefixed string (`wf_...`, `evt_...`, ...) rather
//! than a bare UUID, matching the identifiers the capture front-end and the
//! risk engine already exchange on the wire. Wrapping them prevents mixing
//! up a `WorkflowId` with a `CorrelationId` at the call site.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate prefixed string ID types with common implementations.
macro_rules! define_id_type {
    ($name:ident, $prefix:literal, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Generate a new random ID with the canonical prefix.
            pub fn new() -> Self {
                Self(format!("{}_{}", $prefix, uuid::Uuid::new_v4().simple()))
            }

            /// Wrap an existing string value verbatim (e.g. one supplied by
            /// the capture front-end in an inbound event payload).
            pub fn from_raw(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            /// Borrow the underlying string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id_type!(WorkflowId, "wf", "Unique identifier for an identity verification workflow");
define_id_type!(EventId, "evt", "Unique identifier for a workflow event ledger row");
define_id_type!(ManualDecisionId, "md", "Unique identifier for a manual (human override) decision record");
define_id_type!(DecisionId, "dec", "Unique identifier for a finalised decision");
define_id_type!(TenantId, "tenant", "Unique identifier for a tenant");
define_id_type!(CorrelationId, "corr", "Correlation identifier threading a request across components");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_carry_the_right_prefix() {
        assert!(WorkflowId::new().0.starts_with("wf_"));
        assert!(EventId::new().0.starts_with("evt_"));
        assert!(CorrelationId::new().0.starts_with("corr_"));
    }

    #[test]
    fn from_raw_preserves_external_ids_verbatim() {
        let id = WorkflowId::from_raw("wf_abc123");
        assert_eq!(id.as_str(), "wf_abc123");
    }

    #[test]
    fn display_matches_inner_string() {
        let id = TenantId::from_raw("tenant_acme");
        assert_eq!(id.to_string(), "tenant_acme");
    }
}

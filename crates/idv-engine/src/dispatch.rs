//! Ingress normalisation: turns whatever the capture front-end or the
//! manual-decision HTTP handler posted into a single, validated
//! [`InboundEvent`] before any handler sees it.

use idv_types::TenantId;
use serde_json::Value;

use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub event_type: String,
    pub tenant_id: TenantId,
    pub payload: Value,
    pub correlation_id: Option<String>,
}

/// Accepts either an `event` or an `event_type` field (the two original
/// ingress paths used different names); rejects a payload that supplies
/// both with disagreeing normalised values rather than silently preferring
/// one, per the "reject ambiguity" design.
pub fn normalize(
    event: Option<String>,
    event_type: Option<String>,
    payload: Value,
    correlation_id: Option<String>,
) -> EngineResult<InboundEvent> {
    let normalized_event = event.as_deref().map(normalize_event_type);
    let normalized_event_type = event_type.as_deref().map(normalize_event_type);

    let resolved = match (normalized_event, normalized_event_type) {
        (Some(a), Some(b)) if a != b => {
            return Err(EngineError::AmbiguousEventType { event: a, event_type: b })
        }
        (Some(a), _) => a,
        (None, Some(b)) => b,
        (None, None) => return Err(EngineError::MissingField("event or event_type")),
    };

    let tenant_id = payload
        .get("tenant_id")
        .and_then(Value::as_str)
        .map(TenantId::from_raw)
        .ok_or(EngineError::MissingField("tenant_id"))?;

    Ok(InboundEvent { event_type: resolved, tenant_id, payload, correlation_id })
}

fn normalize_event_type(raw: &str) -> String {
    raw.replace('.', "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_event_field_alone() {
        let result = normalize(Some("selfie.uploaded".to_string()), None, json!({"tenant_id": "t1"}), None).unwrap();
        assert_eq!(result.event_type, "selfie_uploaded");
    }

    #[test]
    fn accepts_event_type_field_alone() {
        let result = normalize(None, Some("id_uploaded".to_string()), json!({"tenant_id": "t1"}), None).unwrap();
        assert_eq!(result.event_type, "id_uploaded");
    }

    #[test]
    fn agreeing_duplicate_fields_are_fine() {
        let result = normalize(
            Some("match_completed".to_string()),
            Some("match_completed".to_string()),
            json!({"tenant_id": "t1"}),
            None,
        )
        .unwrap();
        assert_eq!(result.event_type, "match_completed");
    }

    #[test]
    fn disagreeing_duplicate_fields_are_rejected() {
        let result = normalize(
            Some("selfie_uploaded".to_string()),
            Some("id_uploaded".to_string()),
            json!({"tenant_id": "t1"}),
            None,
        );
        assert!(matches!(result, Err(EngineError::AmbiguousEventType { .. })));
    }

    #[test]
    fn missing_tenant_id_is_rejected() {
        let result = normalize(Some("selfie_uploaded".to_string()), None, json!({}), None);
        assert!(matches!(result, Err(EngineError::MissingField("tenant_id"))));
    }

    #[test]
    fn missing_event_type_is_rejected() {
        let result = normalize(None, None, json!({"tenant_id": "t1"}), None);
        assert!(matches!(result, Err(EngineError::MissingField(_))));
    }
}

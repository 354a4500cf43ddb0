//! A canned risk client for exercising `idv-engine`'s own tests without a
//! network dependency.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::{RiskClient, RiskOutcome};

/// Always returns the same outcome it was constructed with, or the next one
/// off a queue if `push` was used to stage a sequence.
pub struct StaticRiskClient {
    outcomes: Mutex<Vec<RiskOutcome>>,
    default: RiskOutcome,
}

impl StaticRiskClient {
    pub fn new(default: RiskOutcome) -> Self {
        Self { outcomes: Mutex::new(Vec::new()), default }
    }

    /// Queue an outcome to be returned by the next call, before falling
    /// back to the default.
    pub fn push(&self, outcome: RiskOutcome) {
        self.outcomes.lock().unwrap().push(outcome);
    }
}

#[async_trait]
impl RiskClient for StaticRiskClient {
    async fn evaluate(&self, _signals: serde_json::Value) -> RiskOutcome {
        let mut queue = self.outcomes.lock().unwrap();
        if queue.is_empty() {
            self.default.clone()
        } else {
            queue.remove(0)
        }
    }
}

use crate::types::ScoringInput;
use serde::Deserialize;
use uuid::Uuid;

/// Body of an agent invocation.
#[derive(Debug, Deserialize)]
pub struct InvocationRequest {
    pub input: ScoringInput,
}

/// Customer's verification decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallbackDecision {
    Approved,
    Declined,
}

/// Body of a verification callback.
#[derive(Debug, Deserialize)]
pub struct CallbackRequest {
    #[serde(rename = "callbackId")]
    pub callback_id: Uuid,
    pub result: CallbackDecision,
}

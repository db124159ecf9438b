//! Shared test doubles for the model client.

use crate::agent::client::{
    ContentBlock, ConverseReply, ConverseRequest, ModelClient, ModelClientError, StopReason,
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Model double that replays a fixed sequence of replies and records every
/// request it receives.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<ConverseReply, ModelClientError>>>,
    requests: Mutex<Vec<ConverseRequest>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<ConverseReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(Ok).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Model whose first call fails with the given error.
    pub fn failing(error: ModelClientError) -> Self {
        Self {
            replies: Mutex::new(VecDeque::from([Err(error)])),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn recorded_requests(&self) -> Vec<ConverseRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for ScriptedModel {
    async fn converse(&self, request: &ConverseRequest) -> Result<ConverseReply, ModelClientError> {
        self.requests.lock().unwrap().push(request.clone());

        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ModelClientError::RetriesExhausted {
                attempts: 0,
                last_error: "scripted replies exhausted".to_string(),
            }))
    }
}

/// Reply asking for one tool invocation.
pub fn tool_use_reply(id: &str, name: &str, input: Value) -> ConverseReply {
    ConverseReply {
        stop_reason: StopReason::ToolUse,
        content: vec![ContentBlock::ToolUse {
            id: id.to_string(),
            name: name.to_string(),
            input,
        }],
    }
}

/// Final text reply ending the conversation.
pub fn final_reply(text: &str) -> ConverseReply {
    ConverseReply {
        stop_reason: StopReason::EndTurn,
        content: vec![ContentBlock::Text {
            text: text.to_string(),
        }],
    }
}

/// Final reply carrying a well-formed assessment for the given score.
pub fn assessment_reply(risk_score: i32, amount: f64) -> ConverseReply {
    final_reply(&format!(
        r#"{{"risk_score": {risk_score}, "risk_detail": "scripted assessment", "amount": {amount}}}"#
    ))
}

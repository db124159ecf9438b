//! Tool-use loop driving the hosted model through a fraud assessment.

use crate::agent::client::{
    ContentBlock, ConverseRequest, Message, ModelClient, ModelClientError, StopReason, ToolSpec,
};
use crate::agent::prompt::{parse_assessment, transaction_prompt, SYSTEM_PROMPT};
use crate::config::AgentConfig;
use crate::scoring::{RuleSet, ScoreAggregator};
use crate::types::{RiskAssessment, ScoringInput};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("model call failed: {0}")]
    Model(#[from] ModelClientError),

    #[error("model reply contained no parseable assessment: {raw}")]
    MalformedReply { raw: String },

    #[error("tool loop exceeded {limit} turns without a final reply")]
    TurnLimit { limit: usize },
}

/// Fraud assessment agent.
///
/// Presents the rule checks as tools, executes them locally when the model
/// requests them, and parses the model's final JSON reply.
pub struct FraudAgent {
    model: Arc<dyn ModelClient>,
    rules: RuleSet,
    aggregator: ScoreAggregator,
    model_id: String,
    max_turns: usize,
}

impl FraudAgent {
    pub fn new(model: Arc<dyn ModelClient>, config: &AgentConfig, rules: RuleSet) -> Self {
        Self {
            model,
            rules,
            aggregator: ScoreAggregator::new(),
            model_id: config.model_id.clone(),
            max_turns: config.max_turns,
        }
    }

    /// Tool definitions offered to the model on every turn.
    pub fn tool_specs() -> Vec<ToolSpec> {
        vec![
            ToolSpec {
                name: "check_transaction_amount".to_string(),
                description: "Check if a transaction amount exceeds the high-risk threshold"
                    .to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "amount": {"type": "number", "description": "Transaction amount in USD"}
                    },
                    "required": ["amount"]
                }),
            },
            ToolSpec {
                name: "check_vendor_risk".to_string(),
                description: "Evaluate the risk level of a vendor based on known fraud patterns"
                    .to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "vendor": {"type": "string", "description": "Name of the merchant/vendor"}
                    },
                    "required": ["vendor"]
                }),
            },
            ToolSpec {
                name: "check_location_risk".to_string(),
                description: "Assess the fraud risk associated with a transaction location"
                    .to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "location": {"type": "string", "description": "City or region of the transaction"}
                    },
                    "required": ["location"]
                }),
            },
            ToolSpec {
                name: "calculate_fraud_score".to_string(),
                description: "Aggregate individual risk scores into a final fraud verdict"
                    .to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "amount_score": {"type": "integer"},
                        "vendor_score": {"type": "integer"},
                        "location_score": {"type": "integer"}
                    },
                    "required": ["amount_score", "vendor_score", "location_score"]
                }),
            },
        ]
    }

    /// Run a full assessment for one transaction.
    pub async fn assess(&self, input: &ScoringInput) -> Result<RiskAssessment, AgentError> {
        let mut messages = vec![Message::user_text(transaction_prompt(input))];

        for turn in 0..self.max_turns {
            let request = ConverseRequest {
                model: self.model_id.clone(),
                system: SYSTEM_PROMPT.to_string(),
                messages: messages.clone(),
                tools: Self::tool_specs(),
            };

            let reply = self.model.converse(&request).await?;

            match reply.stop_reason {
                StopReason::ToolUse => {
                    let mut results = Vec::new();

                    for block in &reply.content {
                        if let ContentBlock::ToolUse { id, name, input } = block {
                            debug!(tool = %name, turn, "Executing requested tool");
                            results.push(ContentBlock::ToolResult {
                                tool_use_id: id.clone(),
                                content: self.run_tool(name, input),
                            });
                        }
                    }

                    messages.push(Message::assistant(reply.content));
                    messages.push(Message::tool_results(results));
                }
                StopReason::EndTurn => {
                    let text = reply.text();
                    debug!(turn, "Model produced final reply");
                    return parse_assessment(&text)
                        .ok_or(AgentError::MalformedReply { raw: text });
                }
            }
        }

        Err(AgentError::TurnLimit {
            limit: self.max_turns,
        })
    }

    /// Execute one tool request against the local rule checks.
    fn run_tool(&self, name: &str, args: &Value) -> Value {
        match name {
            "check_transaction_amount" => {
                let amount = args.get("amount").and_then(Value::as_f64).unwrap_or(0.0);
                to_result(self.rules.amount.evaluate(amount))
            }
            "check_vendor_risk" => {
                let vendor = args.get("vendor").and_then(Value::as_str).unwrap_or("");
                to_result(self.rules.vendor.evaluate(vendor))
            }
            "check_location_risk" => {
                let location = args.get("location").and_then(Value::as_str).unwrap_or("");
                to_result(self.rules.location.evaluate(location))
            }
            "calculate_fraud_score" => {
                let amount_score = int_arg(args, "amount_score");
                let vendor_score = int_arg(args, "vendor_score");
                let location_score = int_arg(args, "location_score");
                to_result(
                    self.aggregator
                        .aggregate(amount_score, vendor_score, location_score),
                )
            }
            other => {
                warn!(tool = %other, "Model requested unknown tool");
                json!({"error": format!("unknown tool: {other}")})
            }
        }
    }
}

fn to_result<T: serde::Serialize>(value: T) -> Value {
    serde_json::to_value(value).unwrap_or_default()
}

fn int_arg(args: &Value, key: &str) -> u32 {
    args.get(key).and_then(Value::as_u64).unwrap_or(0) as u32
}

//! Transaction decision workflow
//!
//! Routes a scored transaction to authorization, fraud-department escalation,
//! or suspension pending human verification.

pub mod engine;
pub mod verification;

pub use engine::{WorkflowEngine, WorkflowError};
pub use verification::{Channel, EmailNotifier, Notifier, SmsNotifier};

use crate::config::RoutingConfig;
use crate::types::Transaction;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where a scored transaction goes next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Low risk, authorize immediately
    Authorize,
    /// High risk, send to the fraud department
    Escalate,
    /// Medium risk, suspend and request human verification
    Verify,
}

/// Route a fraud score. Scores below `authorize_below` authorize, scores at or
/// above `escalate_at` escalate, everything between is verified.
pub fn route_for(score: i32, routing: &RoutingConfig) -> Route {
    if score < routing.authorize_below {
        Route::Authorize
    } else if score >= routing.escalate_at {
        Route::Escalate
    } else {
        Route::Verify
    }
}

/// Final disposition of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionResult {
    #[serde(rename = "authorized")]
    Authorized,
    #[serde(rename = "SentToFraudDept")]
    SentToFraudDept,
}

impl DecisionResult {
    pub fn as_str(self) -> &'static str {
        match self {
            DecisionResult::Authorized => "authorized",
            DecisionResult::SentToFraudDept => "SentToFraudDept",
        }
    }
}

/// Outcome of the human verification step, when one happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationResult {
    TransactionApproved,
    TransactionDeclined,
}

/// Completed decision for a transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionOutcome {
    pub transaction_id: i64,
    pub amount: f64,
    pub fraud_score: i32,
    pub result: DecisionResult,
    #[serde(
        rename = "customerVerificationResult",
        skip_serializing_if = "Option::is_none"
    )]
    pub customer_verification_result: Option<VerificationResult>,
}

impl TransactionOutcome {
    pub fn authorized(
        tx: &Transaction,
        fraud_score: i32,
        verification: Option<VerificationResult>,
    ) -> Self {
        Self {
            transaction_id: tx.id,
            amount: tx.amount,
            fraud_score,
            result: DecisionResult::Authorized,
            customer_verification_result: verification,
        }
    }

    pub fn escalated(
        tx: &Transaction,
        fraud_score: i32,
        verification: Option<VerificationResult>,
    ) -> Self {
        Self {
            transaction_id: tx.id,
            amount: tx.amount,
            fraud_score,
            result: DecisionResult::SentToFraudDept,
            customer_verification_result: verification,
        }
    }
}

/// A pending verification callback handed back to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct CallbackHandle {
    pub callback_id: Uuid,
    pub channel: Channel,
}

/// Current workflow state of a transaction.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransactionState {
    Completed {
        outcome: TransactionOutcome,
    },
    PendingVerification {
        transaction_id: i64,
        fraud_score: i32,
        callbacks: Vec<CallbackHandle>,
        expires_at: DateTime<Utc>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_bands() {
        let routing = RoutingConfig::default();

        assert_eq!(route_for(1, &routing), Route::Authorize);
        assert_eq!(route_for(2, &routing), Route::Authorize);
        assert_eq!(route_for(3, &routing), Route::Verify);
        assert_eq!(route_for(4, &routing), Route::Verify);
        assert_eq!(route_for(5, &routing), Route::Escalate);
        assert_eq!(route_for(7, &routing), Route::Escalate);
    }

    #[test]
    fn test_outcome_wire_format() {
        let tx = Transaction {
            id: 12,
            amount: 1200.0,
            location: "Seattle".to_string(),
            vendor: "Online Gaming Store".to_string(),
            score: 0,
        };

        let outcome =
            TransactionOutcome::authorized(&tx, 2, Some(VerificationResult::TransactionApproved));
        let json = serde_json::to_value(&outcome).unwrap();

        assert_eq!(json["transaction_id"], 12);
        assert_eq!(json["result"], "authorized");
        assert_eq!(json["customerVerificationResult"], "TransactionApproved");
    }

    #[test]
    fn test_outcome_omits_absent_verification() {
        let tx = Transaction {
            id: 7,
            amount: 45.0,
            location: "Portland".to_string(),
            vendor: "Coffee Shop".to_string(),
            score: 0,
        };

        let json = serde_json::to_value(TransactionOutcome::escalated(&tx, 5, None)).unwrap();
        assert_eq!(json["result"], "SentToFraudDept");
        assert!(json.get("customerVerificationResult").is_none());
    }
}

//! Workflow engine driving scoring, routing, and verification.

use crate::agent::{AgentError, FraudAgent};
use crate::config::{RoutingConfig, VerificationConfig};
use crate::metrics::ServiceMetrics;
use crate::types::Transaction;
use crate::workflow::verification::{send_with_retry, Notifier, VerificationRegistry};
use crate::workflow::{route_for, Route, TransactionOutcome, TransactionState, VerificationResult};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

/// Score assigned when the agent returns no usable assessment.
const ESCALATION_SCORE: i32 = 5;

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("agent assessment failed: {0}")]
    Agent(#[from] AgentError),

    #[error("unknown or expired callback id: {0}")]
    UnknownCallback(Uuid),
}

/// Orchestrates the decision workflow for incoming transactions.
pub struct WorkflowEngine {
    agent: Arc<FraudAgent>,
    registry: VerificationRegistry,
    notifiers: Vec<Arc<dyn Notifier>>,
    routing: RoutingConfig,
    verification: VerificationConfig,
    metrics: Arc<ServiceMetrics>,
}

impl WorkflowEngine {
    pub fn new(
        agent: Arc<FraudAgent>,
        notifiers: Vec<Arc<dyn Notifier>>,
        routing: RoutingConfig,
        verification: VerificationConfig,
        metrics: Arc<ServiceMetrics>,
    ) -> Self {
        Self {
            agent,
            registry: VerificationRegistry::new(),
            notifiers,
            routing,
            verification,
            metrics,
        }
    }

    /// Run the full decision workflow for one transaction.
    pub async fn process(&self, tx: Transaction) -> Result<TransactionState, WorkflowError> {
        let score = self.fraud_check(&tx).await?;
        info!(transaction_id = tx.id, fraud_score = score, "Transaction scored");

        let state = match route_for(score, &self.routing) {
            Route::Authorize => {
                info!(transaction_id = tx.id, "Authorizing transaction");
                let outcome = TransactionOutcome::authorized(&tx, score, None);
                self.metrics.record_decision(outcome.result.as_str());
                self.registry.insert_completed(&tx, score, outcome.clone());
                TransactionState::Completed { outcome }
            }
            Route::Escalate => {
                info!(
                    transaction_id = tx.id,
                    "Escalating to fraud department"
                );
                let outcome = TransactionOutcome::escalated(&tx, score, None);
                self.metrics.record_decision(outcome.result.as_str());
                self.registry.insert_completed(&tx, score, outcome.clone());
                TransactionState::Completed { outcome }
            }
            Route::Verify => self.suspend_for_verification(&tx, score).await,
        };

        Ok(state)
    }

    /// Suspend a medium-risk transaction and notify every verification channel.
    async fn suspend_for_verification(&self, tx: &Transaction, score: i32) -> TransactionState {
        info!(
            transaction_id = tx.id,
            "Suspending transaction pending human verification"
        );

        let expires_at =
            Utc::now() + chrono::Duration::seconds(self.verification.timeout_secs as i64);
        let channels: Vec<_> = self.notifiers.iter().map(|n| n.channel()).collect();
        let callbacks = self
            .registry
            .begin_verification(tx, score, &channels, expires_at);

        let sends = self
            .notifiers
            .iter()
            .zip(callbacks.iter())
            .map(|(notifier, cb)| {
                let notifier = notifier.clone();
                let tx = tx.clone();
                let callback_id = cb.callback_id;
                let attempts = self.verification.notify_max_attempts;
                async move {
                    if let Err(e) =
                        send_with_retry(notifier.as_ref(), attempts, callback_id, &tx).await
                    {
                        // One live channel is enough; a failed channel only
                        // narrows the customer's options.
                        warn!(
                            channel = ?notifier.channel(),
                            transaction_id = tx.id,
                            error = %e,
                            "Verification notification failed after retries"
                        );
                    }
                }
            });
        futures::future::join_all(sends).await;

        self.metrics.record_decision("suspended");

        // begin_verification stored the pending state
        self.registry
            .state_of(tx.id)
            .unwrap_or_else(|| TransactionState::PendingVerification {
                transaction_id: tx.id,
                fraud_score: score,
                callbacks: Vec::new(),
                expires_at,
            })
    }

    /// Obtain the transaction's risk score, calling the agent only when the
    /// caller did not supply one.
    async fn fraud_check(&self, tx: &Transaction) -> Result<i32, WorkflowError> {
        if tx.score != 0 {
            return Ok(tx.score);
        }

        info!(
            transaction_id = tx.id,
            "No score submitted, sending to fraud agent for assessment"
        );

        match self.agent.assess(&tx.scoring_input()).await {
            Ok(assessment) => Ok(assessment.risk_score.value()),
            Err(AgentError::MalformedReply { .. }) => {
                info!(
                    transaction_id = tx.id,
                    "No valid response from agent, escalating to fraud department"
                );
                Ok(ESCALATION_SCORE)
            }
            Err(e) => Err(WorkflowError::Agent(e)),
        }
    }

    /// Resolve a pending verification callback.
    pub fn resolve_callback(
        &self,
        callback_id: Uuid,
        approved: bool,
    ) -> Result<TransactionState, WorkflowError> {
        let pending = self
            .registry
            .take_callback(callback_id)
            .ok_or(WorkflowError::UnknownCallback(callback_id))?;

        let (tx, score) = self
            .registry
            .transaction_of(pending.transaction_id)
            .ok_or(WorkflowError::UnknownCallback(callback_id))?;

        // First resolution wins; sibling channels are cancelled
        self.registry.clear_pending_for(pending.transaction_id);

        let outcome = if approved {
            info!(
                transaction_id = tx.id,
                channel = ?pending.channel,
                "Verification passed, authorizing transaction"
            );
            TransactionOutcome::authorized(
                &tx,
                score,
                Some(VerificationResult::TransactionApproved),
            )
        } else {
            info!(
                transaction_id = tx.id,
                channel = ?pending.channel,
                "Verification failed, escalating to fraud department"
            );
            TransactionOutcome::escalated(&tx, score, Some(VerificationResult::TransactionDeclined))
        };

        self.metrics.record_decision(outcome.result.as_str());
        self.registry.complete(tx.id, outcome.clone());

        Ok(TransactionState::Completed { outcome })
    }

    /// Current workflow state of a transaction.
    pub fn state_of(&self, transaction_id: i64) -> Option<TransactionState> {
        self.registry.state_of(transaction_id)
    }

    /// Escalate every verification whose channels have all expired.
    pub fn expire_due(&self, now: chrono::DateTime<Utc>) -> Vec<TransactionOutcome> {
        let mut escalated = Vec::new();

        for tx_id in self.registry.take_expired(now) {
            if let Some((tx, score)) = self.registry.transaction_of(tx_id) {
                info!(
                    transaction_id = tx_id,
                    "Verification timed out, escalating to fraud department"
                );
                let outcome = TransactionOutcome::escalated(
                    &tx,
                    score,
                    Some(VerificationResult::TransactionDeclined),
                );
                self.metrics.record_decision(outcome.result.as_str());
                self.registry.complete(tx_id, outcome.clone());
                escalated.push(outcome);
            }
        }

        escalated
    }

    /// Periodic task escalating expired verifications.
    pub async fn run_expiry_sweeper(self: Arc<Self>) {
        let mut interval =
            tokio::time::interval(Duration::from_secs(self.verification.sweep_interval_secs));
        loop {
            interval.tick().await;
            let escalated = self.expire_due(Utc::now());
            if !escalated.is_empty() {
                info!(count = escalated.len(), "Escalated expired verifications");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgentConfig;
    use crate::scoring::RuleSet;
    use crate::test_support::{assessment_reply, ScriptedModel};
    use crate::workflow::verification::{EmailNotifier, SmsNotifier};
    use crate::workflow::DecisionResult;

    fn test_engine(model: Arc<ScriptedModel>, timeout_secs: u64) -> WorkflowEngine {
        let agent_config = AgentConfig {
            endpoint: "http://localhost:9400".to_string(),
            model_id: "fraud-guard-v1".to_string(),
            timeout_secs: 5,
            max_retries: 0,
            max_turns: 4,
        };
        let agent = Arc::new(FraudAgent::new(model, &agent_config, RuleSet::default()));

        WorkflowEngine::new(
            agent,
            vec![Arc::new(EmailNotifier), Arc::new(SmsNotifier)],
            RoutingConfig::default(),
            VerificationConfig {
                timeout_secs,
                notify_max_attempts: 3,
                sweep_interval_secs: 60,
            },
            Arc::new(ServiceMetrics::new()),
        )
    }

    fn tx(id: i64, score: i32) -> Transaction {
        Transaction {
            id,
            amount: 1200.0,
            location: "Seattle".to_string(),
            vendor: "Online Gaming Store".to_string(),
            score,
        }
    }

    #[tokio::test]
    async fn provided_score_skips_the_agent() {
        let model = Arc::new(ScriptedModel::new(vec![]));
        let engine = test_engine(model.clone(), 3600);

        let state = engine.process(tx(1, 1)).await.unwrap();

        match state {
            TransactionState::Completed { outcome } => {
                assert_eq!(outcome.result, DecisionResult::Authorized);
                assert_eq!(outcome.fraud_score, 1);
            }
            other => panic!("expected completed state, got {other:?}"),
        }
        assert!(model.recorded_requests().is_empty());
    }

    #[tokio::test]
    async fn unscored_transaction_is_assessed_by_the_agent() {
        let model = Arc::new(ScriptedModel::new(vec![assessment_reply(2, 1200.0)]));
        let engine = test_engine(model.clone(), 3600);

        let state = engine.process(tx(2, 0)).await.unwrap();

        match state {
            TransactionState::Completed { outcome } => {
                assert_eq!(outcome.result, DecisionResult::Authorized);
                assert_eq!(outcome.fraud_score, 2);
            }
            other => panic!("expected completed state, got {other:?}"),
        }
        assert_eq!(model.recorded_requests().len(), 1);
    }

    #[tokio::test]
    async fn high_scores_escalate() {
        let engine = test_engine(Arc::new(ScriptedModel::new(vec![])), 3600);

        let state = engine.process(tx(3, 5)).await.unwrap();

        match state {
            TransactionState::Completed { outcome } => {
                assert_eq!(outcome.result, DecisionResult::SentToFraudDept);
                assert!(outcome.customer_verification_result.is_none());
            }
            other => panic!("expected completed state, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn medium_scores_suspend_with_two_callbacks() {
        let engine = test_engine(Arc::new(ScriptedModel::new(vec![])), 3600);

        let state = engine.process(tx(4, 3)).await.unwrap();

        match state {
            TransactionState::PendingVerification { callbacks, .. } => {
                assert_eq!(callbacks.len(), 2);
            }
            other => panic!("expected pending state, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn approved_callback_authorizes() {
        let engine = test_engine(Arc::new(ScriptedModel::new(vec![])), 3600);

        let state = engine.process(tx(5, 4)).await.unwrap();
        let callback_id = match state {
            TransactionState::PendingVerification { callbacks, .. } => callbacks[0].callback_id,
            other => panic!("expected pending state, got {other:?}"),
        };

        let resolved = engine.resolve_callback(callback_id, true).unwrap();
        match resolved {
            TransactionState::Completed { outcome } => {
                assert_eq!(outcome.result, DecisionResult::Authorized);
                assert_eq!(
                    outcome.customer_verification_result,
                    Some(VerificationResult::TransactionApproved)
                );
            }
            other => panic!("expected completed state, got {other:?}"),
        }

        // Sibling callback was cancelled with the first resolution
        let err = engine.resolve_callback(callback_id, true).unwrap_err();
        assert!(matches!(err, WorkflowError::UnknownCallback(_)));
    }

    #[tokio::test]
    async fn declined_callback_escalates() {
        let engine = test_engine(Arc::new(ScriptedModel::new(vec![])), 3600);

        let state = engine.process(tx(6, 3)).await.unwrap();
        let callback_id = match state {
            TransactionState::PendingVerification { callbacks, .. } => callbacks[1].callback_id,
            other => panic!("expected pending state, got {other:?}"),
        };

        let resolved = engine.resolve_callback(callback_id, false).unwrap();
        match resolved {
            TransactionState::Completed { outcome } => {
                assert_eq!(outcome.result, DecisionResult::SentToFraudDept);
                assert_eq!(
                    outcome.customer_verification_result,
                    Some(VerificationResult::TransactionDeclined)
                );
            }
            other => panic!("expected completed state, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn expired_verifications_escalate() {
        let engine = test_engine(Arc::new(ScriptedModel::new(vec![])), 0);

        engine.process(tx(7, 3)).await.unwrap();

        let escalated = engine.expire_due(Utc::now() + chrono::Duration::seconds(1));
        assert_eq!(escalated.len(), 1);
        assert_eq!(escalated[0].result, DecisionResult::SentToFraudDept);
        assert_eq!(
            escalated[0].customer_verification_result,
            Some(VerificationResult::TransactionDeclined)
        );

        match engine.state_of(7) {
            Some(TransactionState::Completed { outcome }) => {
                assert_eq!(outcome.result, DecisionResult::SentToFraudDept);
            }
            other => panic!("expected completed state, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_agent_reply_escalates_with_score_five() {
        let model = Arc::new(ScriptedModel::new(vec![
            crate::test_support::final_reply("no json here"),
        ]));
        let engine = test_engine(model, 3600);

        let state = engine.process(tx(8, 0)).await.unwrap();

        match state {
            TransactionState::Completed { outcome } => {
                assert_eq!(outcome.fraud_score, 5);
                assert_eq!(outcome.result, DecisionResult::SentToFraudDept);
            }
            other => panic!("expected completed state, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn transport_failures_surface_as_errors() {
        let model = Arc::new(ScriptedModel::failing(
            crate::agent::ModelClientError::RetriesExhausted {
                attempts: 3,
                last_error: "connection refused".to_string(),
            },
        ));
        let engine = test_engine(model, 3600);

        let err = engine.process(tx(9, 0)).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Agent(AgentError::Model(_))));
    }
}

//! Human verification plumbing: callback registry and notification channels.

use crate::types::Transaction;
use crate::workflow::{CallbackHandle, TransactionOutcome, TransactionState};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

/// Verification notification channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Sms,
}

#[derive(Debug, thiserror::Error)]
#[error("notification transport error: {0}")]
pub struct NotifyError(pub String);

/// Delivery of a verification request to the customer.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn channel(&self) -> Channel;

    async fn notify(&self, callback_id: Uuid, tx: &Transaction) -> Result<(), NotifyError>;
}

/// Email verification channel.
pub struct EmailNotifier;

#[async_trait]
impl Notifier for EmailNotifier {
    fn channel(&self) -> Channel {
        Channel::Email
    }

    async fn notify(&self, callback_id: Uuid, tx: &Transaction) -> Result<(), NotifyError> {
        info!(
            callback_id = %callback_id,
            transaction_id = tx.id,
            "Email notification sent"
        );
        Ok(())
    }
}

/// SMS verification channel.
pub struct SmsNotifier;

#[async_trait]
impl Notifier for SmsNotifier {
    fn channel(&self) -> Channel {
        Channel::Sms
    }

    async fn notify(&self, callback_id: Uuid, tx: &Transaction) -> Result<(), NotifyError> {
        info!(
            callback_id = %callback_id,
            transaction_id = tx.id,
            "SMS notification sent"
        );
        Ok(())
    }
}

/// Deliver a notification, retrying transport errors with a short backoff.
pub async fn send_with_retry(
    notifier: &dyn Notifier,
    max_attempts: u32,
    callback_id: Uuid,
    tx: &Transaction,
) -> Result<(), NotifyError> {
    let attempts = max_attempts.max(1);
    let mut last_error = None;

    for attempt in 1..=attempts {
        match notifier.notify(callback_id, tx).await {
            Ok(()) => return Ok(()),
            Err(e) => {
                warn!(
                    attempt,
                    channel = ?notifier.channel(),
                    error = %e,
                    "Notification delivery failed"
                );
                last_error = Some(e);
                if attempt < attempts {
                    tokio::time::sleep(Duration::from_millis(100 * u64::from(attempt))).await;
                }
            }
        }
    }

    Err(last_error.unwrap_or_else(|| NotifyError("no delivery attempts made".to_string())))
}

/// A registered verification callback awaiting resolution.
#[derive(Debug, Clone)]
pub struct PendingCallback {
    pub callback_id: Uuid,
    pub transaction_id: i64,
    pub channel: Channel,
    pub expires_at: DateTime<Utc>,
}

struct TransactionRecord {
    transaction: Transaction,
    fraud_score: i32,
    state: TransactionState,
}

/// In-process store of pending verifications and transaction states.
#[derive(Default)]
pub struct VerificationRegistry {
    pending: RwLock<HashMap<Uuid, PendingCallback>>,
    transactions: RwLock<HashMap<i64, TransactionRecord>>,
}

impl VerificationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one callback per channel and mark the transaction pending.
    pub fn begin_verification(
        &self,
        tx: &Transaction,
        fraud_score: i32,
        channels: &[Channel],
        expires_at: DateTime<Utc>,
    ) -> Vec<PendingCallback> {
        let callbacks: Vec<PendingCallback> = channels
            .iter()
            .map(|&channel| PendingCallback {
                callback_id: Uuid::new_v4(),
                transaction_id: tx.id,
                channel,
                expires_at,
            })
            .collect();

        if let Ok(mut pending) = self.pending.write() {
            for cb in &callbacks {
                pending.insert(cb.callback_id, cb.clone());
            }
        }

        let state = TransactionState::PendingVerification {
            transaction_id: tx.id,
            fraud_score,
            callbacks: callbacks
                .iter()
                .map(|cb| CallbackHandle {
                    callback_id: cb.callback_id,
                    channel: cb.channel,
                })
                .collect(),
            expires_at,
        };

        if let Ok(mut transactions) = self.transactions.write() {
            transactions.insert(
                tx.id,
                TransactionRecord {
                    transaction: tx.clone(),
                    fraud_score,
                    state,
                },
            );
        }

        callbacks
    }

    /// Record a transaction that completed without verification.
    pub fn insert_completed(&self, tx: &Transaction, fraud_score: i32, outcome: TransactionOutcome) {
        if let Ok(mut transactions) = self.transactions.write() {
            transactions.insert(
                tx.id,
                TransactionRecord {
                    transaction: tx.clone(),
                    fraud_score,
                    state: TransactionState::Completed { outcome },
                },
            );
        }
    }

    /// Transition a known transaction to its final outcome.
    pub fn complete(&self, transaction_id: i64, outcome: TransactionOutcome) {
        if let Ok(mut transactions) = self.transactions.write() {
            if let Some(record) = transactions.get_mut(&transaction_id) {
                record.state = TransactionState::Completed { outcome };
            }
        }
    }

    /// Current state of a transaction.
    pub fn state_of(&self, transaction_id: i64) -> Option<TransactionState> {
        self.transactions
            .read()
            .ok()?
            .get(&transaction_id)
            .map(|record| record.state.clone())
    }

    /// The stored transaction and its score.
    pub fn transaction_of(&self, transaction_id: i64) -> Option<(Transaction, i32)> {
        self.transactions
            .read()
            .ok()?
            .get(&transaction_id)
            .map(|record| (record.transaction.clone(), record.fraud_score))
    }

    /// Remove and return a pending callback.
    pub fn take_callback(&self, callback_id: Uuid) -> Option<PendingCallback> {
        self.pending.write().ok()?.remove(&callback_id)
    }

    /// Drop all remaining callbacks for a transaction (sibling channels after
    /// one resolves).
    pub fn clear_pending_for(&self, transaction_id: i64) {
        if let Ok(mut pending) = self.pending.write() {
            pending.retain(|_, cb| cb.transaction_id != transaction_id);
        }
    }

    /// Remove every expired callback; returns ids of transactions left with no
    /// live callback and still awaiting verification.
    pub fn take_expired(&self, now: DateTime<Utc>) -> Vec<i64> {
        let mut affected = Vec::new();

        if let Ok(mut pending) = self.pending.write() {
            pending.retain(|_, cb| {
                if cb.expires_at <= now {
                    affected.push(cb.transaction_id);
                    false
                } else {
                    true
                }
            });

            affected.sort_unstable();
            affected.dedup();
            affected.retain(|tx_id| !pending.values().any(|cb| cb.transaction_id == *tx_id));
        }

        if let Ok(transactions) = self.transactions.read() {
            affected.retain(|tx_id| {
                matches!(
                    transactions.get(tx_id).map(|r| &r.state),
                    Some(TransactionState::PendingVerification { .. })
                )
            });
        }

        affected
    }
}

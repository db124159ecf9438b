//! Transaction data structures for fraud risk scoring

use serde::{Deserialize, Serialize};

/// A payment transaction submitted for a fraud decision.
///
/// `score` carries a pre-supplied risk score when the caller has already
/// assessed the transaction; zero means unscored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction identifier
    pub id: i64,

    /// Transaction amount in USD
    pub amount: f64,

    /// City or region where the transaction originated
    pub location: String,

    /// Merchant/vendor name
    pub vendor: String,

    /// Pre-supplied risk score (0 = not yet scored)
    #[serde(default)]
    pub score: i32,
}

impl Transaction {
    /// View of the fields the scoring agent needs.
    pub fn scoring_input(&self) -> ScoringInput {
        ScoringInput {
            id: Some(self.id),
            amount: Some(self.amount),
            location: Some(self.location.clone()),
            vendor: Some(self.vendor.clone()),
        }
    }
}

/// Raw input payload for the agent invocation endpoint.
///
/// Only `amount` is required; the handler rejects requests without it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoringInput {
    #[serde(default)]
    pub id: Option<i64>,

    #[serde(default)]
    pub amount: Option<f64>,

    #[serde(default)]
    pub location: Option<String>,

    #[serde(default)]
    pub vendor: Option<String>,
}

impl ScoringInput {
    /// Whether the payload carries a usable amount.
    pub fn has_amount(&self) -> bool {
        matches!(self.amount, Some(a) if a != 0.0)
    }
}

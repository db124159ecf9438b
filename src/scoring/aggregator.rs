//! Aggregation of rule-check contributions into a final verdict

use crate::types::assessment::Verdict;
use serde::Serialize;

/// Combines the three rule contributions into a capped total and verdict.
#[derive(Debug, Clone)]
pub struct ScoreAggregator {
    /// Upper bound on the total score
    cap: u32,
}

/// Per-check contributions to the total score.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreBreakdown {
    pub amount_contribution: u32,
    pub vendor_contribution: u32,
    pub location_contribution: u32,
}

/// Final aggregation result, relayed to the model as a tool result.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateResult {
    pub check: &'static str,
    pub total_score: u32,
    pub verdict: Verdict,
    pub is_fraud: bool,
    pub recommended_action: &'static str,
    pub breakdown: ScoreBreakdown,
}

impl ScoreAggregator {
    pub fn new() -> Self {
        Self { cap: 100 }
    }

    /// Sum the contributions, cap the total, and classify it.
    pub fn aggregate(
        &self,
        amount_contribution: u32,
        vendor_contribution: u32,
        location_contribution: u32,
    ) -> AggregateResult {
        let total_score =
            (amount_contribution + vendor_contribution + location_contribution).min(self.cap);
        let verdict = Verdict::from_total(total_score);

        AggregateResult {
            check: "fraud_score",
            total_score,
            verdict,
            is_fraud: verdict.is_fraud(),
            recommended_action: verdict.recommended_action(),
            breakdown: ScoreBreakdown {
                amount_contribution,
                vendor_contribution,
                location_contribution,
            },
        }
    }
}

impl Default for ScoreAggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_risk_aggregation() {
        let aggregator = ScoreAggregator::new();

        // Max contributions from every check: 50 + 30 + 20
        let result = aggregator.aggregate(50, 30, 20);

        assert_eq!(result.total_score, 100);
        assert_eq!(result.verdict, Verdict::Fraudulent);
        assert!(result.is_fraud);
    }

    #[test]
    fn test_low_risk_aggregation() {
        let aggregator = ScoreAggregator::new();

        // Small amount at a safe vendor in a safe city: 0 + 5 + 5
        let result = aggregator.aggregate(0, 5, 5);

        assert_eq!(result.total_score, 10);
        assert_eq!(result.verdict, Verdict::Legitimate);
        assert!(!result.is_fraud);
    }

    #[test]
    fn test_suspicious_band() {
        let aggregator = ScoreAggregator::new();

        let result = aggregator.aggregate(9, 15, 20);

        assert_eq!(result.total_score, 44);
        assert_eq!(result.verdict, Verdict::Suspicious);
        assert!(!result.is_fraud);
        assert!(result.recommended_action.contains("manual review"));
    }

    #[test]
    fn test_total_is_capped() {
        let aggregator = ScoreAggregator::new();
        let result = aggregator.aggregate(50, 30, 30);
        assert_eq!(result.total_score, 100);
    }

    #[test]
    fn test_breakdown_preserved() {
        let aggregator = ScoreAggregator::new();
        let result = aggregator.aggregate(50, 30, 20);

        assert_eq!(result.breakdown.amount_contribution, 50);
        assert_eq!(result.breakdown.vendor_contribution, 30);
        assert_eq!(result.breakdown.location_contribution, 20);
    }
}

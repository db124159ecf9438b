//! Risk assessment data structures

use serde::{Deserialize, Serialize};
use std::fmt;

/// Risk score summarizing fraud likelihood, 1 (safe) to 5 (fraudulent).
///
/// Derived from the 0-100 internal total produced by the rule checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RiskScore(pub i32);

impl RiskScore {
    /// Band a 0-100 total score into the 1-5 scale.
    pub fn from_total(total: u32) -> Self {
        match total {
            0..=19 => RiskScore(1),
            20..=39 => RiskScore(2),
            40..=54 => RiskScore(3),
            55..=69 => RiskScore(4),
            _ => RiskScore(5),
        }
    }

    /// Whether the score falls inside the documented 1-5 range.
    pub fn is_valid(self) -> bool {
        (1..=5).contains(&self.0)
    }

    pub fn value(self) -> i32 {
        self.0
    }
}

impl fmt::Display for RiskScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Three-way classification of the 0-100 total used by rule aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Legitimate,
    Suspicious,
    Fraudulent,
}

impl Verdict {
    /// Classify a capped 0-100 total score.
    pub fn from_total(total: u32) -> Self {
        if total >= 65 {
            Verdict::Fraudulent
        } else if total >= 40 {
            Verdict::Suspicious
        } else {
            Verdict::Legitimate
        }
    }

    /// Recommended handling for the verdict.
    pub fn recommended_action(self) -> &'static str {
        match self {
            Verdict::Fraudulent => "BLOCK transaction immediately and alert the cardholder",
            Verdict::Suspicious => "Flag for manual review - request additional verification",
            Verdict::Legitimate => "Approve transaction",
        }
    }

    pub fn is_fraud(self) -> bool {
        matches!(self, Verdict::Fraudulent)
    }
}

/// Assessment relayed by the scoring endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Risk score from 1 (safe) to 5 (fraudulent)
    pub risk_score: RiskScore,

    /// Explanation of why the transaction is or is not fraudulent
    pub risk_detail: String,

    /// Original transaction amount
    pub amount: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_score_bands() {
        assert_eq!(RiskScore::from_total(0), RiskScore(1));
        assert_eq!(RiskScore::from_total(19), RiskScore(1));
        assert_eq!(RiskScore::from_total(20), RiskScore(2));
        assert_eq!(RiskScore::from_total(39), RiskScore(2));
        assert_eq!(RiskScore::from_total(40), RiskScore(3));
        assert_eq!(RiskScore::from_total(54), RiskScore(3));
        assert_eq!(RiskScore::from_total(55), RiskScore(4));
        assert_eq!(RiskScore::from_total(69), RiskScore(4));
        assert_eq!(RiskScore::from_total(70), RiskScore(5));
        assert_eq!(RiskScore::from_total(100), RiskScore(5));
    }

    #[test]
    fn test_risk_score_validity() {
        assert!(RiskScore(1).is_valid());
        assert!(RiskScore(5).is_valid());
        assert!(!RiskScore(0).is_valid());
        assert!(!RiskScore(6).is_valid());
    }

    #[test]
    fn test_verdict_bands() {
        assert_eq!(Verdict::from_total(0), Verdict::Legitimate);
        assert_eq!(Verdict::from_total(39), Verdict::Legitimate);
        assert_eq!(Verdict::from_total(40), Verdict::Suspicious);
        assert_eq!(Verdict::from_total(64), Verdict::Suspicious);
        assert_eq!(Verdict::from_total(65), Verdict::Fraudulent);
        assert_eq!(Verdict::from_total(100), Verdict::Fraudulent);
    }

    #[test]
    fn test_assessment_serialization() {
        let assessment = RiskAssessment {
            risk_score: RiskScore(4),
            risk_detail: "High amount at a high-risk vendor".to_string(),
            amount: 6500.0,
        };

        let json = serde_json::to_value(&assessment).unwrap();
        assert_eq!(json["risk_score"], 4);

        let back: RiskAssessment = serde_json::from_value(json).unwrap();
        assert_eq!(back.risk_score, RiskScore(4));
        assert_eq!(back.amount, 6500.0);
    }
}

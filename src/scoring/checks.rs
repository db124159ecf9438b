//! Individual rule checks for transaction risk scoring.
//!
//! Each check mirrors one tool exposed to the hosted model: it takes a single
//! transaction field and produces a point contribution plus a model-facing
//! result record.

use crate::config::ScoringConfig;
use serde::Serialize;

/// Risk classification of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckRiskLevel {
    Low,
    Medium,
    High,
}

/// Checks whether a transaction amount exceeds the high-risk threshold.
///
/// Contributes up to 50 points: `min(floor(amount / threshold * 40), 50)`.
#[derive(Debug, Clone)]
pub struct AmountCheck {
    threshold: f64,
}

/// Result of the amount check, relayed to the model as a tool result.
#[derive(Debug, Clone, Serialize)]
pub struct AmountCheckResult {
    pub check: &'static str,
    pub amount: f64,
    pub threshold: f64,
    pub is_high_risk: bool,
    pub risk_score: u32,
    pub message: String,
}

impl AmountCheck {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn evaluate(&self, amount: f64) -> AmountCheckResult {
        let is_high_risk = amount > self.threshold;
        // Saturating cast: negative and NaN amounts contribute zero points.
        let risk_score = (((amount / self.threshold) * 40.0) as u32).min(50);

        let message = if is_high_risk {
            format!(
                "Amount ${:.2} EXCEEDS threshold of ${:.2} - HIGH RISK",
                amount, self.threshold
            )
        } else {
            format!("Amount ${:.2} is within normal range", amount)
        };

        AmountCheckResult {
            check: "amount_check",
            amount,
            threshold: self.threshold,
            is_high_risk,
            risk_score,
            message,
        }
    }
}

/// Result of a keyword-table check (vendor or location).
#[derive(Debug, Clone, Serialize)]
pub struct KeywordCheckResult {
    pub check: &'static str,
    pub subject: String,
    pub risk_level: CheckRiskLevel,
    pub risk_score: u32,
    pub message: String,
}

/// Classifies a vendor name against known fraud-pattern keywords.
#[derive(Debug, Clone)]
pub struct VendorRiskCheck {
    high: Vec<String>,
    medium: Vec<String>,
}

impl VendorRiskCheck {
    pub fn new(high: Vec<String>, medium: Vec<String>) -> Self {
        Self { high, medium }
    }

    pub fn evaluate(&self, vendor: &str) -> KeywordCheckResult {
        let (risk_level, risk_score) = classify(vendor, &self.high, &self.medium, 30, 15, 5);

        KeywordCheckResult {
            check: "vendor_check",
            subject: vendor.to_string(),
            risk_level,
            risk_score,
            message: format!("Vendor '{vendor}' classified as {risk_level:?} risk"),
        }
    }
}

/// Classifies a transaction location against city risk tables.
#[derive(Debug, Clone)]
pub struct LocationRiskCheck {
    high: Vec<String>,
    medium: Vec<String>,
}

impl LocationRiskCheck {
    pub fn new(high: Vec<String>, medium: Vec<String>) -> Self {
        Self { high, medium }
    }

    pub fn evaluate(&self, location: &str) -> KeywordCheckResult {
        let (risk_level, risk_score) = classify(location, &self.high, &self.medium, 20, 10, 5);

        KeywordCheckResult {
            check: "location_check",
            subject: location.to_string(),
            risk_level,
            risk_score,
            message: format!("Location '{location}' classified as {risk_level:?} risk"),
        }
    }
}

/// Case-insensitive substring match of `subject` against the two keyword
/// tables, high table first.
fn classify(
    subject: &str,
    high: &[String],
    medium: &[String],
    high_points: u32,
    medium_points: u32,
    low_points: u32,
) -> (CheckRiskLevel, u32) {
    let subject = subject.to_lowercase();

    if high.iter().any(|k| subject.contains(k.as_str())) {
        (CheckRiskLevel::High, high_points)
    } else if medium.iter().any(|k| subject.contains(k.as_str())) {
        (CheckRiskLevel::Medium, medium_points)
    } else {
        (CheckRiskLevel::Low, low_points)
    }
}

/// The full set of rule checks, built from configuration.
#[derive(Debug, Clone)]
pub struct RuleSet {
    pub amount: AmountCheck,
    pub vendor: VendorRiskCheck,
    pub location: LocationRiskCheck,
}

impl RuleSet {
    pub fn from_config(config: &ScoringConfig) -> Self {
        Self {
            amount: AmountCheck::new(config.amount_threshold),
            vendor: VendorRiskCheck::new(
                config.vendor_high_keywords.clone(),
                config.vendor_medium_keywords.clone(),
            ),
            location: LocationRiskCheck::new(
                config.location_high_cities.clone(),
                config.location_medium_cities.clone(),
            ),
        }
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::from_config(&ScoringConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_within_range() {
        let check = AmountCheck::new(5000.0);
        let result = check.evaluate(45.0);

        assert!(!result.is_high_risk);
        assert_eq!(result.risk_score, 0);
        assert!(result.message.contains("within normal range"));
    }

    #[test]
    fn test_amount_above_threshold_caps_at_50() {
        let check = AmountCheck::new(5000.0);
        let result = check.evaluate(6500.0);

        assert!(result.is_high_risk);
        assert_eq!(result.risk_score, 50);
        assert!(result.message.contains("EXCEEDS"));
    }

    #[test]
    fn test_amount_partial_contribution() {
        let check = AmountCheck::new(5000.0);
        // 1200 / 5000 * 40 = 9.6, truncated to 9
        assert_eq!(check.evaluate(1200.0).risk_score, 9);
    }

    #[test]
    fn test_negative_amount_contributes_nothing() {
        let check = AmountCheck::new(5000.0);
        assert_eq!(check.evaluate(-250.0).risk_score, 0);
    }

    #[test]
    fn test_vendor_tables() {
        let rules = RuleSet::default();

        let high = rules.vendor.evaluate("Electronics Store");
        assert_eq!(high.risk_level, CheckRiskLevel::High);
        assert_eq!(high.risk_score, 30);

        let medium = rules.vendor.evaluate("Online Gaming Store");
        assert_eq!(medium.risk_level, CheckRiskLevel::Medium);
        assert_eq!(medium.risk_score, 15);

        let low = rules.vendor.evaluate("Coffee Shop");
        assert_eq!(low.risk_level, CheckRiskLevel::Low);
        assert_eq!(low.risk_score, 5);
    }

    #[test]
    fn test_vendor_match_is_case_insensitive() {
        let rules = RuleSet::default();
        let result = rules.vendor.evaluate("BITCOIN EXCHANGE");
        assert_eq!(result.risk_level, CheckRiskLevel::High);
    }

    #[test]
    fn test_location_tables() {
        let rules = RuleSet::default();

        let high = rules.location.evaluate("Los Angeles");
        assert_eq!(high.risk_level, CheckRiskLevel::High);
        assert_eq!(high.risk_score, 20);

        let medium = rules.location.evaluate("Seattle");
        assert_eq!(medium.risk_level, CheckRiskLevel::Medium);
        assert_eq!(medium.risk_score, 10);

        let low = rules.location.evaluate("Portland");
        assert_eq!(low.risk_level, CheckRiskLevel::Low);
        assert_eq!(low.risk_score, 5);
    }
}

//! Prompt construction and final-reply parsing.

use crate::types::{RiskAssessment, ScoringInput};

/// System prompt defining the agent's contract with the hosted model.
pub const SYSTEM_PROMPT: &str = "\
You are FraudGuard, an expert AI fraud detection agent for a financial institution.

Your mission is to analyze incoming transactions and determine whether they are
fraudulent, suspicious, or legitimate.

For EVERY transaction you receive, you MUST:
1. Call `check_transaction_amount` with the transaction amount
2. Call `check_vendor_risk` with the vendor name
3. Call `check_location_risk` with the transaction location
4. Call `calculate_fraud_score` using the three risk scores obtained above
5. Return ONLY a valid raw JSON object - no markdown, no code blocks, no extra text.

The JSON response must follow this exact format:
{
    \"risk_score\": <integer from 1 to 5>,
    \"risk_detail\": \"<brief explanation of why the transaction is or isn't fraudulent>\",
    \"amount\": <original transaction amount as a number>
}

Risk score mapping based on the total fraud score (0-100):
- 1 -> Completely safe    (total score 0-19)
- 2 -> Low risk           (total score 20-39)
- 3 -> Suspicious         (total score 40-54)
- 4 -> High risk          (total score 55-69)
- 5 -> Fraudulent         (total score 70-100)

Be decisive, professional, and precise. Financial security depends on your accuracy.";

/// Build the user prompt for one transaction.
pub fn transaction_prompt(input: &ScoringInput) -> String {
    let id = input
        .id
        .map_or_else(|| "unknown".to_string(), |v| v.to_string());
    let amount = input
        .amount
        .map_or_else(|| "unknown".to_string(), |v| format!("${v:.2}"));
    let location = input.location.as_deref().unwrap_or("unknown");
    let vendor = input.vendor.as_deref().unwrap_or("unknown");

    format!(
        "Please analyze the following transaction for fraud:\n\
         \n\
         Transaction ID : {id}\n\
         Amount         : {amount}\n\
         Location       : {location}\n\
         Vendor         : {vendor}\n\
         \n\
         Use all available tools to perform a complete risk assessment and return\n\
         ONLY the JSON response as instructed."
    )
}

/// Parse the model's final text into an assessment.
///
/// Tries the whole reply first; if the model wrapped the JSON in prose, the
/// outermost brace-delimited block is extracted and parsed instead. Replies
/// whose risk score falls outside 1-5 are rejected.
pub fn parse_assessment(raw: &str) -> Option<RiskAssessment> {
    let candidate = raw.trim();

    let parsed: Option<RiskAssessment> = serde_json::from_str(candidate)
        .ok()
        .or_else(|| extract_json_block(candidate).and_then(|b| serde_json::from_str(b).ok()));

    parsed.filter(|assessment| assessment.risk_score.is_valid())
}

/// First `{` to last `}` of the reply, when both exist in order.
fn extract_json_block(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end > start {
        Some(&raw[start..=end])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RiskScore;

    #[test]
    fn test_prompt_includes_fields() {
        let input = ScoringInput {
            id: Some(3),
            amount: Some(6500.0),
            location: Some("Los Angeles".to_string()),
            vendor: Some("Electronics Store".to_string()),
        };

        let prompt = transaction_prompt(&input);
        assert!(prompt.contains("Transaction ID : 3"));
        assert!(prompt.contains("$6500.00"));
        assert!(prompt.contains("Los Angeles"));
        assert!(prompt.contains("Electronics Store"));
    }

    #[test]
    fn test_prompt_renders_missing_fields() {
        let input = ScoringInput {
            amount: Some(45.0),
            ..Default::default()
        };

        let prompt = transaction_prompt(&input);
        assert!(prompt.contains("Transaction ID : unknown"));
        assert!(prompt.contains("Vendor         : unknown"));
    }

    #[test]
    fn test_parse_clean_json() {
        let raw = r#"{"risk_score": 4, "risk_detail": "high risk vendor", "amount": 6500.0}"#;
        let assessment = parse_assessment(raw).unwrap();

        assert_eq!(assessment.risk_score, RiskScore(4));
        assert_eq!(assessment.amount, 6500.0);
    }

    #[test]
    fn test_parse_extracts_from_prose() {
        let raw = "Here is my assessment:\n\
                   {\"risk_score\": 1, \"risk_detail\": \"safe\", \"amount\": 45.0}\n\
                   Let me know if you need anything else.";
        let assessment = parse_assessment(raw).unwrap();

        assert_eq!(assessment.risk_score, RiskScore(1));
    }

    #[test]
    fn test_parse_rejects_out_of_range_score() {
        let raw = r#"{"risk_score": 9, "risk_detail": "??", "amount": 45.0}"#;
        assert!(parse_assessment(raw).is_none());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_assessment("I could not assess this transaction.").is_none());
        assert!(parse_assessment("").is_none());
    }
}

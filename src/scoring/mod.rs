//! Rule-based fraud scoring components
//!
//! These checks back the tools the hosted model calls during an assessment.

pub mod aggregator;
pub mod checks;

pub use aggregator::ScoreAggregator;
pub use checks::{AmountCheck, LocationRiskCheck, RuleSet, VendorRiskCheck};

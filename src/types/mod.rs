//! Type definitions for the fraud detection agent

pub mod assessment;
pub mod transaction;

pub use assessment::{RiskAssessment, RiskScore, Verdict};
pub use transaction::{ScoringInput, Transaction};

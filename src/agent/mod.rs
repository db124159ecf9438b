//! Hosted-model delegation for fraud assessment
//!
//! The service does not score transactions itself beyond the rule tables; the
//! verdict comes from a hosted model driving those rules as tools.

pub mod analyzer;
pub mod client;
pub mod prompt;

pub use analyzer::{AgentError, FraudAgent};
pub use client::{HttpModelClient, ModelClient, ModelClientError};

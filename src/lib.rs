//! Fraud Detection Agent Library
//!
//! HTTP service that scores payment transactions for fraud risk by delegating
//! the verdict to a hosted model armed with local rule-check tools, and routes
//! scored transactions through an authorization workflow.

pub mod agent;
pub mod config;
pub mod metrics;
pub mod scoring;
pub mod server;
pub mod types;
pub mod workflow;

#[cfg(test)]
pub mod test_support;

pub use agent::{FraudAgent, HttpModelClient};
pub use config::AppConfig;
pub use metrics::ServiceMetrics;
pub use types::{RiskAssessment, Transaction};
pub use workflow::WorkflowEngine;

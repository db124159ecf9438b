use crate::types::RiskAssessment;
use serde::Serialize;

/// Body of a successful agent invocation.
#[derive(Debug, Serialize)]
pub struct InvocationResponse {
    pub output: RiskAssessment,
}

/// Health probe body.
#[derive(Debug, Serialize)]
pub struct PingResponse {
    pub status: &'static str,
    pub usage: &'static str,
}

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use std::time::Instant;
use tracing::info;

use crate::server::error::ApiError;
use crate::server::requests::{CallbackDecision, CallbackRequest, InvocationRequest};
use crate::server::responses::{InvocationResponse, PingResponse};
use crate::server::AppState;
use crate::types::Transaction;
use crate::workflow::TransactionState;

/// Health check endpoint.
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse {
        status: "Fraud Detection Agent is running and healthy.",
        usage: "POST /invocations with body: {\"input\": {\"id\": 1, \"amount\": 6500, \
                \"location\": \"Los Angeles\", \"vendor\": \"Electronics Store\"}}",
    })
}

/// Receive a transaction payload and return a fraud risk assessment.
pub async fn invoke_agent(
    State(state): State<AppState>,
    Json(body): Json<InvocationRequest>,
) -> Result<Json<InvocationResponse>, ApiError> {
    if !body.input.has_amount() {
        return Err(ApiError::Validation(
            "Amount not provided. Please include 'amount' (in USD) in the request.".to_string(),
        ));
    }

    let start = Instant::now();

    match state.agent.assess(&body.input).await {
        Ok(output) => {
            state
                .metrics
                .record_assessment(start.elapsed(), output.risk_score.value());
            info!(
                risk_score = %output.risk_score,
                amount = output.amount,
                "Assessment complete"
            );
            Ok(Json(InvocationResponse { output }))
        }
        Err(e) => {
            state.metrics.record_assessment_failure();
            Err(ApiError::Agent(e))
        }
    }
}

/// Run the decision workflow for a transaction.
pub async fn submit_transaction(
    State(state): State<AppState>,
    Json(tx): Json<Transaction>,
) -> Result<Json<TransactionState>, ApiError> {
    let outcome = state.workflow.process(tx).await?;
    Ok(Json(outcome))
}

/// Current workflow state of a transaction.
pub async fn get_transaction(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<TransactionState>, ApiError> {
    state
        .workflow
        .state_of(id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("transaction {id} not found")))
}

/// Resolve a pending human verification.
pub async fn resolve_callback(
    State(state): State<AppState>,
    Json(body): Json<CallbackRequest>,
) -> Result<Json<TransactionState>, ApiError> {
    let approved = body.result == CallbackDecision::Approved;
    let resolved = state.workflow.resolve_callback(body.callback_id, approved)?;
    Ok(Json(resolved))
}

/// Prometheus text exposition of the service counters.
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(
            header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        state.metrics.render_prometheus(),
    )
}

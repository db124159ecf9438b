//! HTTP surface of the scoring service

pub mod error;
pub mod handlers;
pub mod requests;
pub mod responses;

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::agent::FraudAgent;
use crate::metrics::ServiceMetrics;
use crate::workflow::WorkflowEngine;

#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<FraudAgent>,
    pub workflow: Arc<WorkflowEngine>,
    pub metrics: Arc<ServiceMetrics>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/invocations", post(handlers::invoke_agent))
        .route("/transactions", post(handlers::submit_transaction))
        .route("/transactions/{id}", get(handlers::get_transaction))
        .route("/callbacks", post(handlers::resolve_callback))
        .route("/metrics", get(handlers::metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

//! Fraud Detection Agent - Main Entry Point
//!
//! Serves the agent invocation endpoint and the transaction decision workflow,
//! delegating fraud verdicts to a hosted model runtime.

use anyhow::{Context, Result};
use fraud_detection_agent::{
    agent::{FraudAgent, HttpModelClient},
    config::AppConfig,
    metrics::{MetricsReporter, ServiceMetrics},
    scoring::RuleSet,
    server::{build_router, AppState},
    workflow::{EmailNotifier, SmsNotifier, WorkflowEngine},
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fraud_detection_agent=info".parse()?),
        )
        .init();

    info!("Starting Fraud Detection Agent");

    // Load configuration
    let config = AppConfig::load()?;
    info!("Configuration loaded successfully");
    info!(
        endpoint = %config.agent.endpoint,
        model_id = %config.agent.model_id,
        "Hosted model runtime configured"
    );
    info!(
        amount_threshold = config.scoring.amount_threshold,
        authorize_below = config.routing.authorize_below,
        escalate_at = config.routing.escalate_at,
        "Scoring and routing configured"
    );

    // Initialize metrics
    let metrics = Arc::new(ServiceMetrics::new());

    // Initialize the agent against the hosted runtime
    let model = Arc::new(
        HttpModelClient::new(&config.agent).context("Failed to build model runtime client")?,
    );
    let rules = RuleSet::from_config(&config.scoring);
    let agent = Arc::new(FraudAgent::new(model, &config.agent, rules));
    info!("Fraud agent initialized");

    // Initialize the decision workflow with both verification channels
    let workflow = Arc::new(WorkflowEngine::new(
        agent.clone(),
        vec![Arc::new(EmailNotifier), Arc::new(SmsNotifier)],
        config.routing.clone(),
        config.verification.clone(),
        metrics.clone(),
    ));

    // Start metrics reporter (prints summary every 30 seconds)
    let metrics_clone = metrics.clone();
    tokio::spawn(async move {
        let reporter = MetricsReporter::new(metrics_clone, 30);
        reporter.start().await;
    });

    // Start the verification expiry sweeper
    tokio::spawn(workflow.clone().run_expiry_sweeper());

    let state = AppState {
        agent,
        workflow,
        metrics,
    };
    let app = build_router(state);

    let addr = config.server.bind_addr();
    info!(addr = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

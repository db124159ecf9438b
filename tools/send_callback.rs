//! Verification Callback Sender
//!
//! Resolves a pending human verification by posting a callback to the running
//! scoring service.

use anyhow::{bail, Context, Result};
use tracing::info;
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("send_callback=info".parse()?),
        )
        .init();

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let raw_id = args.get(1).map(|s| s.trim()).unwrap_or_default();
    let result = args.get(2).map(|s| s.as_str()).unwrap_or("approved");
    let service_url = args
        .get(3)
        .map(|s| s.as_str())
        .unwrap_or("http://localhost:8080");

    if raw_id.is_empty() {
        bail!("callbackId cannot be empty. Usage: send-callback <callback-id> [approved|declined] [service-url]");
    }

    let callback_id: Uuid = raw_id
        .parse()
        .with_context(|| format!("'{raw_id}' is not a valid callback id"))?;

    if result != "approved" && result != "declined" {
        bail!("result must be 'approved' or 'declined', got '{result}'");
    }

    info!(
        callback_id = %callback_id,
        result = %result,
        service_url = %service_url,
        "Sending verification callback"
    );

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{service_url}/callbacks"))
        .json(&serde_json::json!({
            "callbackId": callback_id,
            "result": result,
        }))
        .send()
        .await
        .context("Failed to reach the scoring service")?;

    let status = response.status();

    if status.is_success() {
        info!(status = %status, "Callback sent successfully");
        let body: serde_json::Value = response.json().await?;
        println!("{}", serde_json::to_string_pretty(&body)?);
        Ok(())
    } else {
        let body = response.text().await.unwrap_or_default();
        bail!("Unexpected response status {status}: {body}");
    }
}

//! Test Transaction Client
//!
//! Generates transactions and drives the scoring endpoint for smoke testing.

use rand::Rng;
use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};

/// Transaction payload matching the invocation endpoint's expected input
#[derive(Debug, Clone, Serialize)]
struct TestTransaction {
    id: i64,
    amount: f64,
    location: String,
    vendor: String,
}

/// Transaction generator for testing
struct TransactionGenerator {
    rng: rand::rngs::ThreadRng,
    transaction_counter: i64,
}

impl TransactionGenerator {
    fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
            transaction_counter: 100,
        }
    }

    /// Generate a random legitimate transaction
    fn generate_legitimate(&mut self) -> TestTransaction {
        self.transaction_counter += 1;

        TestTransaction {
            id: self.transaction_counter,
            amount: self.rng.gen_range(10.0..500.0),
            location: self
                .random_choice(&["Portland", "Boise", "Madison", "Omaha"])
                .to_string(),
            vendor: self
                .random_choice(&["Coffee Shop", "Grocery Store", "Book Store", "Pharmacy"])
                .to_string(),
        }
    }

    /// Generate a suspicious transaction
    fn generate_suspicious(&mut self) -> TestTransaction {
        self.transaction_counter += 1;

        TestTransaction {
            id: self.transaction_counter,
            amount: self.rng.gen_range(5500.0..12000.0), // Above threshold
            location: self
                .random_choice(&["Miami", "Los Angeles", "New York", "Las Vegas"])
                .to_string(),
            vendor: self
                .random_choice(&[
                    "Electronics Store",
                    "Gift Card Outlet",
                    "Crypto Exchange",
                    "Luxury Watches",
                ])
                .to_string(),
        }
    }

    fn random_choice<'a>(&mut self, choices: &[&'a str]) -> &'a str {
        choices[self.rng.gen_range(0..choices.len())]
    }
}

/// Fixed samples covering the three risk tiers
fn fixed_samples() -> Vec<TestTransaction> {
    vec![
        // High-risk: large amount + high-risk vendor + high-risk location
        TestTransaction {
            id: 3,
            amount: 6500.0,
            location: "Los Angeles".to_string(),
            vendor: "Electronics Store".to_string(),
        },
        // Low-risk: small amount + low-risk vendor + low-risk location
        TestTransaction {
            id: 7,
            amount: 45.0,
            location: "Portland".to_string(),
            vendor: "Coffee Shop".to_string(),
        },
        // Medium-risk: moderate amount + medium-risk vendor
        TestTransaction {
            id: 12,
            amount: 1200.0,
            location: "Seattle".to_string(),
            vendor: "Online Gaming Store".to_string(),
        },
    ]
}

async fn invoke(
    client: &reqwest::Client,
    base_url: &str,
    tx: &TestTransaction,
) -> anyhow::Result<serde_json::Value> {
    let response = client
        .post(format!("{base_url}/invocations"))
        .json(&serde_json::json!({ "input": tx }))
        .send()
        .await?
        .error_for_status()?;

    Ok(response.json().await?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("test_client=info".parse()?),
        )
        .init();

    info!("Starting Test Transaction Client");

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let base_url = args
        .get(1)
        .map(|s| s.as_str())
        .unwrap_or("http://localhost:8080");
    let count: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(10);
    let fraud_rate: f64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(0.3);
    let delay_ms: u64 = args.get(4).and_then(|s| s.parse().ok()).unwrap_or(250);

    info!(
        base_url = %base_url,
        count = count,
        fraud_rate = fraud_rate,
        delay_ms = delay_ms,
        "Configuration loaded"
    );

    let client = reqwest::Client::new();

    // Probe the service before sending traffic
    if let Err(e) = client.get(format!("{base_url}/ping")).send().await {
        warn!(error = %e, "Service unreachable. Running in dry-run mode.");
        return run_dry_mode(count, fraud_rate, delay_ms).await;
    }
    info!("Connected to scoring service");

    // Fixed tier samples first
    for tx in fixed_samples() {
        info!(transaction_id = tx.id, vendor = %tx.vendor, "Submitting sample transaction");
        match invoke(&client, base_url, &tx).await {
            Ok(result) => println!("{}", serde_json::to_string_pretty(&result)?),
            Err(e) => warn!(transaction_id = tx.id, error = %e, "Invocation failed"),
        }
    }

    // Random traffic
    let mut generator = TransactionGenerator::new();
    let mut rng = rand::thread_rng();

    info!("Submitting {} random transactions...", count);

    let mut legitimate_count = 0;
    let mut suspicious_count = 0;

    for i in 0..count {
        let tx = if rng.gen_bool(fraud_rate) {
            suspicious_count += 1;
            generator.generate_suspicious()
        } else {
            legitimate_count += 1;
            generator.generate_legitimate()
        };

        match invoke(&client, base_url, &tx).await {
            Ok(result) => {
                info!(
                    transaction_id = tx.id,
                    risk_score = result["output"]["risk_score"].as_i64().unwrap_or(-1),
                    "Assessment received"
                );
            }
            Err(e) => warn!(transaction_id = tx.id, error = %e, "Invocation failed"),
        }

        if (i + 1) % 10 == 0 {
            info!(
                "Submitted {}/{} transactions ({} legitimate, {} suspicious)",
                i + 1,
                count,
                legitimate_count,
                suspicious_count
            );
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    info!(
        "Completed! Submitted {} transactions ({} legitimate, {} suspicious)",
        count, legitimate_count, suspicious_count
    );

    Ok(())
}

async fn run_dry_mode(count: u64, fraud_rate: f64, delay_ms: u64) -> anyhow::Result<()> {
    info!("Running in dry-run mode (no service connection)");

    let mut generator = TransactionGenerator::new();
    let mut rng = rand::thread_rng();

    for i in 0..count {
        let tx = if rng.gen_bool(fraud_rate) {
            generator.generate_suspicious()
        } else {
            generator.generate_legitimate()
        };

        let json = serde_json::to_string_pretty(&serde_json::json!({ "input": tx }))?;

        if (i + 1) % 10 == 0 || i == 0 {
            info!("Sample payload {}:\n{}", i + 1, json);
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    Ok(())
}

//! Configuration management for the fraud detection agent

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub agent: AgentConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub routing: RoutingConfig,
    #[serde(default)]
    pub verification: VerificationConfig,
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Hosted model runtime configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    /// Base URL of the hosted model runtime
    pub endpoint: String,
    /// Model identifier sent with each converse request
    pub model_id: String,
    /// Request timeout in seconds
    #[serde(default = "default_agent_timeout_secs")]
    pub timeout_secs: u64,
    /// Retry attempts for transient runtime failures
    #[serde(default = "default_agent_max_retries")]
    pub max_retries: u32,
    /// Upper bound on tool-use turns per assessment
    #[serde(default = "default_agent_max_turns")]
    pub max_turns: usize,
}

fn default_agent_timeout_secs() -> u64 {
    30
}

fn default_agent_max_retries() -> u32 {
    3
}

fn default_agent_max_turns() -> usize {
    8
}

/// Rule-check tables for the scoring tools
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    /// Amount considered normal, in USD
    #[serde(default = "default_amount_threshold")]
    pub amount_threshold: f64,
    /// Vendor keywords commonly found in fraudulent transactions
    #[serde(default = "default_vendor_high_keywords")]
    pub vendor_high_keywords: Vec<String>,
    /// Vendor keywords warranting elevated scrutiny
    #[serde(default = "default_vendor_medium_keywords")]
    pub vendor_medium_keywords: Vec<String>,
    /// Cities with historically high card-fraud rates
    #[serde(default = "default_location_high_cities")]
    pub location_high_cities: Vec<String>,
    /// Cities flagged for manual review
    #[serde(default = "default_location_medium_cities")]
    pub location_medium_cities: Vec<String>,
}

fn default_amount_threshold() -> f64 {
    5000.0
}

fn default_vendor_high_keywords() -> Vec<String> {
    [
        "electronics",
        "gift card",
        "wire transfer",
        "crypto",
        "jewelry",
        "luxury",
        "gold",
        "forex",
        "bitcoin",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_vendor_medium_keywords() -> Vec<String> {
    [
        "online",
        "gaming",
        "casino",
        "travel",
        "hotel",
        "airline",
        "international",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_location_high_cities() -> Vec<String> {
    [
        "miami",
        "los angeles",
        "new york",
        "las vegas",
        "houston",
        "chicago",
        "atlanta",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_location_medium_cities() -> Vec<String> {
    ["dallas", "phoenix", "san francisco", "seattle"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            amount_threshold: default_amount_threshold(),
            vendor_high_keywords: default_vendor_high_keywords(),
            vendor_medium_keywords: default_vendor_medium_keywords(),
            location_high_cities: default_location_high_cities(),
            location_medium_cities: default_location_medium_cities(),
        }
    }
}

/// Score routing thresholds for the decision workflow
#[derive(Debug, Clone, Deserialize)]
pub struct RoutingConfig {
    /// Scores strictly below this authorize immediately
    #[serde(default = "default_authorize_below")]
    pub authorize_below: i32,
    /// Scores at or above this escalate to the fraud department
    #[serde(default = "default_escalate_at")]
    pub escalate_at: i32,
}

fn default_authorize_below() -> i32 {
    3
}

fn default_escalate_at() -> i32 {
    5
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            authorize_below: default_authorize_below(),
            escalate_at: default_escalate_at(),
        }
    }
}

/// Human verification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct VerificationConfig {
    /// Seconds before a pending verification expires
    #[serde(default = "default_verification_timeout_secs")]
    pub timeout_secs: u64,
    /// Delivery attempts per notification channel
    #[serde(default = "default_notify_max_attempts")]
    pub notify_max_attempts: u32,
    /// Interval of the expiry sweeper task
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

fn default_verification_timeout_secs() -> u64 {
    86_400
}

fn default_notify_max_attempts() -> u32 {
    3
}

fn default_sweep_interval_secs() -> u64 {
    60
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_verification_timeout_secs(),
            notify_max_attempts: default_notify_max_attempts(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            agent: AgentConfig {
                endpoint: "http://localhost:9400".to_string(),
                model_id: "fraud-guard-v1".to_string(),
                timeout_secs: default_agent_timeout_secs(),
                max_retries: default_agent_max_retries(),
                max_turns: default_agent_max_turns(),
            },
            scoring: ScoringConfig::default(),
            routing: RoutingConfig::default(),
            verification: VerificationConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "json".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.scoring.amount_threshold, 5000.0);
        assert_eq!(config.scoring.vendor_high_keywords.len(), 9);
        assert_eq!(config.routing.authorize_below, 3);
        assert_eq!(config.routing.escalate_at, 5);
        assert_eq!(config.verification.timeout_secs, 86_400);
    }

    #[test]
    fn test_bind_addr() {
        let config = AppConfig::default();
        assert_eq!(config.server.bind_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_scoring_tables() {
        let scoring = ScoringConfig::default();
        assert!(scoring
            .vendor_high_keywords
            .contains(&"gift card".to_string()));
        assert!(scoring
            .location_medium_cities
            .contains(&"seattle".to_string()));
    }
}

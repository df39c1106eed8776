//! Configuration management for vitascan
//!
//! Settings load from environment variables with sensible defaults. The only
//! required value for live analysis is the provider API key; everything else
//! (model, endpoint, timeout, confidence gate threshold, database path) has a
//! default matching the hosted OpenRouter setup.
//!
//! # Environment Variables
//!
//! - `OPENROUTER_API_KEY`: provider API key - **required** for live analysis
//! - `VITASCAN_MODEL`: model identifier - default: "openai/gpt-4-vision-preview"
//! - `VITASCAN_API_BASE`: API base URL - default: "https://openrouter.ai/api/v1"
//! - `VITASCAN_REQUEST_TIMEOUT`: per-request timeout in seconds - default: "60"
//! - `VITASCAN_CONFIDENCE_THRESHOLD`: classification gate threshold - default: "0.6"
//! - `VITASCAN_DB_PATH`: report database path - default: "./data/vitascan.db"
//! - `VITASCAN_LOG_LEVEL`: logging level - default: "info"

use crate::llm::OpenRouterClient;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Default values for configuration
const DEFAULT_MODEL: &str = "openai/gpt-4-vision-preview";
const DEFAULT_API_BASE: &str = "https://openrouter.ai/api/v1";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
const DEFAULT_DB_PATH: &str = "./data/vitascan.db";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Classification confidence gate: inclusive pass at this value and above
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.6;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// API key not available in the environment
    #[error("API key not configured. Set the OPENROUTER_API_KEY environment variable")]
    MissingApiKey,

    /// Configuration validation failed
    #[error("configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Main configuration structure for vitascan
#[derive(Debug, Clone)]
pub struct VitascanConfig {
    /// Provider API key; absent means live analysis cannot run
    pub api_key: Option<String>,

    /// API base URL for the chat-completions provider
    pub api_base: String,

    /// Model identifier sent with every request
    pub model: String,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Confidence gate threshold for the classification stage
    pub confidence_threshold: f32,

    /// SQLite database path for patients and reports
    pub db_path: PathBuf,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for VitascanConfig {
    /// Loads configuration from environment variables with defaults
    fn default() -> Self {
        let request_timeout_secs = env::var("VITASCAN_REQUEST_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        let confidence_threshold = env::var("VITASCAN_CONFIDENCE_THRESHOLD")
            .ok()
            .and_then(|v| v.parse::<f32>().ok())
            .unwrap_or(DEFAULT_CONFIDENCE_THRESHOLD);

        Self {
            api_key: env::var("OPENROUTER_API_KEY").ok(),
            api_base: env::var("VITASCAN_API_BASE")
                .unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            model: env::var("VITASCAN_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            request_timeout_secs,
            confidence_threshold,
            db_path: env::var("VITASCAN_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_DB_PATH)),
            log_level: env::var("VITASCAN_LOG_LEVEL")
                .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string()),
        }
    }
}

impl VitascanConfig {
    /// Validates the configuration for live analysis
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.as_deref().unwrap_or("").is_empty() {
            return Err(ConfigError::MissingApiKey);
        }

        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(ConfigError::ValidationFailed(format!(
                "confidence threshold {} must be between 0.0 and 1.0",
                self.confidence_threshold
            )));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "request timeout must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Builds the process-wide remote client from this configuration
    pub fn create_client(&self) -> Result<OpenRouterClient, ConfigError> {
        self.validate()?;

        let api_key = self.api_key.clone().ok_or(ConfigError::MissingApiKey)?;
        Ok(OpenRouterClient::with_timeout(
            self.api_base.clone(),
            api_key,
            self.model.clone(),
            Duration::from_secs(self.request_timeout_secs),
        ))
    }
}

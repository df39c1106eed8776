//! Strict decoding of raw model text into typed stage results
//!
//! Model output is expected to be a bare JSON object. Decoding is strict by
//! design: no markdown-fence stripping, no substring scanning, no defaulted
//! fields for gate-relevant values. Downstream decisions hinge on the parsed
//! disease name and confidence, so garbage input is a hard error that carries
//! the raw text for diagnostics.

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

/// How much raw text an error retains for diagnostics
const RAW_EXCERPT_CHARS: usize = 200;

#[derive(Debug, Clone, Error)]
pub enum ParseError {
    #[error("invalid JSON: {message}")]
    InvalidJson { message: String, raw: String },
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("invalid confidence value: {0} (must be between 0.0 and 1.0)")]
    InvalidConfidence(f32),
    #[error("detected disease {0:?} is not in the supported vocabulary")]
    UnknownDisease(String),
}

/// Decodes raw model text into `T`, trimming surrounding whitespace only.
pub fn decode<T: DeserializeOwned>(raw: &str) -> Result<T, ParseError> {
    serde_json::from_str(raw.trim()).map_err(|e| {
        warn!("JSON decode error: {}", e);
        ParseError::InvalidJson {
            message: e.to_string(),
            raw: raw.chars().take(RAW_EXCERPT_CHARS).collect(),
        }
    })
}

//! Errors surfaced by remote inference clients

use thiserror::Error;

/// Errors that can occur while talking to a remote inference endpoint.
///
/// These are fatal for the current request: no client performs retries, and the
/// pipeline orchestrator propagates them as a terminal failure.
#[derive(Debug, Clone, Error)]
pub enum RemoteServiceError {
    /// The provider returned a non-success status
    #[error("API error ({status_code}): {message}")]
    Api { message: String, status_code: u16 },

    /// The request did not complete within the configured timeout
    #[error("request timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    /// Connection-level failure before a response was received
    #[error("network error: {0}")]
    Network(String),

    /// Missing API key or otherwise unusable client configuration
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The provider answered 2xx but the body was not a usable completion
    #[error("invalid response from provider: {0}")]
    InvalidResponse(String),
}

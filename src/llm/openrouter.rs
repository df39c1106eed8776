//! OpenRouter HTTP client for remote multimodal inference
//!
//! This module provides an HTTP client for OpenAI-compatible chat-completions
//! endpoints, used against OpenRouter by default. It supports mixed text and
//! image content so the same client serves both image-bearing and text-only
//! pipeline stages.
//!
//! # Example
//!
//! ```no_run
//! use vitascan::llm::{InferenceClient, InferenceRequest, OpenRouterClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OpenRouterClient::new(
//!     "https://openrouter.ai/api/v1".to_string(),
//!     "sk-or-...".to_string(),
//!     "openai/gpt-4-vision-preview".to_string(),
//! );
//!
//! if client.health_check().await? {
//!     let raw = client
//!         .invoke(InferenceRequest::text("Respond strictly in JSON: {}", 100))
//!         .await?;
//!     println!("{raw}");
//! }
//! # Ok(())
//! # }
//! ```

use super::client::InferenceClient;
use super::error::RemoteServiceError;
use super::types::{ContentPart, InferenceRequest};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Default request timeout for completion calls
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Client for an OpenAI-compatible chat-completions endpoint
///
/// One instance is created at startup and shared by handle across the process
/// (`Arc<dyn InferenceClient>`); it holds a pooled `reqwest::Client` and is safe
/// to use from concurrent requests.
pub struct OpenRouterClient {
    /// API base URL, e.g. "https://openrouter.ai/api/v1"
    endpoint: String,

    /// Bearer token for the provider
    api_key: String,

    /// Model identifier, e.g. "openai/gpt-4-vision-preview"
    model: String,

    /// Shared HTTP client with connection pooling
    http_client: Client,

    /// Per-request timeout; every outbound call is bounded by this
    timeout: Duration,
}

impl OpenRouterClient {
    /// Creates a client with the default timeout
    pub fn new(endpoint: String, api_key: String, model: String) -> Self {
        Self::with_timeout(
            endpoint,
            api_key,
            model,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Creates a client with a custom request timeout
    pub fn with_timeout(
        endpoint: String,
        api_key: String,
        model: String,
        timeout: Duration,
    ) -> Self {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            endpoint,
            api_key,
            model,
            http_client,
            timeout,
        }
    }

    /// Checks whether the provider is reachable
    ///
    /// Makes a lightweight request to the `/models` endpoint. Returns
    /// `Ok(false)` for unreachable-but-expected conditions (timeout, refused
    /// connection) and `Err` for other transport failures.
    pub async fn health_check(&self) -> Result<bool, RemoteServiceError> {
        let url = format!("{}/models", self.endpoint);

        debug!("Checking provider health at {}", url);

        match self
            .http_client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
        {
            Ok(response) => {
                let is_healthy = response.status().is_success();
                if is_healthy {
                    info!("Provider health check successful");
                } else {
                    warn!(
                        "Provider health check failed with status: {}",
                        response.status()
                    );
                }
                Ok(is_healthy)
            }
            Err(e) => {
                if e.is_timeout() || e.is_connect() {
                    warn!("Provider unreachable at {}", self.endpoint);
                    Ok(false)
                } else {
                    error!("Provider health check error: {}", e);
                    Err(RemoteServiceError::Network(format!(
                        "health check failed: {e}"
                    )))
                }
            }
        }
    }

    fn build_messages(&self, request: &InferenceRequest) -> Vec<Message> {
        let content = if request.has_image() {
            let parts = request
                .parts
                .iter()
                .map(|part| match part {
                    ContentPart::Text(text) => RequestPart::Text { text: text.clone() },
                    ContentPart::Image { media_type, data } => RequestPart::ImageUrl {
                        image_url: ImageUrl {
                            url: format!("data:{media_type};base64,{data}"),
                        },
                    },
                })
                .collect();
            MessageContent::Parts(parts)
        } else {
            let text = request
                .parts
                .iter()
                .filter_map(|part| match part {
                    ContentPart::Text(text) => Some(text.as_str()),
                    ContentPart::Image { .. } => None,
                })
                .collect::<Vec<_>>()
                .join("\n");
            MessageContent::Text(text)
        };

        vec![Message {
            role: "user".to_string(),
            content,
        }]
    }
}

#[async_trait]
impl InferenceClient for OpenRouterClient {
    async fn invoke(&self, request: InferenceRequest) -> Result<String, RemoteServiceError> {
        let url = format!("{}/chat/completions", self.endpoint);

        let api_request = CompletionRequest {
            model: self.model.clone(),
            messages: self.build_messages(&request),
            max_tokens: Some(request.max_tokens),
        };

        debug!(
            "Sending completion request: model={}, prompt_chars={}, image={}",
            self.model,
            request.text_len(),
            request.has_image(),
        );

        let start = Instant::now();

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&api_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    error!("Completion request timed out after {:?}", self.timeout);
                    RemoteServiceError::Timeout {
                        seconds: self.timeout.as_secs(),
                    }
                } else if e.is_connect() {
                    error!("Cannot connect to provider at {}", self.endpoint);
                    RemoteServiceError::Network(format!("connection failed: {e}"))
                } else {
                    error!("Completion request error: {}", e);
                    RemoteServiceError::Network(format!("request failed: {e}"))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            error!("Provider returned error status {}: {}", status, body);

            return Err(RemoteServiceError::Api {
                message: body.chars().take(200).collect(),
                status_code: status.as_u16(),
            });
        }

        let api_response: CompletionResponse = response.json().await.map_err(|e| {
            error!("Failed to decode provider response: {}", e);
            RemoteServiceError::InvalidResponse(format!("JSON decode error: {e}"))
        })?;

        let content = api_response
            .choices
            .first()
            .and_then(|choice| choice.message.as_ref())
            .map(|message| message.content.as_text())
            .ok_or_else(|| {
                RemoteServiceError::InvalidResponse("no content in completion".to_string())
            })?;

        info!(
            "Completion finished in {:.2}s ({} chars)",
            start.elapsed().as_secs_f64(),
            content.len()
        );

        Ok(content)
    }

    fn name(&self) -> &str {
        "openrouter"
    }

    fn model_info(&self) -> Option<String> {
        Some(format!("{} @ {}", self.model, self.endpoint))
    }
}

impl fmt::Debug for OpenRouterClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenRouterClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Message in the chat-completions wire format
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Message {
    role: String,
    content: MessageContent,
}

/// Content is either a plain string or an array of typed parts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<RequestPart>),
}

impl MessageContent {
    fn as_text(&self) -> String {
        match self {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter_map(|part| match part {
                    RequestPart::Text { text } => Some(text.as_str()),
                    RequestPart::ImageUrl { .. } => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// One typed content part in the multimodal message format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RequestPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ImageUrl {
    url: String,
}

/// Request body for the chat-completions endpoint
#[derive(Debug, Clone, Serialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

/// Response body from the chat-completions endpoint
#[derive(Debug, Clone, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
struct Choice {
    message: Option<Message>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> OpenRouterClient {
        OpenRouterClient::new(
            "https://openrouter.ai/api/v1".to_string(),
            "test-key".to_string(),
            "openai/gpt-4-vision-preview".to_string(),
        )
    }

    #[test]
    fn test_client_creation() {
        let client = test_client();
        assert_eq!(client.name(), "openrouter");
        let model_info = client.model_info().unwrap();
        assert!(model_info.contains("gpt-4-vision-preview"));
        assert!(model_info.contains("openrouter.ai"));
    }

    #[test]
    fn test_custom_timeout() {
        let client = OpenRouterClient::with_timeout(
            "https://openrouter.ai/api/v1".to_string(),
            "test-key".to_string(),
            "openai/gpt-4-vision-preview".to_string(),
            Duration::from_secs(120),
        );
        assert_eq!(client.timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_image_request_serialization() {
        let client = test_client();
        let request = InferenceRequest::text("Classify this image", 300)
            .with_image("image/jpeg", "Zm9v");

        let messages = client.build_messages(&request);
        let json = serde_json::to_string(&messages).unwrap();
        assert!(json.contains("\"type\":\"text\""));
        assert!(json.contains("\"type\":\"image_url\""));
        assert!(json.contains("data:image/jpeg;base64,Zm9v"));
    }

    #[test]
    fn test_text_request_serialization() {
        let client = test_client();
        let request = InferenceRequest::text("Text-only prompt", 800);

        let messages = client.build_messages(&request);
        let json = serde_json::to_string(&messages).unwrap();
        // Text-only stages use the plain-string content form
        assert!(json.contains("\"content\":\"Text-only prompt\""));
    }

    #[test]
    fn test_response_parsing() {
        let response_json = r#"{
            "id": "gen-123",
            "choices": [{
                "index": 0,
                "finish_reason": "stop",
                "message": {
                    "role": "assistant",
                    "content": "{\"is_medical_image\": true, \"reason\": \"visible rash\"}"
                }
            }]
        }"#;

        let response: CompletionResponse = serde_json::from_str(response_json).unwrap();
        let content = response.choices[0].message.as_ref().unwrap().content.as_text();
        assert!(content.contains("is_medical_image"));
    }

    #[test]
    fn test_response_with_part_content() {
        let content = MessageContent::Parts(vec![
            RequestPart::Text {
                text: "first".to_string(),
            },
            RequestPart::Text {
                text: "second".to_string(),
            },
        ]);
        assert_eq!(content.as_text(), "first\nsecond");
    }

    #[test]
    fn test_debug_does_not_leak_api_key() {
        let client = test_client();
        let debug_str = format!("{:?}", client);
        assert!(debug_str.contains("OpenRouterClient"));
        assert!(!debug_str.contains("test-key"));
    }
}

//! Inference request types
//!
//! This module defines the request shape sent to a remote inference endpoint,
//! independent of any specific provider implementation. A request is a list of
//! content parts (text and/or base64-encoded images) plus an output token budget.

use serde::{Deserialize, Serialize};

/// One piece of multimodal prompt content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ContentPart {
    /// Plain instruction text
    Text(String),
    /// Base64-encoded image with its declared media type (e.g. "image/jpeg")
    Image { media_type: String, data: String },
}

/// Request to send to the inference endpoint
#[derive(Debug, Clone)]
pub struct InferenceRequest {
    /// Ordered content parts forming the prompt
    pub parts: Vec<ContentPart>,
    /// Maximum tokens the model may generate
    pub max_tokens: u32,
}

impl InferenceRequest {
    /// Creates a text-only request
    pub fn text(prompt: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            parts: vec![ContentPart::Text(prompt.into())],
            max_tokens,
        }
    }

    /// Appends a base64-encoded image to the request
    pub fn with_image(mut self, media_type: impl Into<String>, data: impl Into<String>) -> Self {
        self.parts.push(ContentPart::Image {
            media_type: media_type.into(),
            data: data.into(),
        });
        self
    }

    /// Returns true if any part is an image
    pub fn has_image(&self) -> bool {
        self.parts
            .iter()
            .any(|p| matches!(p, ContentPart::Image { .. }))
    }

    /// Concatenated length of all text parts, used for request logging
    pub fn text_len(&self) -> usize {
        self.parts
            .iter()
            .map(|p| match p {
                ContentPart::Text(t) => t.len(),
                ContentPart::Image { .. } => 0,
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_request() {
        let request = InferenceRequest::text("Describe the image", 300);
        assert_eq!(request.parts.len(), 1);
        assert_eq!(request.max_tokens, 300);
        assert!(!request.has_image());
        assert_eq!(request.text_len(), "Describe the image".len());
    }

    #[test]
    fn test_request_with_image() {
        let request =
            InferenceRequest::text("Classify this", 300).with_image("image/png", "aGVsbG8=");
        assert_eq!(request.parts.len(), 2);
        assert!(request.has_image());
    }
}

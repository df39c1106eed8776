//! Stage 1 - medical relevance check
//!
//! Asks the model whether the uploaded photo shows a visible human medical
//! condition at all. The orchestrator treats a negative (or absent) flag as a
//! hard gate: classification never runs on a non-medical image.

use crate::llm::{InferenceClient, InferenceRequest};
use crate::pipeline::error::PipelineError;
use crate::pipeline::image::ImageAsset;
use crate::pipeline::parse::{self, ParseError};
use serde::Deserialize;
use tracing::debug;

const MAX_TOKENS: u32 = 300;

const PROMPT: &str = r#"You are a medical image validator.

Determine whether this image shows a visible human medical condition
related to skin, eyes, or oral regions.

Respond strictly in JSON:

{
  "is_medical_image": true or false,
  "reason": "short explanation"
}"#;

/// Stage 1 output, consumed only by the orchestrator's validity gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub is_medical_image: bool,
    pub reason: String,
}

// An absent flag reads as false: the gate rejects rather than guessing.
#[derive(Debug, Deserialize)]
struct RawValidation {
    #[serde(default)]
    is_medical_image: bool,
    #[serde(default)]
    reason: String,
}

pub fn parse(raw: &str) -> Result<ValidationResult, ParseError> {
    let raw_validation: RawValidation = parse::decode(raw)?;
    Ok(ValidationResult {
        is_medical_image: raw_validation.is_medical_image,
        reason: raw_validation.reason,
    })
}

pub async fn run(
    client: &dyn InferenceClient,
    image: &ImageAsset,
) -> Result<ValidationResult, PipelineError> {
    let request = InferenceRequest::text(PROMPT, MAX_TOKENS)
        .with_image(image.media_type(), image.to_base64());

    let raw = client.invoke(request).await?;
    debug!("Validation stage returned {} chars", raw.len());

    Ok(parse(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepting() {
        let result =
            parse(r#"{"is_medical_image": true, "reason": "visible skin lesion"}"#).unwrap();
        assert!(result.is_medical_image);
        assert_eq!(result.reason, "visible skin lesion");
    }

    #[test]
    fn test_parse_rejecting() {
        let result = parse(r#"{"is_medical_image": false, "reason": "a landscape"}"#).unwrap();
        assert!(!result.is_medical_image);
    }

    #[test]
    fn test_parse_missing_flag_defaults_to_rejection() {
        let result = parse(r#"{"reason": "unclear"}"#).unwrap();
        assert!(!result.is_medical_image);
        assert_eq!(result.reason, "unclear");
    }

    #[test]
    fn test_parse_garbage_is_error() {
        assert!(parse("I think this is a skin photo").is_err());
    }

    #[tokio::test]
    async fn test_run_sends_image() {
        use crate::llm::{MockInferenceClient, MockResponse};

        let client = MockInferenceClient::new();
        client.add_response(MockResponse::text(
            r#"{"is_medical_image": true, "reason": "rash"}"#,
        ));

        let image = ImageAsset::from_bytes("up/a.jpg", "image/jpeg", b"img".to_vec());
        let result = run(&client, &image).await.unwrap();

        assert!(result.is_medical_image);
        let request = client.request_at(0).unwrap();
        assert!(request.has_image());
        assert_eq!(request.max_tokens, MAX_TOKENS);
    }
}

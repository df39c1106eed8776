//! Stage 2 - disease classification
//!
//! Asks the model to pick exactly one condition from the closed vocabulary and
//! report a confidence in [0,1]. Parsing is deliberately strict: a missing
//! confidence is a parse error rather than the lenient treat-as-zero the gate
//! would otherwise turn into a misleading "low confidence" answer, and a
//! disease name outside the vocabulary is never accepted as free text.

use crate::llm::{InferenceClient, InferenceRequest};
use crate::pipeline::disease::Disease;
use crate::pipeline::error::PipelineError;
use crate::pipeline::image::ImageAsset;
use crate::pipeline::parse::{self, ParseError};
use serde::Deserialize;
use tracing::debug;

const MAX_TOKENS: u32 = 300;

fn prompt() -> String {
    format!(
        r#"You are a dermatology analysis assistant.

From the provided image, select the most likely visible condition
from the following list:

{}

Respond strictly in JSON:

{{
  "detected_disease": "Disease Name",
  "confidence_score": number between 0 and 1
}}"#,
        Disease::prompt_vocabulary()
    )
}

/// Stage 2 output; the orchestrator gates on `confidence_score`
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosisResult {
    pub detected_disease: Disease,
    pub confidence_score: f32,
}

#[derive(Debug, Deserialize)]
struct RawDiagnosis {
    detected_disease: Option<String>,
    confidence_score: Option<f32>,
}

pub fn parse(raw: &str) -> Result<DiagnosisResult, ParseError> {
    let raw_diagnosis: RawDiagnosis = parse::decode(raw)?;

    let name = raw_diagnosis
        .detected_disease
        .ok_or(ParseError::MissingField("detected_disease"))?;
    let detected_disease = name
        .parse::<Disease>()
        .map_err(|e| ParseError::UnknownDisease(e.0))?;

    let confidence_score = raw_diagnosis
        .confidence_score
        .ok_or(ParseError::MissingField("confidence_score"))?;
    if !(0.0..=1.0).contains(&confidence_score) {
        return Err(ParseError::InvalidConfidence(confidence_score));
    }

    Ok(DiagnosisResult {
        detected_disease,
        confidence_score,
    })
}

pub async fn run(
    client: &dyn InferenceClient,
    image: &ImageAsset,
) -> Result<DiagnosisResult, PipelineError> {
    let request = InferenceRequest::text(prompt(), MAX_TOKENS)
        .with_image(image.media_type(), image.to_base64());

    let raw = client.invoke(request).await?;
    debug!("Classification stage returned {} chars", raw.len());

    Ok(parse(&raw)?)
}

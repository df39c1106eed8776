//! Stage 3 - vitamin deficiency inference
//!
//! Text-only stage: takes the detected disease name (no image re-sent) and
//! asks for plausible vitamin deficiencies with reasoning and food sources.
//! There is no gate after this stage; its output is included verbatim.

use crate::llm::{InferenceClient, InferenceRequest};
use crate::pipeline::disease::Disease;
use crate::pipeline::error::PipelineError;
use crate::pipeline::parse::{self, ParseError};
use serde::{Deserialize, Serialize};
use tracing::debug;

const MAX_TOKENS: u32 = 800;

fn prompt(disease: Disease) -> String {
    format!(
        r#"You are a nutrition and medical reasoning assistant.

Based on the detected disease: {disease}

Provide:

1. Possible associated vitamin deficiencies
2. Brief reasoning
3. Recommended food sources for each vitamin

Respond strictly in JSON format:

{{
  "vitamin_deficiencies": [
    {{
      "vitamin": "Vitamin Name",
      "reason": "short explanation",
      "recommended_foods": ["Food 1", "Food 2", "Food 3"]
    }}
  ]
}}"#
    )
}

/// One inferred deficiency with its justification and food sources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VitaminDeficiency {
    pub vitamin: String,
    pub reason: String,
    pub recommended_foods: Vec<String>,
}

/// Stage 3 output, keyed logically by the disease name it was asked about
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeficiencyInference {
    pub vitamin_deficiencies: Vec<VitaminDeficiency>,
}

#[derive(Debug, Deserialize)]
struct RawDeficiency {
    vitamin_deficiencies: Option<Vec<VitaminDeficiency>>,
}

pub fn parse(raw: &str) -> Result<DeficiencyInference, ParseError> {
    let raw_deficiency: RawDeficiency = parse::decode(raw)?;
    let vitamin_deficiencies = raw_deficiency
        .vitamin_deficiencies
        .ok_or(ParseError::MissingField("vitamin_deficiencies"))?;

    Ok(DeficiencyInference {
        vitamin_deficiencies,
    })
}

pub async fn run(
    client: &dyn InferenceClient,
    disease: Disease,
) -> Result<DeficiencyInference, PipelineError> {
    let raw = client
        .invoke(InferenceRequest::text(prompt(disease), MAX_TOKENS))
        .await?;
    debug!(
        "Deficiency stage for {} returned {} chars",
        disease,
        raw.len()
    );

    Ok(parse(&raw)?)
}

//! Pipeline orchestration
//!
//! Sequences the three stages, applies the gates between them, and aggregates
//! the final analysis. One run is a strictly sequential chain of remote calls:
//! classification depends on the validity gate and deficiency inference depends
//! on the classification output, so there is nothing to parallelize. The
//! orchestrator holds no per-run mutable state, so concurrent requests can
//! share one pipeline behind an `Arc`.

use super::disease::Disease;
use super::error::PipelineError;
use super::image::ImageAsset;
use super::stages::{classify, deficiency, validate};
use super::stages::{DeficiencyInference, DiagnosisResult, ValidationResult, VitaminDeficiency};
use crate::llm::InferenceClient;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// States a pipeline run moves through.
///
/// `Rejected`, `LowConfidence`, and `Failed` are terminal error states;
/// `Completed` is the terminal success state. Errors report the terminal state
/// they ended in via [`PipelineError::terminal_state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Start,
    Validating,
    Rejected,
    Classifying,
    LowConfidence,
    InferringDeficiency,
    Completed,
    Failed,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Start => "Start",
            PipelineState::Validating => "Validating",
            PipelineState::Rejected => "Rejected",
            PipelineState::Classifying => "Classifying",
            PipelineState::LowConfidence => "LowConfidence",
            PipelineState::InferringDeficiency => "InferringDeficiency",
            PipelineState::Completed => "Completed",
            PipelineState::Failed => "Failed",
        };
        f.write_str(name)
    }
}

/// Validity gate after Stage 1: a negative or absent flag halts the run.
pub fn validity_gate(validation: &ValidationResult) -> PipelineState {
    if validation.is_medical_image {
        PipelineState::Classifying
    } else {
        PipelineState::Rejected
    }
}

/// Confidence gate after Stage 2: inclusive pass at `confidence >= threshold`.
pub fn confidence_gate(diagnosis: &DiagnosisResult, threshold: f32) -> PipelineState {
    if diagnosis.confidence_score >= threshold {
        PipelineState::InferringDeficiency
    } else {
        PipelineState::LowConfidence
    }
}

/// Aggregate result of a completed, gate-passing run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub detected_disease: Disease,
    pub confidence_score: f32,
    pub vitamin_deficiencies: Vec<VitaminDeficiency>,
}

impl Analysis {
    /// Pure aggregation: identical stage outputs always produce an identical
    /// analysis.
    pub fn aggregate(diagnosis: DiagnosisResult, inference: DeficiencyInference) -> Self {
        Self {
            detected_disease: diagnosis.detected_disease,
            confidence_score: diagnosis.confidence_score,
            vitamin_deficiencies: inference.vitamin_deficiencies,
        }
    }
}

/// External outcome shape: either the aggregate analysis or an error
/// descriptor with an optional model-stated reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PipelineOutcome {
    Completed(Analysis),
    Halted {
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
}

impl From<Result<Analysis, PipelineError>> for PipelineOutcome {
    fn from(result: Result<Analysis, PipelineError>) -> Self {
        match result {
            Ok(analysis) => PipelineOutcome::Completed(analysis),
            Err(PipelineError::ValidationRejected { reason }) => PipelineOutcome::Halted {
                error: super::error::REJECTED_MESSAGE.to_string(),
                reason: Some(reason),
            },
            Err(PipelineError::LowConfidence { .. }) => PipelineOutcome::Halted {
                error: super::error::LOW_CONFIDENCE_MESSAGE.to_string(),
                reason: None,
            },
            Err(PipelineError::Remote(_)) | Err(PipelineError::Parse(_)) => {
                PipelineOutcome::Halted {
                    error: "Image analysis failed due to an internal error.".to_string(),
                    reason: None,
                }
            }
        }
    }
}

/// Sequences Validate → Classify → Infer-Deficiency over an injected client.
///
/// Constructed once at startup with a process-wide client handle; the
/// confidence threshold comes from configuration rather than being fixed at
/// the gate.
pub struct AnalysisPipeline {
    client: Arc<dyn InferenceClient>,
    confidence_threshold: f32,
}

impl AnalysisPipeline {
    pub fn new(client: Arc<dyn InferenceClient>, confidence_threshold: f32) -> Self {
        Self {
            client,
            confidence_threshold,
        }
    }

    pub fn confidence_threshold(&self) -> f32 {
        self.confidence_threshold
    }

    /// Runs the full pipeline for one image.
    ///
    /// Halts at the first gate refusal or stage error; never produces partial
    /// results. Stage errors (`RemoteServiceError`, `ParseError`) leave the
    /// run in the `Failed` terminal state.
    pub async fn process(&self, image: &ImageAsset) -> Result<Analysis, PipelineError> {
        let start = Instant::now();
        let mut state = PipelineState::Start;
        info!("Pipeline started for {}", image.path().display());
        debug!(%state, "run created");

        state = PipelineState::Validating;
        debug!(%state, "stage 1: validity check");
        let validation = validate::run(self.client.as_ref(), image).await?;

        state = validity_gate(&validation);
        debug!(%state, "validity gate decided");
        if state == PipelineState::Rejected {
            warn!("Image rejected as not medically relevant: {}", validation.reason);
            return Err(PipelineError::ValidationRejected {
                reason: validation.reason,
            });
        }

        debug!(%state, "stage 2: classification");
        let diagnosis = classify::run(self.client.as_ref(), image).await?;

        state = confidence_gate(&diagnosis, self.confidence_threshold);
        debug!(
            %state,
            confidence = diagnosis.confidence_score,
            threshold = self.confidence_threshold,
            "confidence gate decided"
        );
        if state == PipelineState::LowConfidence {
            warn!(
                "Diagnosis {} below confidence threshold ({:.2} < {:.2})",
                diagnosis.detected_disease, diagnosis.confidence_score, self.confidence_threshold
            );
            return Err(PipelineError::LowConfidence {
                disease: diagnosis.detected_disease,
                confidence: diagnosis.confidence_score,
            });
        }

        debug!(%state, "stage 3: deficiency inference");
        let inference = deficiency::run(self.client.as_ref(), diagnosis.detected_disease).await?;

        state = PipelineState::Completed;
        info!(
            %state,
            disease = %diagnosis.detected_disease,
            confidence = diagnosis.confidence_score,
            "pipeline complete in {:.2}s",
            start.elapsed().as_secs_f64()
        );

        Ok(Analysis::aggregate(diagnosis, inference))
    }

    /// Convenience wrapper returning the external outcome shape
    pub async fn run(&self, image: &ImageAsset) -> PipelineOutcome {
        self.process(image).await.into()
    }
}

impl fmt::Debug for AnalysisPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisPipeline")
            .field("client", &self.client.name())
            .field("confidence_threshold", &self.confidence_threshold)
            .finish()
    }
}

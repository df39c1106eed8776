//! Pipeline error taxonomy

use super::disease::Disease;
use super::orchestrator::PipelineState;
use super::parse::ParseError;
use crate::llm::RemoteServiceError;
use thiserror::Error;

/// User-visible message when the validity gate rejects an upload
pub const REJECTED_MESSAGE: &str = "Uploaded image is not medically relevant.";

/// User-visible message when the confidence gate halts the pipeline
pub const LOW_CONFIDENCE_MESSAGE: &str =
    "Unable to determine condition with sufficient confidence.";

/// Ways a pipeline run can halt before completion.
///
/// The orchestrator recovers from none of these: each one ends the run and is
/// returned typed to the caller. The first two are user-correctable (re-upload
/// a better image); the last two indicate provider or transport trouble and map
/// to a server-side failure.
#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    /// Stage 1 judged the image not medically relevant
    #[error("Uploaded image is not medically relevant.")]
    ValidationRejected { reason: String },

    /// Stage 2 confidence fell below the gate threshold
    #[error("Unable to determine condition with sufficient confidence.")]
    LowConfidence { disease: Disease, confidence: f32 },

    /// A remote call failed, timed out, or returned a non-success status
    #[error(transparent)]
    Remote(#[from] RemoteServiceError),

    /// A stage returned output that could not be decoded or validated
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl PipelineError {
    /// True for failures the end user can correct by re-uploading;
    /// false for failures that should surface as a server-side error.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PipelineError::ValidationRejected { .. } | PipelineError::LowConfidence { .. }
        )
    }

    /// The terminal state this error leaves the pipeline in
    pub fn terminal_state(&self) -> PipelineState {
        match self {
            PipelineError::ValidationRejected { .. } => PipelineState::Rejected,
            PipelineError::LowConfidence { .. } => PipelineState::LowConfidence,
            PipelineError::Remote(_) | PipelineError::Parse(_) => PipelineState::Failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_classification() {
        let rejected = PipelineError::ValidationRejected {
            reason: "a houseplant".to_string(),
        };
        assert!(rejected.is_client_error());
        assert_eq!(rejected.terminal_state(), PipelineState::Rejected);

        let low = PipelineError::LowConfidence {
            disease: Disease::Rash,
            confidence: 0.4,
        };
        assert!(low.is_client_error());
        assert_eq!(low.terminal_state(), PipelineState::LowConfidence);

        let remote = PipelineError::Remote(RemoteServiceError::Timeout { seconds: 60 });
        assert!(!remote.is_client_error());
        assert_eq!(remote.terminal_state(), PipelineState::Failed);

        let parse = PipelineError::Parse(ParseError::MissingField("confidence_score"));
        assert!(!parse.is_client_error());
        assert_eq!(parse.terminal_state(), PipelineState::Failed);
    }

    #[test]
    fn test_user_messages() {
        let rejected = PipelineError::ValidationRejected {
            reason: "not skin".to_string(),
        };
        assert_eq!(rejected.to_string(), REJECTED_MESSAGE);

        let low = PipelineError::LowConfidence {
            disease: Disease::Acne,
            confidence: 0.2,
        };
        assert_eq!(low.to_string(), LOW_CONFIDENCE_MESSAGE);
    }
}

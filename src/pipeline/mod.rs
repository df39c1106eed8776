//! Three-stage inference pipeline with confidence gating
//!
//! Data flow: image → validate → (gate) → classify → (gate) → infer
//! deficiencies → aggregate. Gates halt the run; stage errors short-circuit it.

pub mod disease;
pub mod error;
pub mod image;
pub mod orchestrator;
pub mod parse;
pub mod stages;

pub use disease::Disease;
pub use error::PipelineError;
pub use image::ImageAsset;
pub use orchestrator::{Analysis, AnalysisPipeline, PipelineOutcome, PipelineState};
pub use parse::ParseError;
pub use stages::{DeficiencyInference, DiagnosisResult, ValidationResult, VitaminDeficiency};

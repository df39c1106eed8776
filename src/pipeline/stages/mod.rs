//! The three remote-inference stages, in pipeline order

pub mod classify;
pub mod deficiency;
pub mod validate;

pub use classify::DiagnosisResult;
pub use deficiency::{DeficiencyInference, VitaminDeficiency};
pub use validate::ValidationResult;

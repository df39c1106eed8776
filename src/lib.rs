//! vitascan - AI-assisted vitamin deficiency screening from medical photos
//!
//! This library runs an uploaded photo of a visible skin, eye, or oral
//! condition through a three-stage remote inference pipeline and persists the
//! outcome against a patient record.
//!
//! # Core Concepts
//!
//! - **Stages**: three sequential remote-inference steps - validity check,
//!   disease classification, and vitamin-deficiency inference - each producing
//!   a structured, typed result
//! - **Gates**: checkpoints between stages; a non-medical image or an
//!   under-confident diagnosis halts the run before the next stage spends a
//!   remote call
//! - **Reports**: the persisted outcome of a completed, gate-passing run,
//!   stored against a patient with last-write-wins contact details
//!
//! # Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use vitascan::config::VitascanConfig;
//! use vitascan::pipeline::{AnalysisPipeline, ImageAsset};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = VitascanConfig::default();
//! let client = config.create_client()?;
//! let pipeline = AnalysisPipeline::new(Arc::new(client), config.confidence_threshold);
//!
//! let image = ImageAsset::load("uploads/lesion.jpg")?;
//! let analysis = pipeline.process(&image).await?;
//!
//! println!("{} ({:.0}%)", analysis.detected_disease, analysis.confidence_score * 100.0);
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`llm`]: remote inference clients and request types
//! - [`pipeline`]: the three stages, gates, and orchestration
//! - [`store`]: SQLite persistence for patients and reports
//! - [`service`]: inbound request handling tying pipeline and store together

pub mod cli;
pub mod config;
pub mod llm;
pub mod pipeline;
pub mod service;
pub mod store;
pub mod util;

// Re-export key types for convenient access
pub use config::{ConfigError, VitascanConfig, DEFAULT_CONFIDENCE_THRESHOLD};
pub use llm::{InferenceClient, InferenceRequest, OpenRouterClient, RemoteServiceError};
pub use pipeline::{
    Analysis, AnalysisPipeline, Disease, ImageAsset, ParseError, PipelineError, PipelineOutcome,
    PipelineState,
};
pub use service::{AnalysisReceipt, AnalysisService, AnalyzeRequest, ServiceError};
pub use store::{Patient, Report, ReportStore, StoreError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

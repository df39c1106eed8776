//! High-level analysis service
//!
//! Thin orchestration over the pipeline and the report store: upsert the
//! patient, load the image, run the pipeline, and persist a report only when
//! the run completes. Every failure path leaves the reports table untouched,
//! so a stored report always corresponds to a gate-passing run.

use crate::pipeline::{Analysis, AnalysisPipeline, ImageAsset, PipelineError};
use crate::store::{Patient, Report, ReportStore, StoreError};
use chrono::Utc;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

/// Errors that can occur while handling an analysis request
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Image path does not exist or could not be read
    #[error("failed to read image {}: {source}", .path.display())]
    ImageRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The pipeline halted or failed
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// Persistence failed
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl ServiceError {
    /// True for failures the caller should present as user-correctable
    pub fn is_client_error(&self) -> bool {
        match self {
            ServiceError::ImageRead { .. } => true,
            ServiceError::Pipeline(e) => e.is_client_error(),
            ServiceError::Store(_) => false,
        }
    }
}

/// One inbound analysis request
#[derive(Debug, Clone)]
pub struct AnalyzeRequest {
    pub patient_id: String,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub image_path: PathBuf,
}

/// Returned for a completed, persisted analysis
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReceipt {
    pub report_id: Uuid,
    pub result: Analysis,
}

/// Ties the pipeline to the report store
pub struct AnalysisService {
    pipeline: AnalysisPipeline,
    store: ReportStore,
}

impl AnalysisService {
    pub fn new(pipeline: AnalysisPipeline, store: ReportStore) -> Self {
        Self { pipeline, store }
    }

    /// Handles one analysis request end to end.
    ///
    /// The patient upsert happens before the pipeline runs (contact details
    /// are worth keeping even when the image is rejected); the report insert
    /// happens only on pipeline success.
    pub async fn analyze(&self, request: AnalyzeRequest) -> Result<AnalysisReceipt, ServiceError> {
        self.store.upsert_patient(&Patient {
            id: request.patient_id.clone(),
            name: request.name.clone(),
            address: request.address.clone(),
            phone: request.phone.clone(),
        })?;

        let image = ImageAsset::load(&request.image_path).map_err(|source| {
            ServiceError::ImageRead {
                path: request.image_path.clone(),
                source,
            }
        })?;

        let analysis = self.pipeline.process(&image).await?;

        let report = Report {
            report_id: Uuid::new_v4(),
            patient_id: request.patient_id.clone(),
            image_path: request.image_path.display().to_string(),
            detected_disease: analysis.detected_disease,
            confidence_score: analysis.confidence_score,
            vitamin_deficiencies: analysis.vitamin_deficiencies.clone(),
            created_at: Utc::now(),
        };
        self.store.insert_report(&report)?;

        info!(
            "Analysis complete for patient {}: {} ({:.0}% confidence), report {}",
            request.patient_id,
            analysis.detected_disease,
            analysis.confidence_score * 100.0,
            report.report_id
        );

        Ok(AnalysisReceipt {
            report_id: report.report_id,
            result: analysis,
        })
    }

    pub fn patient(&self, patient_id: &str) -> Result<Option<Patient>, ServiceError> {
        Ok(self.store.get_patient(patient_id)?)
    }

    /// Report history for a patient, most recent first
    pub fn reports(&self, patient_id: &str) -> Result<Vec<Report>, ServiceError> {
        Ok(self.store.patient_reports(patient_id)?)
    }
}

impl std::fmt::Debug for AnalysisService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisService")
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}

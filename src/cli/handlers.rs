//! Command handlers
//!
//! Each handler maps its result to an exit code: 0 for success, 1 for
//! user-correctable failures (bad image, rejected upload, uncertain
//! diagnosis), 2 for configuration, provider, or storage trouble. Pipeline
//! halts print the outcome JSON to stdout so callers can read the error
//! descriptor the same way they read a successful result.

use super::commands::{AnalyzeArgs, PatientRefArgs};
use crate::config::VitascanConfig;
use crate::pipeline::{AnalysisPipeline, PipelineOutcome};
use crate::service::{AnalysisService, AnalyzeRequest, ServiceError};
use crate::store::ReportStore;
use serde_json::json;
use std::sync::Arc;
use tracing::error;

fn open_service(config: &VitascanConfig) -> Result<AnalysisService, i32> {
    let client = match config.create_client() {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: {e}");
            return Err(2);
        }
    };

    let store = match ReportStore::open(&config.db_path) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: {e}");
            return Err(2);
        }
    };

    Ok(AnalysisService::new(
        AnalysisPipeline::new(Arc::new(client), config.confidence_threshold),
        store,
    ))
}

fn open_store(config: &VitascanConfig) -> Result<ReportStore, i32> {
    ReportStore::open(&config.db_path).map_err(|e| {
        eprintln!("Error: {e}");
        2
    })
}

pub async fn handle_analyze(args: &AnalyzeArgs) -> i32 {
    let config = VitascanConfig::default();
    let service = match open_service(&config) {
        Ok(service) => service,
        Err(code) => return code,
    };

    let request = AnalyzeRequest {
        patient_id: args.patient_id.clone(),
        name: args.name.clone(),
        address: args.address.clone(),
        phone: args.phone.clone(),
        image_path: args.image.clone(),
    };

    match service.analyze(request).await {
        Ok(receipt) => {
            let payload = json!({
                "success": true,
                "report_id": receipt.report_id,
                "result": receipt.result,
            });
            println!("{}", serde_json::to_string_pretty(&payload).unwrap());
            0
        }
        Err(ServiceError::Pipeline(e)) => {
            let is_client_error = e.is_client_error();
            let outcome = PipelineOutcome::from(Err(e));
            println!("{}", serde_json::to_string_pretty(&outcome).unwrap());
            if is_client_error {
                1
            } else {
                2
            }
        }
        Err(e) => {
            error!("Analysis request failed: {e}");
            eprintln!("Error: {e}");
            if e.is_client_error() {
                1
            } else {
                2
            }
        }
    }
}

pub fn handle_reports(args: &PatientRefArgs) -> i32 {
    let config = VitascanConfig::default();
    let store = match open_store(&config) {
        Ok(store) => store,
        Err(code) => return code,
    };

    match store.patient_reports(&args.patient_id) {
        Ok(reports) => {
            println!("{}", serde_json::to_string_pretty(&reports).unwrap());
            0
        }
        Err(e) => {
            eprintln!("Error: {e}");
            2
        }
    }
}

pub fn handle_patient(args: &PatientRefArgs) -> i32 {
    let config = VitascanConfig::default();
    let store = match open_store(&config) {
        Ok(store) => store,
        Err(code) => return code,
    };

    match store.get_patient(&args.patient_id) {
        Ok(Some(patient)) => {
            println!("{}", serde_json::to_string_pretty(&patient).unwrap());
            0
        }
        Ok(None) => {
            eprintln!("Error: patient not found: {}", args.patient_id);
            1
        }
        Err(e) => {
            eprintln!("Error: {e}");
            2
        }
    }
}

pub async fn handle_health() -> i32 {
    let config = VitascanConfig::default();
    let client = match config.create_client() {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: {e}");
            return 2;
        }
    };

    match client.health_check().await {
        Ok(true) => {
            println!("Provider reachable ({})", config.api_base);
            0
        }
        Ok(false) => {
            eprintln!("Provider unreachable ({})", config.api_base);
            2
        }
        Err(e) => {
            eprintln!("Error: {e}");
            2
        }
    }
}

//! SQLite-backed persistence for patients and analysis reports
//!
//! Patients are upserted on every analysis request (last-write-wins on contact
//! fields); reports are written exactly once per completed, gate-passing
//! pipeline run and never updated. Each write touches a single row, so the
//! store needs per-row atomicity only; the connection sits behind a mutex and
//! requests take no cross-request locks.

use crate::pipeline::{Disease, VitaminDeficiency};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::Serialize;
use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("failed to encode vitamin data: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid stored value for {field}: {value}")]
    InvalidRow { field: &'static str, value: String },

    #[error("failed to prepare database path: {0}")]
    Io(#[from] std::io::Error),
}

/// A patient record; `id` is an externally supplied natural key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Patient {
    pub id: String,
    pub name: String,
    pub address: String,
    pub phone: String,
}

/// One persisted analysis outcome; immutable after insertion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub report_id: Uuid,
    pub patient_id: String,
    pub image_path: String,
    pub detected_disease: Disease,
    pub confidence_score: f32,
    pub vitamin_deficiencies: Vec<VitaminDeficiency>,
    pub created_at: DateTime<Utc>,
}

/// Handle to the patients/reports database
pub struct ReportStore {
    conn: Mutex<Connection>,
}

impl ReportStore {
    /// Opens (creating if needed) the database at `path` and applies the schema
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;

        info!("Report store ready at {}", path.display());
        Ok(store)
    }

    /// In-memory database for tests
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();

        conn.execute_batch(
            "PRAGMA foreign_keys = ON;

             CREATE TABLE IF NOT EXISTS patients (
                 id      TEXT PRIMARY KEY,
                 name    TEXT NOT NULL,
                 address TEXT NOT NULL DEFAULT '',
                 phone   TEXT NOT NULL DEFAULT ''
             );

             CREATE TABLE IF NOT EXISTS reports (
                 report_id        TEXT PRIMARY KEY,
                 patient_id       TEXT NOT NULL REFERENCES patients(id),
                 image_path       TEXT NOT NULL,
                 detected_disease TEXT NOT NULL,
                 confidence_score REAL NOT NULL,
                 vitamin_data     TEXT NOT NULL,
                 created_at       TEXT NOT NULL
             );

             CREATE INDEX IF NOT EXISTS idx_reports_patient_id ON reports(patient_id);",
        )?;

        debug!("Schema applied");
        Ok(())
    }

    /// Inserts or replaces a patient row; contact fields are last-write-wins
    pub fn upsert_patient(&self, patient: &Patient) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO patients (id, name, address, phone) VALUES (?1, ?2, ?3, ?4)",
            params![patient.id, patient.name, patient.address, patient.phone],
        )?;
        Ok(())
    }

    /// Inserts one report row; the report id must be fresh
    pub fn insert_report(&self, report: &Report) -> Result<(), StoreError> {
        let vitamin_data = serde_json::to_string(&report.vitamin_deficiencies)?;

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO reports (report_id, patient_id, image_path, detected_disease,
             confidence_score, vitamin_data, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                report.report_id.to_string(),
                report.patient_id,
                report.image_path,
                report.detected_disease.as_str(),
                report.confidence_score as f64,
                vitamin_data,
                report.created_at.to_rfc3339(),
            ],
        )?;

        debug!("Stored report {} for patient {}", report.report_id, report.patient_id);
        Ok(())
    }

    pub fn get_patient(&self, patient_id: &str) -> Result<Option<Patient>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT id, name, address, phone FROM patients WHERE id = ?1")?;

        let result = stmt.query_row(params![patient_id], |row| {
            Ok(Patient {
                id: row.get(0)?,
                name: row.get(1)?,
                address: row.get(2)?,
                phone: row.get(3)?,
            })
        });

        match result {
            Ok(patient) => Ok(Some(patient)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All reports for a patient, most recent first
    pub fn patient_reports(&self, patient_id: &str) -> Result<Vec<Report>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT report_id, patient_id, image_path, detected_disease,
             confidence_score, vitamin_data, created_at
             FROM reports WHERE patient_id = ?1 ORDER BY created_at DESC",
        )?;

        let rows = stmt.query_map(params![patient_id], |row| {
            Ok(ReportRow {
                report_id: row.get(0)?,
                patient_id: row.get(1)?,
                image_path: row.get(2)?,
                detected_disease: row.get(3)?,
                confidence_score: row.get(4)?,
                vitamin_data: row.get(5)?,
                created_at: row.get(6)?,
            })
        })?;

        let mut reports = Vec::new();
        for row in rows {
            reports.push(report_from_row(row?)?);
        }
        Ok(reports)
    }
}

impl std::fmt::Debug for ReportStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportStore").finish_non_exhaustive()
    }
}

// Internal row type for Report mapping
struct ReportRow {
    report_id: String,
    patient_id: String,
    image_path: String,
    detected_disease: String,
    confidence_score: f64,
    vitamin_data: String,
    created_at: String,
}

fn report_from_row(row: ReportRow) -> Result<Report, StoreError> {
    let report_id = Uuid::parse_str(&row.report_id).map_err(|_| StoreError::InvalidRow {
        field: "report_id",
        value: row.report_id.clone(),
    })?;

    let detected_disease =
        Disease::from_str(&row.detected_disease).map_err(|e| StoreError::InvalidRow {
            field: "detected_disease",
            value: e.0,
        })?;

    let created_at = DateTime::parse_from_rfc3339(&row.created_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| StoreError::InvalidRow {
            field: "created_at",
            value: row.created_at.clone(),
        })?;

    let vitamin_deficiencies: Vec<VitaminDeficiency> = serde_json::from_str(&row.vitamin_data)?;

    Ok(Report {
        report_id,
        patient_id: row.patient_id,
        image_path: row.image_path,
        detected_disease,
        confidence_score: row.confidence_score as f32,
        vitamin_deficiencies,
        created_at,
    })
}

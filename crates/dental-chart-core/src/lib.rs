//! Dental Chart Core Library
//!
//! Tooth chart for the clinic front end: a 32-tooth status collection for the
//! patient on screen, FDI diagram labels, and a staged edit/commit/cancel flow
//! against the clinic REST API.
//!
//! # Architecture
//!
//! ```text
//!  select patient ──▶ initialize (32 × Healthy) ──▶ GET /Teeth/patient/{id}
//!                                                        │
//!                                                  merge by number
//!                                                        │
//!                        diagram (FDI labels) ◀──────────┘
//!                               │
//!                         click FDI tooth ──▶ canonical number ──▶ EditSession
//!                                                                     │
//!                                                   cancel ◀──────────┤
//!                                                                     ▼
//!                                       PUT /Teeth/patient/{id}/number/{n}
//!                                                                     │
//!                                                         ok: update + reload
//! ```
//!
//! # Modules
//!
//! - [`models`]: Tooth entries, wire records, status conversion
//! - [`chart`]: The chart state machine and FDI notation
//! - [`backend`]: Backend contract, REST client, in-memory backend
//! - [`db`]: Local SQLite tooth store
//! - [`export`]: Chart report export
//! - [`config`]: Runtime configuration

pub mod backend;
pub mod chart;
pub mod config;
pub mod db;
pub mod export;
pub mod models;

// Re-export commonly used types
pub use backend::{BackendError, HttpBackend, InMemoryBackend, TeethBackend};
pub use chart::{
    ChartError, ChartState, CommitOutcome, DiscardedEdit, EditSession, LoadOutcome, LoadTicket,
    ToothChart,
};
pub use config::{ChartConfig, ReselectPolicy};
pub use db::Database;
pub use export::ChartReport;
pub use models::{RawStatus, TeethRecord, ToothEntry, ToothStatus, UpdateToothStatus};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum ChartFfiError {
    #[error("Load error: {0}")]
    LoadError(String),

    #[error("Save error: {0}")]
    SaveError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Tooth {tooth_number} is still being edited")]
    EditInProgress { tooth_number: u8 },

    #[error("Backend error: {0}")]
    BackendError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<ChartError> for ChartFfiError {
    fn from(e: ChartError) -> Self {
        match e {
            ChartError::Fetch { ref source, .. } => {
                ChartFfiError::LoadError(format!("{}: {}", e, source))
            }
            ChartError::Commit { ref source, .. } => {
                ChartFfiError::SaveError(format!("{}: {}", e, source))
            }
            ChartError::Validation(msg) => ChartFfiError::InvalidInput(msg),
            ChartError::EditInProgress { tooth_number } => {
                ChartFfiError::EditInProgress { tooth_number }
            }
        }
    }
}

impl From<BackendError> for ChartFfiError {
    fn from(e: BackendError) -> Self {
        ChartFfiError::BackendError(e.to_string())
    }
}

impl From<db::DbError> for ChartFfiError {
    fn from(e: db::DbError) -> Self {
        ChartFfiError::DatabaseError(e.to_string())
    }
}

impl From<serde_json::Error> for ChartFfiError {
    fn from(e: serde_json::Error) -> Self {
        ChartFfiError::SerializationError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for ChartFfiError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        ChartFfiError::BackendError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open a chart against the clinic REST API.
///
/// Settings come from the environment; `base_url` overrides the API address.
#[uniffi::export]
pub fn open_http_chart(base_url: Option<String>) -> Result<Arc<DentalChartCore>, ChartFfiError> {
    let mut config = ChartConfig::from_env();
    if let Some(url) = base_url {
        config.api_base_url = url;
    }
    let backend = HttpBackend::from_config(&config)?;
    tracing::info!(base_url = %backend.base_url(), "Opening tooth chart over HTTP");
    Ok(Arc::new(DentalChartCore::new(
        ToothChart::from_config(&config),
        Arc::new(backend),
    )))
}

/// Open a chart backed by a local SQLite file, creating it if needed.
#[uniffi::export]
pub fn open_local_chart(path: String) -> Result<Arc<DentalChartCore>, ChartFfiError> {
    let db = Database::open(&path)?;
    let config = ChartConfig::from_env();
    Ok(Arc::new(DentalChartCore::new(
        ToothChart::from_config(&config),
        Arc::new(Mutex::new(db)),
    )))
}

/// Open a chart with an empty in-memory backend (for testing).
#[uniffi::export]
pub fn open_in_memory_chart() -> Arc<DentalChartCore> {
    Arc::new(DentalChartCore::new(
        ToothChart::new(),
        Arc::new(InMemoryBackend::new()),
    ))
}

/// Canonical tooth number to FDI code.
#[uniffi::export]
pub fn to_fdi(tooth_number: u8) -> u8 {
    chart::to_fdi(tooth_number)
}

/// FDI code to canonical tooth number.
#[uniffi::export]
pub fn from_fdi(fdi: u8) -> u8 {
    chart::from_fdi(fdi)
}

/// Upper jaw tooth numbers in the order the diagram draws them.
#[uniffi::export]
pub fn upper_jaw() -> Vec<u8> {
    chart::UPPER_JAW.to_vec()
}

/// Lower jaw tooth numbers in the order the diagram draws them.
#[uniffi::export]
pub fn lower_jaw() -> Vec<u8> {
    chart::LOWER_JAW.to_vec()
}

/// Convert a status as received from the API (name or numeric code).
#[uniffi::export]
pub fn convert_status(raw: String) -> FfiToothStatus {
    ToothStatus::from_raw(&RawStatus::Text(raw)).into()
}

/// Diagram color for a status.
#[uniffi::export]
pub fn status_color(status: FfiToothStatus) -> String {
    ToothStatus::from(status).color().to_string()
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe chart wrapper for FFI.
///
/// The chart lock is never held across a backend request: loads and commits
/// take it to start, release it for the request, and take it again to apply
/// the answer. Readers and `clear_patient` stay responsive meanwhile.
#[derive(uniffi::Object)]
pub struct DentalChartCore {
    chart: Mutex<ToothChart>,
    backend: Arc<dyn TeethBackend + Send + Sync>,
}

impl DentalChartCore {
    /// Wrap a chart and the backend it talks to.
    pub fn new(chart: ToothChart, backend: Arc<dyn TeethBackend + Send + Sync>) -> Self {
        Self {
            chart: Mutex::new(chart),
            backend,
        }
    }

    fn fetch(&self, ticket: LoadTicket) -> Result<LoadOutcome, ChartFfiError> {
        let result = self.backend.teeth_by_patient(ticket.patient_id());
        Ok(self.chart.lock()?.finish_load(ticket, result)?)
    }
}

#[uniffi::export]
impl DentalChartCore {
    // =========================================================================
    // Patient
    // =========================================================================

    /// Show a patient's chart. On a load error the chart still holds defaults.
    pub fn load_patient(&self, patient_id: i64) -> Result<FfiLoadOutcome, ChartFfiError> {
        let ticket = self.chart.lock()?.begin_load(patient_id);
        Ok(self.fetch(ticket)?.into())
    }

    pub fn clear_patient(&self) -> Result<(), ChartFfiError> {
        self.chart.lock()?.clear_patient();
        Ok(())
    }

    pub fn patient_id(&self) -> Result<Option<i64>, ChartFfiError> {
        Ok(self.chart.lock()?.patient_id())
    }

    /// Entries to draw, with scratch values for the tooth being edited.
    pub fn teeth(&self) -> Result<Vec<FfiToothEntry>, ChartFfiError> {
        let view = self.chart.lock()?;
        Ok(view
            .entries()
            .iter()
            .map(|entry| FfiToothEntry {
                id: entry.id,
                tooth_number: entry.tooth_number,
                fdi: chart::to_fdi(entry.tooth_number),
                status: entry.status.into(),
                display_status: view.display_status(entry.tooth_number).into(),
                notes: view.notes_for(entry.tooth_number).map(str::to_string),
                last_updated: entry.last_updated.clone(),
                saved: entry.is_persisted(),
            })
            .collect())
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Open a diagram tooth (FDI code) for editing.
    pub fn select_tooth(&self, fdi: u8) -> Result<Option<FfiDiscardedEdit>, ChartFfiError> {
        Ok(self.chart.lock()?.select_tooth(fdi)?.map(Into::into))
    }

    pub fn update_scratch_status(&self, status: FfiToothStatus) -> Result<(), ChartFfiError> {
        self.chart.lock()?.update_scratch_status(status.into())?;
        Ok(())
    }

    pub fn update_scratch_notes(&self, notes: String) -> Result<(), ChartFfiError> {
        self.chart.lock()?.update_scratch_notes(notes)?;
        Ok(())
    }

    /// Save the open edit and reload the chart.
    pub fn commit(&self) -> Result<FfiCommitOutcome, ChartFfiError> {
        let ticket = self.chart.lock()?.begin_commit()?;
        let result = self.backend.update_tooth_status(
            ticket.patient_id(),
            ticket.tooth_number(),
            ticket.update(),
        );

        let reload = {
            let mut chart = self.chart.lock()?;
            let patient_id = ticket.patient_id();
            match chart.finish_commit(ticket, result)? {
                CommitOutcome::Saved { .. } => chart.begin_load(patient_id),
                CommitOutcome::Discarded => return Ok(FfiCommitOutcome::Discarded),
            }
        };

        let resynced = match self.fetch(reload) {
            Ok(LoadOutcome::Applied { .. }) => true,
            Ok(LoadOutcome::Discarded) => false,
            Err(e) => {
                tracing::warn!(error = %e, "Tooth saved but chart reload failed");
                false
            }
        };
        Ok(FfiCommitOutcome::Saved { resynced })
    }

    pub fn cancel(&self) -> Result<(), ChartFfiError> {
        self.chart.lock()?.cancel();
        Ok(())
    }

    /// Canonical number of the tooth open for editing.
    pub fn selected_tooth(&self) -> Result<Option<u8>, ChartFfiError> {
        Ok(self.chart.lock()?.selected_tooth())
    }

    pub fn display_status(&self, tooth_number: u8) -> Result<FfiToothStatus, ChartFfiError> {
        Ok(self.chart.lock()?.display_status(tooth_number).into())
    }

    // =========================================================================
    // Export Operations
    // =========================================================================

    /// Export the confirmed chart as CSV.
    pub fn export_csv(&self) -> Result<String, ChartFfiError> {
        Ok(report_for(&*self.chart.lock()?)?.to_csv())
    }

    /// Export the confirmed chart as JSON.
    pub fn export_json(&self) -> Result<String, ChartFfiError> {
        Ok(report_for(&*self.chart.lock()?)?.to_json()?)
    }
}

fn report_for(chart: &ToothChart) -> Result<ChartReport, ChartFfiError> {
    ChartReport::from_chart(chart)
        .ok_or_else(|| ChartFfiError::InvalidInput("no patient selected".into()))
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe tooth status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiToothStatus {
    Healthy,
    Caries,
    Treated,
    Lost,
    Other,
    Unknown,
}

impl From<ToothStatus> for FfiToothStatus {
    fn from(status: ToothStatus) -> Self {
        match status {
            ToothStatus::Healthy => FfiToothStatus::Healthy,
            ToothStatus::Caries => FfiToothStatus::Caries,
            ToothStatus::Treated => FfiToothStatus::Treated,
            ToothStatus::Lost => FfiToothStatus::Lost,
            ToothStatus::Other => FfiToothStatus::Other,
            ToothStatus::Unknown => FfiToothStatus::Unknown,
        }
    }
}

impl From<FfiToothStatus> for ToothStatus {
    fn from(status: FfiToothStatus) -> Self {
        match status {
            FfiToothStatus::Healthy => ToothStatus::Healthy,
            FfiToothStatus::Caries => ToothStatus::Caries,
            FfiToothStatus::Treated => ToothStatus::Treated,
            FfiToothStatus::Lost => ToothStatus::Lost,
            FfiToothStatus::Other => ToothStatus::Other,
            FfiToothStatus::Unknown => ToothStatus::Unknown,
        }
    }
}

/// FFI-safe tooth entry.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiToothEntry {
    pub id: Option<i64>,
    pub tooth_number: u8,
    pub fdi: u8,
    /// Confirmed status
    pub status: FfiToothStatus,
    /// Status to draw (scratch value while editing)
    pub display_status: FfiToothStatus,
    pub notes: Option<String>,
    pub last_updated: String,
    pub saved: bool,
}

/// Edit dropped by re-selecting another tooth.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDiscardedEdit {
    pub tooth_number: u8,
    pub fdi: u8,
    pub status: FfiToothStatus,
    pub notes: Option<String>,
}

impl From<DiscardedEdit> for FfiDiscardedEdit {
    fn from(edit: DiscardedEdit) -> Self {
        Self {
            tooth_number: edit.tooth_number,
            fdi: chart::to_fdi(edit.tooth_number),
            status: edit.status.into(),
            notes: edit.notes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiLoadOutcome {
    Applied { merged: u32 },
    Discarded,
}

impl From<LoadOutcome> for FfiLoadOutcome {
    fn from(outcome: LoadOutcome) -> Self {
        match outcome {
            LoadOutcome::Applied { merged } => FfiLoadOutcome::Applied {
                merged: merged as u32,
            },
            LoadOutcome::Discarded => FfiLoadOutcome::Discarded,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiCommitOutcome {
    Saved { resynced: bool },
    Discarded,
}

impl From<CommitOutcome> for FfiCommitOutcome {
    fn from(outcome: CommitOutcome) -> Self {
        match outcome {
            CommitOutcome::Saved { resynced } => FfiCommitOutcome::Saved { resynced },
            CommitOutcome::Discarded => FfiCommitOutcome::Discarded,
        }
    }
}

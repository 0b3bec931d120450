//! Access to persisted tooth records.
//!
//! The chart only needs two operations from whatever stores teeth: list a
//! patient's records, and write one tooth's status. [`HttpBackend`] talks to
//! the clinic REST API, [`crate::db::Database`] keeps records in a local
//! SQLite file and [`InMemoryBackend`] is for tests and demos.

mod http;
mod memory;

pub use http::*;
pub use memory::*;

use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::models::{TeethRecord, UpdateToothStatus};

/// Backend errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("Cannot connect to clinic API at {0}")]
    Connection(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Clinic API returned {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("HTTP client error: {0}")]
    Request(String),

    #[error("Local store error: {0}")]
    Store(String),
}

impl From<crate::db::DbError> for BackendError {
    fn from(e: crate::db::DbError) -> Self {
        BackendError::Store(e.to_string())
    }
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Source of truth for tooth records.
pub trait TeethBackend {
    /// All persisted records for a patient. May be empty.
    fn teeth_by_patient(&self, patient_id: i64) -> BackendResult<Vec<TeethRecord>>;

    /// Write one tooth's status and notes. Re-sending the same values is safe.
    fn update_tooth_status(
        &self,
        patient_id: i64,
        tooth_number: u8,
        update: &UpdateToothStatus,
    ) -> BackendResult<()>;
}

impl<T: TeethBackend + ?Sized> TeethBackend for &T {
    fn teeth_by_patient(&self, patient_id: i64) -> BackendResult<Vec<TeethRecord>> {
        (**self).teeth_by_patient(patient_id)
    }

    fn update_tooth_status(
        &self,
        patient_id: i64,
        tooth_number: u8,
        update: &UpdateToothStatus,
    ) -> BackendResult<()> {
        (**self).update_tooth_status(patient_id, tooth_number, update)
    }
}

impl<T: TeethBackend + ?Sized> TeethBackend for Box<T> {
    fn teeth_by_patient(&self, patient_id: i64) -> BackendResult<Vec<TeethRecord>> {
        (**self).teeth_by_patient(patient_id)
    }

    fn update_tooth_status(
        &self,
        patient_id: i64,
        tooth_number: u8,
        update: &UpdateToothStatus,
    ) -> BackendResult<()> {
        (**self).update_tooth_status(patient_id, tooth_number, update)
    }
}

impl<T: TeethBackend + ?Sized> TeethBackend for Arc<T> {
    fn teeth_by_patient(&self, patient_id: i64) -> BackendResult<Vec<TeethRecord>> {
        (**self).teeth_by_patient(patient_id)
    }

    fn update_tooth_status(
        &self,
        patient_id: i64,
        tooth_number: u8,
        update: &UpdateToothStatus,
    ) -> BackendResult<()> {
        (**self).update_tooth_status(patient_id, tooth_number, update)
    }
}

/// Shares a backend that is not `Sync` (a SQLite connection) across threads.
impl<T: TeethBackend + ?Sized> TeethBackend for Mutex<T> {
    fn teeth_by_patient(&self, patient_id: i64) -> BackendResult<Vec<TeethRecord>> {
        self.lock()
            .map_err(|_| BackendError::Store("backend lock poisoned".into()))?
            .teeth_by_patient(patient_id)
    }

    fn update_tooth_status(
        &self,
        patient_id: i64,
        tooth_number: u8,
        update: &UpdateToothStatus,
    ) -> BackendResult<()> {
        self.lock()
            .map_err(|_| BackendError::Store("backend lock poisoned".into()))?
            .update_tooth_status(patient_id, tooth_number, update)
    }
}

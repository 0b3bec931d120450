//! In-process backend for tests and offline demos.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use crate::models::{TeethRecord, UpdateToothStatus};

use super::{BackendError, BackendResult, TeethBackend};

#[derive(Default)]
struct MemoryState {
    records: BTreeMap<(i64, i64), TeethRecord>,
    next_id: i64,
    fetch_failure: Option<BackendError>,
    update_failure: Option<BackendError>,
    fetch_calls: usize,
    update_calls: usize,
}

/// Backend holding records in memory, with injectable failures.
#[derive(Default)]
pub struct InMemoryBackend {
    state: Mutex<MemoryState>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Seed a record for a patient, replacing any record for the same tooth.
    pub fn insert(&self, patient_id: i64, mut record: TeethRecord) {
        let mut state = self.state();
        if record.record_id().is_none() {
            state.next_id += 1;
            record.id = Some(state.next_id);
        }
        record.patient_id = Some(patient_id);
        state
            .records
            .insert((patient_id, record.teeth_number), record);
    }

    /// Make every fetch fail with `error` until cleared with `None`.
    pub fn fail_fetches(&self, error: Option<BackendError>) {
        self.state().fetch_failure = error;
    }

    /// Make every update fail with `error` until cleared with `None`.
    pub fn fail_updates(&self, error: Option<BackendError>) {
        self.state().update_failure = error;
    }

    /// Records currently stored for a patient, ordered by tooth number.
    pub fn records_for(&self, patient_id: i64) -> Vec<TeethRecord> {
        self.state()
            .records
            .range((patient_id, i64::MIN)..=(patient_id, i64::MAX))
            .map(|(_, record)| record.clone())
            .collect()
    }

    pub fn fetch_count(&self) -> usize {
        self.state().fetch_calls
    }

    pub fn update_count(&self) -> usize {
        self.state().update_calls
    }
}

impl TeethBackend for InMemoryBackend {
    fn teeth_by_patient(&self, patient_id: i64) -> BackendResult<Vec<TeethRecord>> {
        let mut state = self.state();
        state.fetch_calls += 1;
        if let Some(error) = &state.fetch_failure {
            return Err(error.clone());
        }
        drop(state);
        Ok(self.records_for(patient_id))
    }

    fn update_tooth_status(
        &self,
        patient_id: i64,
        tooth_number: u8,
        update: &UpdateToothStatus,
    ) -> BackendResult<()> {
        let mut state = self.state();
        state.update_calls += 1;
        if let Some(error) = &state.update_failure {
            return Err(error.clone());
        }

        let key = (patient_id, tooth_number as i64);
        let existing = state.records.get(&key).and_then(TeethRecord::record_id);
        let id = match existing {
            Some(id) => id,
            None => {
                state.next_id += 1;
                state.next_id
            }
        };

        state.records.insert(
            key,
            TeethRecord {
                id: Some(id),
                teeth_number: tooth_number as i64,
                status: update.status.into(),
                description: update.description.clone(),
                patient_id: Some(patient_id),
                last_updated: Some(chrono::Utc::now().to_rfc3339()),
                treatment_plan: None,
            },
        );
        Ok(())
    }
}

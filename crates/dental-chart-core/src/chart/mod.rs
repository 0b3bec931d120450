//! Tooth chart for the patient currently on screen.
//!
//! Lifecycle:
//!
//! ```text
//!  NoPatient ──load_for_patient──▶ Loaded ──select_tooth──▶ Editing
//!      ▲                            │  ▲                      │
//!      └───────clear_patient────────┘  └──commit ok / cancel──┘
//!                                          (commit error stays Editing)
//! ```
//!
//! The chart always holds exactly one entry per canonical tooth 1-32 once a
//! patient is loaded, whatever the backend returns. Edits go into an
//! [`EditSession`] and only reach the chart after the backend confirms them.
//!
//! Loads and commits come in two halves (`begin_*` / `finish_*`) so callers
//! can run the backend call elsewhere. Each half carries a ticket; a response
//! for a patient that is no longer displayed is dropped.

mod notation;
mod session;

pub use notation::*;
pub use session::*;

use thiserror::Error;

use crate::backend::{BackendError, BackendResult, TeethBackend};
use crate::config::{ChartConfig, ReselectPolicy};
use crate::models::{
    is_canonical, TeethRecord, ToothEntry, ToothStatus, UpdateToothStatus, TOOTH_COUNT,
};

/// Chart errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChartError {
    #[error("Failed to load teeth for patient {patient_id}")]
    Fetch {
        patient_id: i64,
        #[source]
        source: BackendError,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Failed to save tooth {tooth_number}")]
    Commit {
        tooth_number: u8,
        #[source]
        source: BackendError,
    },

    #[error("Tooth {tooth_number} is still being edited")]
    EditInProgress { tooth_number: u8 },
}

pub type ChartResult<T> = Result<T, ChartError>;

/// Where the chart is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartState {
    NoPatient,
    Loaded,
    Editing,
}

/// Handle for an in-flight load.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadTicket {
    patient_id: i64,
    generation: u64,
    discarded: Option<DiscardedEdit>,
}

impl LoadTicket {
    pub fn patient_id(&self) -> i64 {
        self.patient_id
    }

    /// Unsaved edit the load threw away, if the open edit held changes.
    pub fn discarded_edit(&self) -> Option<&DiscardedEdit> {
        self.discarded.as_ref()
    }
}

/// Result of applying a load response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Records were merged into the chart
    Applied { merged: usize },
    /// The chart moved on to another load; the response was dropped
    Discarded,
}

/// Handle for an in-flight commit.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitTicket {
    patient_id: i64,
    patient_epoch: u64,
    session_id: u64,
    tooth_number: u8,
    update: UpdateToothStatus,
}

impl CommitTicket {
    pub fn patient_id(&self) -> i64 {
        self.patient_id
    }

    pub fn tooth_number(&self) -> u8 {
        self.tooth_number
    }

    /// Body to send to the backend.
    pub fn update(&self) -> &UpdateToothStatus {
        &self.update
    }
}

/// Result of a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Backend confirmed the write and the chart entry was updated.
    /// `resynced` tells whether the follow-up reload succeeded.
    Saved { resynced: bool },
    /// The patient changed while the request was in flight
    Discarded,
}

/// Canonical 32-tooth chart for one patient at a time.
#[derive(Debug, Clone)]
pub struct ToothChart {
    patient_id: Option<i64>,
    entries: Vec<ToothEntry>,
    session: Option<EditSession>,
    policy: ReselectPolicy,
    /// Bumped on every load and patient clear
    generation: u64,
    /// Bumped only when the displayed patient changes
    patient_epoch: u64,
    next_session_id: u64,
}

impl Default for ToothChart {
    fn default() -> Self {
        Self::new()
    }
}

impl ToothChart {
    /// Create an empty chart (no patient).
    pub fn new() -> Self {
        Self::with_policy(ReselectPolicy::default())
    }

    pub fn with_policy(policy: ReselectPolicy) -> Self {
        Self {
            patient_id: None,
            entries: Vec::new(),
            session: None,
            policy,
            generation: 0,
            patient_epoch: 0,
            next_session_id: 0,
        }
    }

    pub fn from_config(config: &ChartConfig) -> Self {
        Self::with_policy(config.reselect_policy)
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Reset to 32 healthy, never-saved entries.
    pub fn initialize(&mut self) {
        let now = now();
        self.entries = (1..=TOOTH_COUNT)
            .map(|n| ToothEntry::healthy(n, &now))
            .collect();
    }

    /// Load a patient's chart from the backend.
    ///
    /// On failure the chart stays usable with default values and the error is
    /// returned for the caller to show.
    pub fn load_for_patient<B>(&mut self, backend: &B, patient_id: i64) -> ChartResult<LoadOutcome>
    where
        B: TeethBackend + ?Sized,
    {
        let ticket = self.begin_load(patient_id);
        let result = backend.teeth_by_patient(patient_id);
        self.finish_load(ticket, result)
    }

    /// Switch to `patient_id` and reset to defaults ahead of a fetch.
    ///
    /// Any open edit is closed, whatever the reselect policy. If it held
    /// changes they are logged and handed back on the ticket.
    pub fn begin_load(&mut self, patient_id: i64) -> LoadTicket {
        let discarded = match self.session.take() {
            Some(open) if open.is_dirty() => {
                tracing::warn!(
                    discarded_tooth = open.tooth_number(),
                    patient_id,
                    "Discarding unsaved tooth edit on load"
                );
                Some(open.into_discarded())
            }
            _ => None,
        };

        if self.patient_id != Some(patient_id) {
            self.patient_epoch += 1;
        }
        self.generation += 1;
        self.patient_id = Some(patient_id);
        self.initialize();

        tracing::debug!(patient_id, generation = self.generation, "Loading tooth chart");
        LoadTicket {
            patient_id,
            generation: self.generation,
            discarded,
        }
    }

    /// Apply the backend's answer to a load started with [`Self::begin_load`].
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: BackendResult<Vec<TeethRecord>>,
    ) -> ChartResult<LoadOutcome> {
        if !self.is_current(&ticket) {
            tracing::warn!(
                patient_id = ticket.patient_id,
                active_patient = ?self.patient_id,
                "Discarding stale tooth chart response"
            );
            return Ok(LoadOutcome::Discarded);
        }

        match result {
            Ok(records) => {
                let merged = self.merge(&records);
                Ok(LoadOutcome::Applied { merged })
            }
            Err(source) => {
                tracing::warn!(patient_id = ticket.patient_id, error = %source, "Failed to load teeth, keeping defaults");
                Err(ChartError::Fetch {
                    patient_id: ticket.patient_id,
                    source,
                })
            }
        }
    }

    /// Whether a load ticket still refers to what is on screen.
    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        ticket.generation == self.generation && self.patient_id == Some(ticket.patient_id)
    }

    fn merge(&mut self, records: &[TeethRecord]) -> usize {
        let loaded_at = now();
        let mut merged = 0;

        for record in records {
            let Some(tooth_number) = record.tooth_number() else {
                tracing::warn!(teeth_number = record.teeth_number, "Skipping tooth record with invalid number");
                continue;
            };

            match self.entries.iter_mut().find(|e| e.tooth_number == tooth_number) {
                Some(entry) => entry.apply_record(record, &loaded_at),
                None => {
                    tracing::warn!(tooth_number, "Tooth record has no chart slot, appending");
                    self.entries
                        .push(ToothEntry::from_record(tooth_number, record, &loaded_at));
                }
            }
            merged += 1;
        }

        // An edit opened while the load was in flight started from defaults
        if let Some(session) = self.session.as_mut().filter(|s| !s.is_dirty()) {
            if let Some(entry) = self.entries.iter().find(|e| e.tooth_number == session.tooth_number()) {
                session.rebase(entry.status, entry.notes.clone());
            }
        }

        tracing::debug!(merged, "Merged tooth records");
        merged
    }

    /// Forget the current patient.
    pub fn clear_patient(&mut self) {
        self.patient_id = None;
        self.entries.clear();
        self.session = None;
        self.generation += 1;
        self.patient_epoch += 1;
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Open the tooth clicked on the diagram (FDI code) for editing.
    ///
    /// With [`ReselectPolicy::DiscardAndWarn`] an open edit is dropped; if it
    /// held changes they are returned. With [`ReselectPolicy::Block`] the call
    /// fails while any edit is open.
    pub fn select_tooth(&mut self, fdi: u8) -> ChartResult<Option<DiscardedEdit>> {
        self.require_patient()?;
        let tooth_number = from_fdi(fdi);

        let discarded = match self.session.take() {
            Some(open) if self.policy == ReselectPolicy::Block => {
                let tooth_number = open.tooth_number();
                self.session = Some(open);
                return Err(ChartError::EditInProgress { tooth_number });
            }
            Some(open) if open.is_dirty() => {
                tracing::warn!(
                    discarded_tooth = open.tooth_number(),
                    selected_tooth = tooth_number,
                    "Discarding unsaved tooth edit"
                );
                Some(open.into_discarded())
            }
            _ => None,
        };

        let (status, notes) = match self.entry(tooth_number) {
            Some(entry) => (entry.status, entry.notes.clone()),
            None => (ToothStatus::Healthy, None),
        };

        self.next_session_id += 1;
        self.session = Some(EditSession::open(self.next_session_id, tooth_number, status, notes));
        Ok(discarded)
    }

    /// Change the scratch status. The chart is not touched.
    pub fn update_scratch_status(&mut self, status: ToothStatus) -> ChartResult<()> {
        self.session_mut()?.set_status(status);
        Ok(())
    }

    /// Change the scratch notes. The chart is not touched.
    pub fn update_scratch_notes(&mut self, notes: impl Into<String>) -> ChartResult<()> {
        self.session_mut()?.set_notes(notes.into());
        Ok(())
    }

    /// Drop the open edit without saving.
    pub fn cancel(&mut self) {
        self.session = None;
    }

    /// Save the open edit, then reload the chart from the backend.
    ///
    /// If the backend rejects the write, the chart is unchanged and the edit
    /// stays open so it can be retried.
    pub fn commit<B>(&mut self, backend: &B) -> ChartResult<CommitOutcome>
    where
        B: TeethBackend + ?Sized,
    {
        let ticket = self.begin_commit()?;
        let result =
            backend.update_tooth_status(ticket.patient_id, ticket.tooth_number, &ticket.update);
        let patient_id = ticket.patient_id;

        match self.finish_commit(ticket, result)? {
            CommitOutcome::Saved { .. } => {
                let resynced = match self.load_for_patient(backend, patient_id) {
                    Ok(_) => true,
                    Err(e) => {
                        tracing::warn!(error = %e, "Tooth saved but chart reload failed");
                        false
                    }
                };
                Ok(CommitOutcome::Saved { resynced })
            }
            CommitOutcome::Discarded => Ok(CommitOutcome::Discarded),
        }
    }

    /// Validate the open edit and capture what to send.
    pub fn begin_commit(&self) -> ChartResult<CommitTicket> {
        let patient_id = self.require_patient()?;
        let session = self
            .session
            .as_ref()
            .ok_or_else(|| ChartError::Validation("no tooth selected".into()))?;

        if !is_canonical(session.tooth_number()) {
            return Err(ChartError::Validation(format!(
                "tooth number {} is outside 1-{}",
                session.tooth_number(),
                TOOTH_COUNT
            )));
        }

        Ok(CommitTicket {
            patient_id,
            patient_epoch: self.patient_epoch,
            session_id: session.id(),
            tooth_number: session.tooth_number(),
            update: session.to_update(),
        })
    }

    /// Apply the backend's answer to a commit started with [`Self::begin_commit`].
    ///
    /// A successful answer does not reload; callers using this directly should
    /// follow it with a load.
    pub fn finish_commit(
        &mut self,
        ticket: CommitTicket,
        result: BackendResult<()>,
    ) -> ChartResult<CommitOutcome> {
        if ticket.patient_epoch != self.patient_epoch || self.patient_id != Some(ticket.patient_id) {
            tracing::warn!(
                patient_id = ticket.patient_id,
                tooth_number = ticket.tooth_number,
                "Discarding commit response for a patient no longer displayed"
            );
            return Ok(CommitOutcome::Discarded);
        }

        if let Err(source) = result {
            tracing::warn!(tooth_number = ticket.tooth_number, error = %source, "Tooth update rejected");
            return Err(ChartError::Commit {
                tooth_number: ticket.tooth_number,
                source,
            });
        }

        let now = now();
        let CommitTicket {
            tooth_number,
            update,
            session_id,
            ..
        } = ticket;

        match self.entries.iter_mut().find(|e| e.tooth_number == tooth_number) {
            Some(entry) => {
                entry.status = update.status;
                entry.notes = update.description;
                entry.last_updated = now;
            }
            None => {
                let mut entry = ToothEntry::healthy(tooth_number, &now);
                entry.status = update.status;
                entry.notes = update.description;
                self.entries.push(entry);
            }
        }

        if self.session.as_ref().is_some_and(|s| s.id() == session_id) {
            self.session = None;
        }

        tracing::info!(tooth_number, "Tooth status saved");
        Ok(CommitOutcome::Saved { resynced: false })
    }

    // =========================================================================
    // Read access
    // =========================================================================

    pub fn patient_id(&self) -> Option<i64> {
        self.patient_id
    }

    pub fn state(&self) -> ChartState {
        match (self.patient_id, &self.session) {
            (None, _) => ChartState::NoPatient,
            (Some(_), None) => ChartState::Loaded,
            (Some(_), Some(_)) => ChartState::Editing,
        }
    }

    pub fn policy(&self) -> ReselectPolicy {
        self.policy
    }

    /// All entries, in canonical order for a loaded chart.
    pub fn entries(&self) -> &[ToothEntry] {
        &self.entries
    }

    /// Entry for a canonical tooth number.
    pub fn entry(&self, tooth_number: u8) -> Option<&ToothEntry> {
        self.entries.iter().find(|e| e.tooth_number == tooth_number)
    }

    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    /// Canonical number of the tooth open for editing.
    pub fn selected_tooth(&self) -> Option<u8> {
        self.session.as_ref().map(EditSession::tooth_number)
    }

    /// Confirmed status of a diagram tooth; `Unknown` if nothing is loaded.
    pub fn status_at_fdi(&self, fdi: u8) -> ToothStatus {
        if self.patient_id.is_none() {
            return ToothStatus::Unknown;
        }
        self.entry(from_fdi(fdi))
            .map(|e| e.status)
            .unwrap_or(ToothStatus::Unknown)
    }

    /// Status to draw: the scratch value while the tooth is being edited.
    pub fn display_status(&self, tooth_number: u8) -> ToothStatus {
        match &self.session {
            Some(session) if session.tooth_number() == tooth_number => session.status(),
            _ => self
                .entry(tooth_number)
                .map(|e| e.status)
                .unwrap_or(ToothStatus::Unknown),
        }
    }

    /// Notes to show: the scratch value while the tooth is being edited.
    pub fn notes_for(&self, tooth_number: u8) -> Option<&str> {
        match &self.session {
            Some(session) if session.tooth_number() == tooth_number => session.notes(),
            _ => self.entry(tooth_number).and_then(|e| e.notes.as_deref()),
        }
    }

    pub fn last_updated_for(&self, tooth_number: u8) -> Option<&str> {
        self.entry(tooth_number).map(|e| e.last_updated.as_str())
    }

    fn require_patient(&self) -> ChartResult<i64> {
        self.patient_id
            .ok_or_else(|| ChartError::Validation("no patient selected".into()))
    }

    fn session_mut(&mut self) -> ChartResult<&mut EditSession> {
        self.session
            .as_mut()
            .ok_or_else(|| ChartError::Validation("no tooth selected".into()))
    }
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;

    fn loaded_chart(backend: &InMemoryBackend, patient_id: i64) -> ToothChart {
        let mut chart = ToothChart::new();
        chart.load_for_patient(backend, patient_id).unwrap();
        chart
    }

    fn assert_full_coverage(chart: &ToothChart) {
        let mut numbers: Vec<u8> = chart.entries().iter().map(|e| e.tooth_number).collect();
        numbers.sort_unstable();
        assert_eq!(numbers, (1..=32).collect::<Vec<u8>>());
    }

    #[test]
    fn test_initialize() {
        let mut chart = ToothChart::new();
        chart.initialize();
        assert_full_coverage(&chart);
        assert!(chart.entries().iter().all(|e| e.status == ToothStatus::Healthy));
        assert!(chart.entries().iter().all(|e| e.id.is_none()));
    }

    #[test]
    fn test_state_transitions() {
        let backend = InMemoryBackend::new();
        let mut chart = ToothChart::new();
        assert_eq!(chart.state(), ChartState::NoPatient);

        chart.load_for_patient(&backend, 1).unwrap();
        assert_eq!(chart.state(), ChartState::Loaded);

        chart.select_tooth(18).unwrap();
        assert_eq!(chart.state(), ChartState::Editing);
        assert_eq!(chart.selected_tooth(), Some(1));

        chart.cancel();
        assert_eq!(chart.state(), ChartState::Loaded);

        chart.clear_patient();
        assert_eq!(chart.state(), ChartState::NoPatient);
        assert!(chart.entries().is_empty());
    }

    #[test]
    fn test_select_requires_patient() {
        let mut chart = ToothChart::new();
        let err = chart.select_tooth(11).unwrap_err();
        assert_eq!(err, ChartError::Validation("no patient selected".into()));
    }

    #[test]
    fn test_scratch_requires_session() {
        let backend = InMemoryBackend::new();
        let mut chart = loaded_chart(&backend, 1);
        assert!(matches!(
            chart.update_scratch_status(ToothStatus::Lost),
            Err(ChartError::Validation(_))
        ));
        assert!(matches!(
            chart.update_scratch_notes("x"),
            Err(ChartError::Validation(_))
        ));
    }

    #[test]
    fn test_commit_without_selection() {
        let backend = InMemoryBackend::new();
        let mut chart = loaded_chart(&backend, 1);
        let err = chart.commit(&backend).unwrap_err();
        assert_eq!(err, ChartError::Validation("no tooth selected".into()));
        assert_eq!(backend.update_count(), 0);
    }

    #[test]
    fn test_commit_without_patient() {
        let backend = InMemoryBackend::new();
        let mut chart = ToothChart::new();
        let err = chart.commit(&backend).unwrap_err();
        assert_eq!(err, ChartError::Validation("no patient selected".into()));
        assert_eq!(backend.update_count(), 0);
    }

    #[test]
    fn test_commit_rejects_non_canonical_tooth() {
        let backend = InMemoryBackend::new();
        let mut chart = loaded_chart(&backend, 1);
        // 99 is not an FDI code, so it passes through unchanged
        chart.select_tooth(99).unwrap();
        assert_eq!(chart.selected_tooth(), Some(99));
        assert!(matches!(chart.commit(&backend), Err(ChartError::Validation(_))));
        assert_eq!(backend.update_count(), 0);
    }

    #[test]
    fn test_display_status_overlays_scratch() {
        let backend = InMemoryBackend::new();
        let mut chart = loaded_chart(&backend, 1);
        chart.select_tooth(21).unwrap();
        chart.update_scratch_status(ToothStatus::Caries).unwrap();
        chart.update_scratch_notes("distal").unwrap();

        assert_eq!(chart.display_status(9), ToothStatus::Caries);
        assert_eq!(chart.notes_for(9), Some("distal"));
        assert_eq!(chart.entry(9).unwrap().status, ToothStatus::Healthy);
        assert_eq!(chart.status_at_fdi(21), ToothStatus::Healthy);
        assert_eq!(chart.display_status(10), ToothStatus::Healthy);
    }

    #[test]
    fn test_status_at_fdi_without_patient() {
        let chart = ToothChart::new();
        assert_eq!(chart.status_at_fdi(11), ToothStatus::Unknown);
        assert_eq!(chart.last_updated_for(8), None);
    }

    #[test]
    fn test_stale_load_discarded() {
        let backend = InMemoryBackend::new();
        backend.insert(1, TeethRecord::new(5, "Lost"));
        let mut chart = ToothChart::new();

        let stale = chart.begin_load(1);
        let current = chart.begin_load(2);
        assert!(!chart.is_current(&stale));

        let outcome = chart
            .finish_load(stale, backend.teeth_by_patient(1))
            .unwrap();
        assert_eq!(outcome, LoadOutcome::Discarded);
        assert_eq!(chart.entry(5).unwrap().status, ToothStatus::Healthy);

        let outcome = chart
            .finish_load(current, backend.teeth_by_patient(2))
            .unwrap();
        assert_eq!(outcome, LoadOutcome::Applied { merged: 0 });
        assert_eq!(chart.patient_id(), Some(2));
    }

    #[test]
    fn test_stale_load_after_clear() {
        let backend = InMemoryBackend::new();
        let mut chart = ToothChart::new();
        let ticket = chart.begin_load(1);
        chart.clear_patient();

        let outcome = chart.finish_load(ticket, backend.teeth_by_patient(1)).unwrap();
        assert_eq!(outcome, LoadOutcome::Discarded);
        assert!(chart.entries().is_empty());
    }

    #[test]
    fn test_stale_fetch_error_not_reported() {
        let mut chart = ToothChart::new();
        let stale = chart.begin_load(1);
        chart.begin_load(2);
        let outcome = chart
            .finish_load(stale, Err(BackendError::Timeout(30)))
            .unwrap();
        assert_eq!(outcome, LoadOutcome::Discarded);
    }

    #[test]
    fn test_stale_commit_discarded() {
        let backend = InMemoryBackend::new();
        let mut chart = loaded_chart(&backend, 1);
        chart.select_tooth(11).unwrap();
        chart.update_scratch_status(ToothStatus::Lost).unwrap();
        let ticket = chart.begin_commit().unwrap();

        chart.load_for_patient(&backend, 2).unwrap();
        let outcome = chart.finish_commit(ticket, Ok(())).unwrap();

        assert_eq!(outcome, CommitOutcome::Discarded);
        assert_eq!(chart.entry(8).unwrap().status, ToothStatus::Healthy);
    }

    #[test]
    fn test_session_rebased_when_load_lands() {
        let backend = InMemoryBackend::new();
        backend.insert(3, TeethRecord::new(15, "Caries"));
        let mut chart = ToothChart::new();

        let ticket = chart.begin_load(3);
        chart.select_tooth(27).unwrap();
        assert_eq!(chart.session().unwrap().status(), ToothStatus::Healthy);

        chart.finish_load(ticket, backend.teeth_by_patient(3)).unwrap();
        let session = chart.session().unwrap();
        assert_eq!(session.status(), ToothStatus::Caries);
        assert!(!session.is_dirty());
    }

    #[test]
    fn test_block_policy() {
        let backend = InMemoryBackend::new();
        let mut chart = ToothChart::with_policy(ReselectPolicy::Block);
        chart.load_for_patient(&backend, 1).unwrap();

        chart.select_tooth(11).unwrap();
        chart.update_scratch_status(ToothStatus::Caries).unwrap();

        let err = chart.select_tooth(21).unwrap_err();
        assert_eq!(err, ChartError::EditInProgress { tooth_number: 8 });
        assert_eq!(chart.selected_tooth(), Some(8));
        assert_eq!(chart.session().unwrap().status(), ToothStatus::Caries);

        chart.cancel();
        assert!(chart.select_tooth(21).is_ok());
        assert_eq!(chart.selected_tooth(), Some(9));
    }

    #[test]
    fn test_discard_policy_reports_dirty_edit_only() {
        let backend = InMemoryBackend::new();
        let mut chart = loaded_chart(&backend, 1);

        chart.select_tooth(11).unwrap();
        assert_eq!(chart.select_tooth(12).unwrap(), None);

        chart.update_scratch_notes("cracked").unwrap();
        let discarded = chart.select_tooth(13).unwrap().unwrap();
        assert_eq!(discarded.tooth_number, 7);
        assert_eq!(discarded.notes.as_deref(), Some("cracked"));
        assert_eq!(chart.selected_tooth(), Some(6));
        assert_eq!(chart.entry(7).unwrap().notes, None);
    }

    #[test]
    fn test_reload_hands_back_dirty_edit() {
        let backend = InMemoryBackend::new();
        backend.insert(1, TeethRecord::new(8, "Caries"));
        let mut chart = loaded_chart(&backend, 1);

        chart.select_tooth(11).unwrap();
        chart.update_scratch_notes("chipped").unwrap();

        let ticket = chart.begin_load(1);
        let discarded = ticket.discarded_edit().unwrap();
        assert_eq!(discarded.tooth_number, 8);
        assert_eq!(discarded.status, ToothStatus::Caries);
        assert_eq!(discarded.notes.as_deref(), Some("chipped"));
        assert!(chart.session().is_none());

        chart.finish_load(ticket, backend.teeth_by_patient(1)).unwrap();
        assert_eq!(chart.state(), ChartState::Loaded);
        assert_eq!(chart.entry(8).unwrap().notes, None);

        chart.select_tooth(21).unwrap();
        assert!(chart.begin_load(1).discarded_edit().is_none());
    }

    #[test]
    fn test_error_display_leaves_source_to_chain() {
        let fetch = ChartError::Fetch {
            patient_id: 7,
            source: BackendError::Timeout(30),
        };
        assert_eq!(fetch.to_string(), "Failed to load teeth for patient 7");
        let source = std::error::Error::source(&fetch).unwrap();
        assert_eq!(source.to_string(), BackendError::Timeout(30).to_string());

        let commit = ChartError::Commit {
            tooth_number: 3,
            source: BackendError::Timeout(30),
        };
        assert_eq!(commit.to_string(), "Failed to save tooth 3");
        assert!(std::error::Error::source(&commit).is_some());
    }

    #[test]
    fn test_finish_commit_without_reload() {
        let backend = InMemoryBackend::new();
        let mut chart = loaded_chart(&backend, 1);
        chart.select_tooth(36).unwrap();
        chart.update_scratch_status(ToothStatus::Treated).unwrap();

        let ticket = chart.begin_commit().unwrap();
        assert_eq!(ticket.tooth_number(), 22);
        assert_eq!(ticket.update().status, ToothStatus::Treated);

        let outcome = chart.finish_commit(ticket, Ok(())).unwrap();
        assert_eq!(outcome, CommitOutcome::Saved { resynced: false });
        assert_eq!(chart.entry(22).unwrap().status, ToothStatus::Treated);
        assert_eq!(chart.state(), ChartState::Loaded);
    }
}

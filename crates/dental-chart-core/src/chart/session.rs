//! Scratch buffer for the tooth currently open for editing.

use serde::{Deserialize, Serialize};

use crate::models::{ToothStatus, UpdateToothStatus};

use super::notation::to_fdi;

/// Uncommitted status/notes for one tooth.
///
/// Starts as a copy of the tooth's chart entry. Nothing written here is
/// visible in the chart until the backend confirms the commit.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    id: u64,
    tooth_number: u8,
    status: ToothStatus,
    notes: Option<String>,
    original_status: ToothStatus,
    original_notes: Option<String>,
}

impl EditSession {
    pub(crate) fn open(id: u64, tooth_number: u8, status: ToothStatus, notes: Option<String>) -> Self {
        Self {
            id,
            tooth_number,
            status,
            notes: notes.clone(),
            original_status: status,
            original_notes: notes,
        }
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    /// Canonical number of the tooth being edited.
    pub fn tooth_number(&self) -> u8 {
        self.tooth_number
    }

    /// FDI code of the tooth being edited.
    pub fn fdi(&self) -> u8 {
        to_fdi(self.tooth_number)
    }

    pub fn status(&self) -> ToothStatus {
        self.status
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub(crate) fn set_status(&mut self, status: ToothStatus) {
        self.status = status;
    }

    pub(crate) fn set_notes(&mut self, notes: String) {
        self.notes = Some(notes);
    }

    /// Whether the scratch values differ from what the session started with.
    pub fn is_dirty(&self) -> bool {
        self.status != self.original_status || self.notes != self.original_notes
    }

    /// Re-base an untouched session on freshly loaded values.
    pub(crate) fn rebase(&mut self, status: ToothStatus, notes: Option<String>) {
        self.status = status;
        self.notes = notes.clone();
        self.original_status = status;
        self.original_notes = notes;
    }

    pub(crate) fn to_update(&self) -> UpdateToothStatus {
        UpdateToothStatus {
            status: self.status,
            description: self.notes.clone(),
        }
    }

    pub(crate) fn into_discarded(self) -> DiscardedEdit {
        DiscardedEdit {
            tooth_number: self.tooth_number,
            status: self.status,
            notes: self.notes,
        }
    }
}

/// Unsaved edit dropped because another tooth was selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscardedEdit {
    pub tooth_number: u8,
    pub status: ToothStatus,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirty_tracking() {
        let mut session = EditSession::open(1, 9, ToothStatus::Healthy, None);
        assert!(!session.is_dirty());
        assert_eq!(session.fdi(), 21);

        session.set_status(ToothStatus::Treated);
        assert!(session.is_dirty());

        session.set_status(ToothStatus::Healthy);
        assert!(!session.is_dirty());

        session.set_notes("chipped".into());
        assert!(session.is_dirty());
    }

    #[test]
    fn test_update_body() {
        let mut session = EditSession::open(1, 15, ToothStatus::Caries, Some("upper molar".into()));
        session.set_status(ToothStatus::Treated);

        let update = session.to_update();
        assert_eq!(update.status, ToothStatus::Treated);
        assert_eq!(update.description.as_deref(), Some("upper molar"));
    }
}

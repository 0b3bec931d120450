//! Tooth chart entries and the backend's teeth DTOs.

use serde::{Deserialize, Serialize};

use super::status::{as_code, RawStatus, ToothStatus};

/// Number of teeth in a permanent adult dentition.
pub const TOOTH_COUNT: u8 = 32;

/// Whether `tooth_number` is a canonical (1-32) tooth number.
pub fn is_canonical(tooth_number: u8) -> bool {
    (1..=TOOTH_COUNT).contains(&tooth_number)
}

/// One tooth in a patient's chart, keyed by canonical number.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToothEntry {
    /// Backend record ID - None until the tooth has been saved once
    pub id: Option<i64>,
    /// Canonical tooth number (1-32), fixed at creation
    pub tooth_number: u8,
    /// Current confirmed status
    pub status: ToothStatus,
    /// Free-text clinical notes
    pub notes: Option<String>,
    /// RFC 3339 timestamp of the last confirmed write
    pub last_updated: String,
}

impl ToothEntry {
    /// Default entry for a tooth with no backend record.
    pub fn healthy(tooth_number: u8, now: &str) -> Self {
        Self {
            id: None,
            tooth_number,
            status: ToothStatus::Healthy,
            notes: None,
            last_updated: now.to_string(),
        }
    }

    /// Build an entry straight from a backend record.
    pub fn from_record(tooth_number: u8, record: &TeethRecord, loaded_at: &str) -> Self {
        let mut entry = Self::healthy(tooth_number, loaded_at);
        entry.apply_record(record, loaded_at);
        entry
    }

    /// Overwrite this entry with a backend record. The tooth number is kept.
    pub fn apply_record(&mut self, record: &TeethRecord, loaded_at: &str) {
        self.id = record.record_id();
        self.status = ToothStatus::from_raw(&record.status);
        self.notes = record.description.clone();
        self.last_updated = record
            .last_updated
            .clone()
            .unwrap_or_else(|| loaded_at.to_string());
    }

    /// Check if this tooth has ever been saved to the backend.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

/// A tooth record as returned by `GET /Teeth/patient/{patientId}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TeethRecord {
    /// Backend ID (0 or absent for unsaved)
    #[serde(default)]
    pub id: Option<i64>,
    /// Canonical tooth number (1-32); the API calls it `teethNumber`
    pub teeth_number: i64,
    /// Status as name or numeric code
    #[serde(default)]
    pub status: RawStatus,
    /// Clinical notes
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub patient_id: Option<i64>,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub treatment_plan: Option<String>,
}

impl TeethRecord {
    /// Create a record for a tooth (mostly useful for backends and tests).
    pub fn new(teeth_number: i64, status: impl Into<RawStatus>) -> Self {
        Self {
            teeth_number,
            status: status.into(),
            ..Default::default()
        }
    }

    /// Backend ID, treating 0 as unsaved.
    pub fn record_id(&self) -> Option<i64> {
        self.id.filter(|id| *id != 0)
    }

    /// Canonical tooth number if it fits the chart's key type.
    pub fn tooth_number(&self) -> Option<u8> {
        u8::try_from(self.teeth_number).ok()
    }
}

/// Body for `PUT /Teeth/patient/{patientId}/number/{toothNumber}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateToothStatus {
    /// Sent as the numeric code
    #[serde(with = "as_code")]
    pub status: ToothStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

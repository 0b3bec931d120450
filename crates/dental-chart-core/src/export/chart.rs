//! Tooth chart report for printing and spreadsheet export.

use serde::{Deserialize, Serialize};

use crate::chart::{to_fdi, Quadrant, ToothChart};
use crate::models::ToothStatus;

/// Snapshot of one patient's confirmed chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartReport {
    /// Report metadata
    pub metadata: ReportMetadata,
    /// One row per tooth, in canonical order
    pub teeth: Vec<ReportRow>,
}

/// Chart report metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub patient_id: i64,
    /// Export timestamp
    pub exported_at: String,
    /// Teeth with a saved backend record
    pub saved_count: usize,
    /// Count per status name, in status code order
    pub status_counts: Vec<StatusCount>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusCount {
    pub status: String,
    pub count: usize,
}

/// Single tooth row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRow {
    /// Canonical number (1-32)
    pub tooth_number: u8,
    /// FDI code as shown on the diagram
    pub fdi: u8,
    pub quadrant: String,
    pub status: String,
    pub notes: Option<String>,
    pub last_updated: String,
    pub saved: bool,
}

impl ChartReport {
    /// Build a report from the confirmed chart. Unsaved edits are not included.
    ///
    /// Returns `None` when no patient is loaded.
    pub fn from_chart(chart: &ToothChart) -> Option<Self> {
        let patient_id = chart.patient_id()?;

        let mut entries: Vec<_> = chart.entries().iter().collect();
        entries.sort_by_key(|e| e.tooth_number);

        let teeth: Vec<ReportRow> = entries
            .into_iter()
            .map(|entry| ReportRow {
                tooth_number: entry.tooth_number,
                fdi: to_fdi(entry.tooth_number),
                quadrant: Quadrant::of(entry.tooth_number)
                    .map(quadrant_label)
                    .unwrap_or("")
                    .to_string(),
                status: entry.status.name().to_string(),
                notes: entry.notes.clone(),
                last_updated: entry.last_updated.clone(),
                saved: entry.is_persisted(),
            })
            .collect();

        let status_counts = ToothStatus::ALL
            .iter()
            .map(|status| StatusCount {
                status: status.name().to_string(),
                count: chart.entries().iter().filter(|e| e.status == *status).count(),
            })
            .collect();

        Some(Self {
            metadata: ReportMetadata {
                patient_id,
                exported_at: chrono::Utc::now().to_rfc3339(),
                saved_count: teeth.iter().filter(|row| row.saved).count(),
                status_counts,
            },
            teeth,
        })
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export to CSV format.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();

        // Header
        csv.push_str("patient_id,tooth_number,fdi,quadrant,status,notes,last_updated,saved\n");

        for row in &self.teeth {
            csv.push_str(&format!(
                "{},{},{},{},{},{},{},{}\n",
                self.metadata.patient_id,
                row.tooth_number,
                row.fdi,
                escape_csv(&row.quadrant),
                escape_csv(&row.status),
                escape_csv(row.notes.as_deref().unwrap_or("")),
                escape_csv(&row.last_updated),
                row.saved,
            ));
        }

        csv
    }
}

fn quadrant_label(quadrant: Quadrant) -> &'static str {
    match quadrant {
        Quadrant::UpperRight => "upper right",
        Quadrant::UpperLeft => "upper left",
        Quadrant::LowerLeft => "lower left",
        Quadrant::LowerRight => "lower right",
    }
}

fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

//! SQLite schema definition.

/// Complete database schema for the local tooth store.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Teeth (one row per saved tooth per patient)
-- ============================================================================

CREATE TABLE IF NOT EXISTS teeth (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    patient_id INTEGER NOT NULL,
    tooth_number INTEGER NOT NULL CHECK (tooth_number BETWEEN 1 AND 32),  -- canonical numbering
    status TEXT NOT NULL DEFAULT 'Healthy',      -- status name, as the REST API returns it
    description TEXT,
    treatment_plan TEXT,
    last_updated TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now')),
    UNIQUE (patient_id, tooth_number)
);

CREATE INDEX IF NOT EXISTS idx_teeth_patient ON teeth(patient_id);
"#;

//! Tooth record database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::backend::{BackendResult, TeethBackend};
use crate::models::{is_canonical, TeethRecord, ToothStatus, UpdateToothStatus};

const SELECT_TEETH: &str = r#"
    SELECT id, patient_id, tooth_number, status, description,
           treatment_plan, last_updated
    FROM teeth
"#;

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<TeethRecord> {
    let status: String = row.get(3)?;
    Ok(TeethRecord {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        teeth_number: row.get(2)?,
        status: status.into(),
        description: row.get(4)?,
        treatment_plan: row.get(5)?,
        last_updated: row.get(6)?,
    })
}

impl Database {
    /// Insert or update one tooth of a patient. Returns the row ID.
    pub fn upsert_tooth(
        &self,
        patient_id: i64,
        tooth_number: u8,
        status: ToothStatus,
        description: Option<&str>,
    ) -> DbResult<i64> {
        if !is_canonical(tooth_number) {
            return Err(DbError::Constraint(format!(
                "tooth number {} is not canonical",
                tooth_number
            )));
        }

        let id = self.conn.query_row(
            r#"
            INSERT INTO teeth (patient_id, tooth_number, status, description, last_updated)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (patient_id, tooth_number) DO UPDATE SET
                status = excluded.status,
                description = excluded.description,
                last_updated = excluded.last_updated
            RETURNING id
            "#,
            params![
                patient_id,
                tooth_number,
                status.name(),
                description,
                chrono::Utc::now().to_rfc3339(),
            ],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Get one tooth of a patient.
    pub fn get_tooth(&self, patient_id: i64, tooth_number: u8) -> DbResult<Option<TeethRecord>> {
        self.conn
            .query_row(
                &format!("{} WHERE patient_id = ?1 AND tooth_number = ?2", SELECT_TEETH),
                params![patient_id, tooth_number],
                row_to_record,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Get a tooth by row ID.
    pub fn get_tooth_by_id(&self, id: i64) -> DbResult<Option<TeethRecord>> {
        self.conn
            .query_row(
                &format!("{} WHERE id = ?", SELECT_TEETH),
                [id],
                row_to_record,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Status of a tooth by row ID.
    pub fn tooth_status_by_id(&self, id: i64) -> DbResult<ToothStatus> {
        let record = self
            .get_tooth_by_id(id)?
            .ok_or_else(|| DbError::NotFound(format!("tooth {}", id)))?;
        Ok(ToothStatus::from_raw(&record.status))
    }

    /// All saved teeth for a patient, by tooth number.
    pub fn list_teeth_for_patient(&self, patient_id: i64) -> DbResult<Vec<TeethRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{} WHERE patient_id = ? ORDER BY tooth_number",
            SELECT_TEETH
        ))?;

        let rows = stmt.query_map([patient_id], row_to_record)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Delete every saved tooth of a patient.
    pub fn delete_teeth_for_patient(&self, patient_id: i64) -> DbResult<usize> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM teeth WHERE patient_id = ?", [patient_id])?;
        Ok(rows_affected)
    }
}

impl TeethBackend for Database {
    fn teeth_by_patient(&self, patient_id: i64) -> BackendResult<Vec<TeethRecord>> {
        Ok(self.list_teeth_for_patient(patient_id)?)
    }

    fn update_tooth_status(
        &self,
        patient_id: i64,
        tooth_number: u8,
        update: &UpdateToothStatus,
    ) -> BackendResult<()> {
        self.upsert_tooth(
            patient_id,
            tooth_number,
            update.status,
            update.description.as_deref(),
        )?;
        Ok(())
    }
}

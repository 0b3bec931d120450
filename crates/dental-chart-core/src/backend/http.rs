//! Clinic REST API client for the `/Teeth` resource.

use std::time::Duration;

use reqwest::blocking::{Client, Response};

use crate::config::ChartConfig;
use crate::models::{RawStatus, TeethRecord, ToothStatus, UpdateToothStatus};

use super::{BackendError, BackendResult, TeethBackend};

/// Blocking HTTP client for the clinic API.
pub struct HttpBackend {
    base_url: String,
    client: Client,
    timeout_secs: u64,
}

impl HttpBackend {
    /// Create a client for the API at `base_url` (e.g. `http://localhost:5000/api`).
    pub fn new(base_url: &str, timeout_secs: u64) -> BackendResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| BackendError::Request(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        })
    }

    pub fn from_config(config: &ChartConfig) -> BackendResult<Self> {
        Self::new(&config.api_base_url, config.request_timeout_secs)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of all teeth for a patient.
    pub fn patient_teeth_url(&self, patient_id: i64) -> String {
        format!("{}/Teeth/patient/{}", self.base_url, patient_id)
    }

    /// URL for updating one tooth of a patient.
    pub fn tooth_status_url(&self, patient_id: i64, tooth_number: u8) -> String {
        format!(
            "{}/Teeth/patient/{}/number/{}",
            self.base_url, patient_id, tooth_number
        )
    }

    /// Fetch a single tooth record by backend ID.
    pub fn tooth_by_id(&self, id: i64) -> BackendResult<TeethRecord> {
        let url = format!("{}/Teeth/{}", self.base_url, id);
        let response = self.send(self.client.get(&url))?;
        response
            .json()
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    /// Fetch only the status of a tooth record.
    pub fn status_by_id(&self, id: i64) -> BackendResult<ToothStatus> {
        let url = format!("{}/Teeth/status/{}", self.base_url, id);
        let body = self
            .send(self.client.get(&url))?
            .text()
            .map_err(|e| BackendError::Decode(e.to_string()))?;

        Ok(parse_status_body(&body))
    }

    fn send(&self, request: reqwest::blocking::RequestBuilder) -> BackendResult<Response> {
        let response = request.send().map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(BackendError::Http {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    fn map_send_error(&self, e: reqwest::Error) -> BackendError {
        if e.is_connect() {
            BackendError::Connection(self.base_url.clone())
        } else if e.is_timeout() {
            BackendError::Timeout(self.timeout_secs)
        } else {
            BackendError::Request(e.to_string())
        }
    }
}

/// Decode a status endpoint body: JSON (string or number) or bare text.
fn parse_status_body(body: &str) -> ToothStatus {
    let raw = serde_json::from_str::<RawStatus>(body)
        .unwrap_or_else(|_| RawStatus::Text(body.trim().to_string()));
    ToothStatus::from_raw(&raw)
}

impl TeethBackend for HttpBackend {
    fn teeth_by_patient(&self, patient_id: i64) -> BackendResult<Vec<TeethRecord>> {
        let url = self.patient_teeth_url(patient_id);
        tracing::debug!(%url, "Fetching teeth");

        let response = self.send(self.client.get(&url))?;
        let records: Option<Vec<TeethRecord>> = response
            .json()
            .map_err(|e| BackendError::Decode(e.to_string()))?;

        // Some API versions answer `null` for a patient with no records
        Ok(records.unwrap_or_default())
    }

    fn update_tooth_status(
        &self,
        patient_id: i64,
        tooth_number: u8,
        update: &UpdateToothStatus,
    ) -> BackendResult<()> {
        let url = self.tooth_status_url(patient_id, tooth_number);
        tracing::debug!(%url, status = %update.status, "Updating tooth");

        self.send(self.client.put(&url).json(update))?;
        Ok(())
    }
}

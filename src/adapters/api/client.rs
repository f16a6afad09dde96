//! Patient service client
//!
//! [`PatientDirectory`] is the seam the pipeline driver depends on;
//! [`HttpPatientDirectory`] is the reqwest implementation. Every operation
//! is a single round-trip: a failed call fails its stage, there is no retry
//! layer.

use crate::config::ApiConfig;
use crate::domain::{
    ApiError, ApiStatistics, HealthStatus, InsuranceId, MeridianError, PatientId, PatientRecord,
    Result,
};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::models::{CreatedPayload, HealthPayload, PatientEnvelope, PatientPayload, StatsPayload};

/// Read/write access to the external patient service
///
/// The driver is generic over this trait so tests can substitute a scripted
/// implementation and assert call ordering.
#[async_trait]
pub trait PatientDirectory: Send + Sync {
    /// Probe the fixed health endpoint
    ///
    /// Must be called once before any other operation; a failure here gates
    /// the whole run.
    async fn check_health(&self) -> Result<HealthStatus, ApiError>;

    /// Fetch the full patient collection
    async fn list_patients(&self) -> Result<Vec<PatientRecord>, ApiError>;

    /// Fetch a single patient
    ///
    /// "Not found" is a distinguishable condition, not a decode failure.
    async fn get_patient(&self, patient_id: PatientId) -> Result<PatientRecord, ApiError>;

    /// Fetch patients filtered server-side by insurance plan
    async fn list_patients_by_insurance(
        &self,
        insurance_id: &InsuranceId,
    ) -> Result<Vec<PatientRecord>, ApiError>;

    /// Fetch server-computed aggregate statistics
    async fn statistics(&self) -> Result<ApiStatistics, ApiError>;

    /// Create a new patient
    ///
    /// The server does not guarantee idempotency; re-posting an existing id
    /// yields [`ApiError::DuplicatePatient`], which callers treat as a
    /// recoverable condition.
    async fn create_patient(&self, record: &PatientRecord) -> Result<PatientRecord, ApiError>;
}

/// HTTP implementation of [`PatientDirectory`]
pub struct HttpPatientDirectory {
    base_url: String,
    client: Client,
}

impl HttpPatientDirectory {
    /// Create a new client from configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the underlying HTTP client cannot
    /// be built.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.timeout_seconds.min(30)))
            .build()
            .map_err(|e| {
                MeridianError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Base URL the client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn transport_error(endpoint: &str, err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout(format!("{endpoint}: {err}"))
        } else {
            ApiError::ConnectionFailed(format!("{endpoint}: {err}"))
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Self::transport_error(endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::RequestFailed {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        response.json::<T>().await.map_err(|e| ApiError::DecodeFailed {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl PatientDirectory for HttpPatientDirectory {
    async fn check_health(&self) -> Result<HealthStatus, ApiError> {
        let endpoint = "/health";
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Self::transport_error(endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::ServiceUnavailable {
                status: status.as_u16(),
            });
        }

        let payload: HealthPayload =
            response.json().await.map_err(|e| ApiError::DecodeFailed {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            })?;

        tracing::info!(version = %payload.version, "Patient service is healthy");
        Ok(payload.into())
    }

    async fn list_patients(&self) -> Result<Vec<PatientRecord>, ApiError> {
        let endpoint = "/patients";
        let payloads: Vec<PatientPayload> = self.get_json(endpoint).await?;
        payloads
            .into_iter()
            .map(|p| p.into_domain(endpoint))
            .collect()
    }

    async fn get_patient(&self, patient_id: PatientId) -> Result<PatientRecord, ApiError> {
        let endpoint = format!("/patients/{patient_id}");
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Self::transport_error(&endpoint, e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::PatientNotFound(patient_id));
        }
        if !status.is_success() {
            return Err(ApiError::RequestFailed {
                endpoint,
                status: status.as_u16(),
            });
        }

        let envelope: PatientEnvelope =
            response.json().await.map_err(|e| ApiError::DecodeFailed {
                endpoint: endpoint.clone(),
                message: e.to_string(),
            })?;

        match envelope.into_first() {
            Some(payload) => payload.into_domain(&endpoint),
            None => Err(ApiError::PatientNotFound(patient_id)),
        }
    }

    async fn list_patients_by_insurance(
        &self,
        insurance_id: &InsuranceId,
    ) -> Result<Vec<PatientRecord>, ApiError> {
        let endpoint = format!("/patients/insurance/{insurance_id}");
        let payloads: Vec<PatientPayload> = self.get_json(&endpoint).await?;
        payloads
            .into_iter()
            .map(|p| p.into_domain(&endpoint))
            .collect()
    }

    async fn statistics(&self) -> Result<ApiStatistics, ApiError> {
        let payload: StatsPayload = self.get_json("/stats").await?;
        Ok(payload.into())
    }

    async fn create_patient(&self, record: &PatientRecord) -> Result<PatientRecord, ApiError> {
        let endpoint = "/patients";
        let url = format!("{}{}", self.base_url, endpoint);
        let body = PatientPayload::from_domain(record);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Self::transport_error(endpoint, e))?;

        let status = response.status();
        if status == StatusCode::CONFLICT {
            return Err(ApiError::DuplicatePatient(record.patient_id));
        }
        if !status.is_success() {
            // The service reports duplicate ids as a client error with an
            // explanatory body rather than a clean 409.
            let text = response.text().await.unwrap_or_default();
            if status.is_client_error() && text.to_lowercase().contains("exist") {
                return Err(ApiError::DuplicatePatient(record.patient_id));
            }
            return Err(ApiError::RequestFailed {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let created: CreatedPayload =
            response.json().await.map_err(|e| ApiError::DecodeFailed {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            })?;

        match created.patient.into_first() {
            Some(payload) => payload.into_domain(endpoint),
            None => Err(ApiError::DecodeFailed {
                endpoint: endpoint.to_string(),
                message: "create response contained no patient".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let config = ApiConfig {
            base_url: "http://localhost:8000/".to_string(),
            timeout_seconds: 30,
        };

        let client = HttpPatientDirectory::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
    }
}

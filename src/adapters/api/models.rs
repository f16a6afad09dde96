//! Wire formats for the patient service
//!
//! The service speaks JSON with ISO-8601 date strings. Single-row endpoints
//! may answer with a one-element array or a bare object depending on how the
//! server serializes, so the envelope type accepts both.

use crate::domain::{
    ApiError, ApiStatistics, HealthStatus, InsuranceId, PatientId, PatientRecord,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// `/health` response body
#[derive(Debug, Clone, Deserialize)]
pub struct HealthPayload {
    pub version: String,
}

impl From<HealthPayload> for HealthStatus {
    fn from(payload: HealthPayload) -> Self {
        HealthStatus {
            version: payload.version,
        }
    }
}

/// A patient as the service sends and receives it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientPayload {
    pub patient_id: i64,
    pub name: String,
    pub date_of_birth: String,
    #[serde(default)]
    pub insurance_id: Option<String>,
}

impl PatientPayload {
    /// Builds the POST body for a domain record
    pub fn from_domain(record: &PatientRecord) -> Self {
        Self {
            patient_id: record.patient_id.value(),
            name: record.name.clone(),
            date_of_birth: record.date_of_birth.format("%Y-%m-%d").to_string(),
            insurance_id: record
                .insurance_id
                .as_ref()
                .map(|id| id.as_str().to_string()),
        }
    }

    /// Converts the payload into a domain record
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::DecodeFailed`] when the date of birth is not an
    /// ISO-8601 date or the insurance id is present but blank.
    pub fn into_domain(self, endpoint: &str) -> Result<PatientRecord, ApiError> {
        let date_of_birth =
            NaiveDate::parse_from_str(&self.date_of_birth, "%Y-%m-%d").map_err(|e| {
                ApiError::DecodeFailed {
                    endpoint: endpoint.to_string(),
                    message: format!("invalid date_of_birth '{}': {}", self.date_of_birth, e),
                }
            })?;

        let insurance_id = match self.insurance_id {
            Some(raw) if !raw.trim().is_empty() => {
                Some(
                    InsuranceId::new(raw).map_err(|e| ApiError::DecodeFailed {
                        endpoint: endpoint.to_string(),
                        message: e,
                    })?,
                )
            }
            _ => None,
        };

        Ok(PatientRecord {
            patient_id: PatientId::new(self.patient_id),
            name: self.name,
            date_of_birth,
            insurance_id,
        })
    }
}

/// Single-patient endpoints answer with an array or a bare object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PatientEnvelope {
    Many(Vec<PatientPayload>),
    One(PatientPayload),
}

impl PatientEnvelope {
    /// First patient in the envelope, if any
    pub fn into_first(self) -> Option<PatientPayload> {
        match self {
            PatientEnvelope::Many(mut payloads) => {
                if payloads.is_empty() {
                    None
                } else {
                    Some(payloads.remove(0))
                }
            }
            PatientEnvelope::One(payload) => Some(payload),
        }
    }
}

/// `/stats` response body
#[derive(Debug, Clone, Deserialize)]
pub struct StatsPayload {
    pub total_patients: u64,
    pub avg_age: f64,
}

impl From<StatsPayload> for ApiStatistics {
    fn from(payload: StatsPayload) -> Self {
        ApiStatistics {
            total_patients: payload.total_patients,
            average_age: payload.avg_age,
        }
    }
}

/// `POST /patients` response body
#[derive(Debug, Deserialize)]
pub struct CreatedPayload {
    pub patient: PatientEnvelope,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_into_domain() {
        let payload = PatientPayload {
            patient_id: 1001,
            name: "Alice Nguyen".to_string(),
            date_of_birth: "1980-01-01".to_string(),
            insurance_id: Some("INS001".to_string()),
        };

        let record = payload.into_domain("/patients").unwrap();
        assert_eq!(record.patient_id.value(), 1001);
        assert_eq!(
            record.date_of_birth,
            NaiveDate::from_ymd_opt(1980, 1, 1).unwrap()
        );
        assert_eq!(record.insurance_id.unwrap().as_str(), "INS001");
    }

    #[test]
    fn test_payload_rejects_bad_date() {
        let payload = PatientPayload {
            patient_id: 1001,
            name: "Alice Nguyen".to_string(),
            date_of_birth: "01/01/1980".to_string(),
            insurance_id: None,
        };

        let err = payload.into_domain("/patients").unwrap_err();
        assert!(matches!(err, ApiError::DecodeFailed { .. }));
    }

    #[test]
    fn test_blank_insurance_becomes_none() {
        let payload = PatientPayload {
            patient_id: 1002,
            name: "Bob Okafor".to_string(),
            date_of_birth: "1975-05-05".to_string(),
            insurance_id: Some("  ".to_string()),
        };

        let record = payload.into_domain("/patients").unwrap();
        assert!(record.insurance_id.is_none());
    }

    #[test]
    fn test_envelope_accepts_array_and_object() {
        let from_array: PatientEnvelope = serde_json::from_str(
            r#"[{"patient_id": 1001, "name": "Alice", "date_of_birth": "1980-01-01"}]"#,
        )
        .unwrap();
        assert_eq!(from_array.into_first().unwrap().patient_id, 1001);

        let from_object: PatientEnvelope = serde_json::from_str(
            r#"{"patient_id": 1001, "name": "Alice", "date_of_birth": "1980-01-01"}"#,
        )
        .unwrap();
        assert_eq!(from_object.into_first().unwrap().patient_id, 1001);

        let empty: PatientEnvelope = serde_json::from_str("[]").unwrap();
        assert!(empty.into_first().is_none());
    }

    #[test]
    fn test_from_domain_round_trip() {
        let record = PatientRecord::new(
            PatientId::new(1011),
            "Test Patient",
            NaiveDate::from_ymd_opt(1995, 6, 15).unwrap(),
            Some(InsuranceId::new("INS002").unwrap()),
        );

        let payload = PatientPayload::from_domain(&record);
        assert_eq!(payload.date_of_birth, "1995-06-15");
        assert_eq!(payload.insurance_id.as_deref(), Some("INS002"));
    }
}

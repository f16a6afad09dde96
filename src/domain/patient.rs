//! Patient records and API-side aggregate types
//!
//! [`PatientRecord`] is the entity owned by the external patient service.
//! The pipeline treats it as read-only apart from the demonstration
//! create-then-verify step, which round-trips one new record through the
//! same read path used for bulk fetch.

use crate::domain::ids::{InsuranceId, PatientId};
use chrono::NaiveDate;

/// A patient entity as owned by the external patient service
///
/// Identity (`patient_id`) is the external system's source of truth; the
/// clinical database only ever references it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientRecord {
    /// Unique patient identifier (primary identity)
    pub patient_id: PatientId,

    /// Full patient name
    pub name: String,

    /// Date of birth
    pub date_of_birth: NaiveDate,

    /// Insurance identifier, if the patient is insured
    pub insurance_id: Option<InsuranceId>,
}

impl PatientRecord {
    /// Creates a new patient record
    pub fn new(
        patient_id: PatientId,
        name: impl Into<String>,
        date_of_birth: NaiveDate,
        insurance_id: Option<InsuranceId>,
    ) -> Self {
        Self {
            patient_id,
            name: name.into(),
            date_of_birth,
            insurance_id,
        }
    }
}

/// Result of the patient service health endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthStatus {
    /// Service version as reported by `/health`
    pub version: String,
}

/// Server-computed patient statistics
///
/// Values come from the `/stats` endpoint and are never re-derived locally.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiStatistics {
    /// Total number of patients known to the service
    pub total_patients: u64,

    /// Average patient age in years
    pub average_age: f64,
}

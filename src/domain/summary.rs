//! The reconciled per-patient summary
//!
//! [`PatientSummary`] is the row shape persisted to the `patient_summary`
//! table: every field of the patient record plus the zero-normalized
//! activity counts. Count fields are unsigned on purpose: once a summary
//! exists, "never null, never negative" holds by construction.

use crate::domain::clinical::VisitAggregate;
use crate::domain::ids::{InsuranceId, PatientId};
use crate::domain::patient::PatientRecord;
use chrono::NaiveDate;

/// One patient joined with their clinical activity counts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientSummary {
    pub patient_id: PatientId,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub insurance_id: Option<InsuranceId>,
    pub total_visits: u64,
    pub total_prescriptions: u64,
    pub total_lab_tests: u64,
    pub first_visit: Option<NaiveDate>,
    pub last_visit: Option<NaiveDate>,
}

impl PatientSummary {
    /// Combines a patient record with its matched aggregate
    ///
    /// NULL counts (the SQL engine's way of saying "no rows") and any
    /// negative value coming out of a miscast column both normalize to zero
    /// here, so downstream consumers never have to.
    pub fn from_parts(record: PatientRecord, aggregate: &VisitAggregate) -> Self {
        Self {
            patient_id: record.patient_id,
            name: record.name,
            date_of_birth: record.date_of_birth,
            insurance_id: record.insurance_id,
            total_visits: clamp_count(aggregate.total_visits),
            total_prescriptions: clamp_count(aggregate.total_prescriptions),
            total_lab_tests: clamp_count(aggregate.total_lab_tests),
            first_visit: aggregate.first_visit,
            last_visit: aggregate.last_visit,
        }
    }

    /// Whether this patient has any recorded visit
    pub fn has_visits(&self) -> bool {
        self.total_visits > 0
    }
}

fn clamp_count(value: Option<i64>) -> u64 {
    value.unwrap_or(0).max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64) -> PatientRecord {
        PatientRecord::new(
            PatientId::new(id),
            "Test Patient",
            NaiveDate::from_ymd_opt(1990, 6, 15).unwrap(),
            None,
        )
    }

    #[test]
    fn test_from_parts_with_activity() {
        let aggregate = VisitAggregate {
            patient_id: PatientId::new(1001),
            total_visits: Some(3),
            total_prescriptions: Some(2),
            total_lab_tests: Some(1),
            first_visit: NaiveDate::from_ymd_opt(2024, 1, 10),
            last_visit: NaiveDate::from_ymd_opt(2024, 9, 2),
        };

        let summary = PatientSummary::from_parts(record(1001), &aggregate);

        assert_eq!(summary.total_visits, 3);
        assert_eq!(summary.total_prescriptions, 2);
        assert_eq!(summary.total_lab_tests, 1);
        assert!(summary.has_visits());
    }

    #[test]
    fn test_from_parts_normalizes_null_counts() {
        let aggregate = VisitAggregate {
            patient_id: PatientId::new(1002),
            total_visits: None,
            total_prescriptions: None,
            total_lab_tests: None,
            first_visit: None,
            last_visit: None,
        };

        let summary = PatientSummary::from_parts(record(1002), &aggregate);

        assert_eq!(summary.total_visits, 0);
        assert_eq!(summary.total_prescriptions, 0);
        assert_eq!(summary.total_lab_tests, 0);
        assert!(!summary.has_visits());
    }

    #[test]
    fn test_from_parts_clamps_negative_counts() {
        let aggregate = VisitAggregate {
            patient_id: PatientId::new(1003),
            total_visits: Some(-1),
            total_prescriptions: Some(0),
            total_lab_tests: Some(5),
            first_visit: None,
            last_visit: None,
        };

        let summary = PatientSummary::from_parts(record(1003), &aggregate);

        assert_eq!(summary.total_visits, 0);
        assert_eq!(summary.total_lab_tests, 5);
    }
}

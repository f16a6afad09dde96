//! Cohort statistics over the reconciled summaries

use crate::domain::PatientSummary;

/// Aggregate statistics over one run's merged output
#[derive(Debug, Clone, PartialEq)]
pub struct CohortStats {
    /// Patients with at least one recorded visit
    pub patients_with_visits: usize,

    /// Mean visits per patient
    pub avg_visits: f64,

    /// Mean prescriptions per patient
    pub avg_prescriptions: f64,
}

/// Compute cohort statistics over the merged summaries
///
/// Returns `None` for an empty cohort: "no data" is a defined result here,
/// not a division by zero.
pub fn summarize(summaries: &[PatientSummary]) -> Option<CohortStats> {
    if summaries.is_empty() {
        return None;
    }

    let count = summaries.len() as f64;
    let total_visits: u64 = summaries.iter().map(|s| s.total_visits).sum();
    let total_prescriptions: u64 = summaries.iter().map(|s| s.total_prescriptions).sum();

    Some(CohortStats {
        patients_with_visits: summaries.iter().filter(|s| s.has_visits()).count(),
        avg_visits: total_visits as f64 / count,
        avg_prescriptions: total_prescriptions as f64 / count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PatientId, PatientRecord, VisitAggregate};
    use chrono::NaiveDate;

    fn summary(id: i64, visits: i64, prescriptions: i64) -> PatientSummary {
        let record = PatientRecord::new(
            PatientId::new(id),
            "Test Patient",
            NaiveDate::from_ymd_opt(1985, 3, 20).unwrap(),
            None,
        );
        let aggregate = VisitAggregate {
            patient_id: PatientId::new(id),
            total_visits: Some(visits),
            total_prescriptions: Some(prescriptions),
            total_lab_tests: Some(0),
            first_visit: None,
            last_visit: None,
        };
        PatientSummary::from_parts(record, &aggregate)
    }

    #[test]
    fn test_summarize_empty_is_none() {
        assert_eq!(summarize(&[]), None);
    }

    #[test]
    fn test_summarize_counts_and_averages() {
        let summaries = vec![summary(1001, 3, 2), summary(1002, 0, 0), summary(1003, 1, 4)];

        let stats = summarize(&summaries).unwrap();
        assert_eq!(stats.patients_with_visits, 2);
        assert!((stats.avg_visits - 4.0 / 3.0).abs() < f64::EPSILON);
        assert!((stats.avg_prescriptions - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_summarize_all_zero_cohort() {
        let summaries = vec![summary(1001, 0, 0), summary(1002, 0, 0)];

        let stats = summarize(&summaries).unwrap();
        assert_eq!(stats.patients_with_visits, 0);
        assert_eq!(stats.avg_visits, 0.0);
        assert_eq!(stats.avg_prescriptions, 0.0);
    }
}

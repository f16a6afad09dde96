//! Structured results of one pipeline run
//!
//! The driver returns a [`RunReport`] instead of printing; presentation is
//! the CLI's job. The report carries everything the run observed, including
//! the intermediate clinical reads, so a caller can render or assert on any
//! of it.

use crate::core::reconcile::CohortStats;
use crate::domain::{ApiStatistics, LabResult, PatientId, PatientRecord, Prescription, VisitRecord};
use std::time::Duration;
use uuid::Uuid;

/// Outcome of the best-effort create-then-verify demonstration
#[derive(Debug, Clone, PartialEq)]
pub enum DemoOutcome {
    /// The patient was created; `verified` is true when the follow-up fetch
    /// found it
    Created {
        patient: PatientRecord,
        verified: bool,
    },

    /// The server already knew the id; expected on re-runs
    AlreadyExists(PatientId),

    /// Creation failed for another reason; never fatal to the run
    Failed(String),

    /// The demonstration was skipped (dry run)
    Skipped,
}

/// Everything one pipeline run observed and produced
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Unique id for this run, for log correlation
    pub run_id: Uuid,

    /// Wall-clock duration of the run
    pub duration: Duration,

    /// Whether the write stages were skipped
    pub dry_run: bool,

    /// Patient service version from the health check
    pub api_version: String,

    /// Size of the full patient collection
    pub patients_fetched: usize,

    /// The individually fetched patient
    pub spotlight_patient: PatientRecord,

    /// Patients matching the configured insurance filter
    pub insurance_matches: usize,

    /// Server-computed statistics
    pub api_stats: ApiStatistics,

    /// Most recent visits, bounded by the configured page size
    pub recent_visits: Vec<VisitRecord>,

    /// Prescriptions for the configured patient
    pub prescriptions: Vec<Prescription>,

    /// Lab results for the configured patient set
    pub lab_results: Vec<LabResult>,

    /// Number of per-patient aggregates the grouped query produced
    pub aggregates_fetched: usize,

    /// Cohort statistics over the merged output; `None` when the cohort is
    /// empty
    pub cohort: Option<CohortStats>,

    /// Rows written by the summary replace; `None` on dry run
    pub summaries_written: Option<u64>,

    /// Row count read back after the write; `None` on dry run
    pub rows_verified: Option<u64>,

    /// Result of the create demonstration
    pub demo: DemoOutcome,
}

impl RunReport {
    /// True when the verification count matches the rows written
    ///
    /// A dry run is trivially consistent: nothing was written, nothing was
    /// verified.
    pub fn is_consistent(&self) -> bool {
        match (self.summaries_written, self.rows_verified) {
            (Some(written), Some(verified)) => written == verified,
            (None, None) => true,
            _ => false,
        }
    }

    /// Log the run outcome as one structured record
    pub fn log_summary(&self) {
        tracing::info!(
            run_id = %self.run_id,
            duration_secs = self.duration.as_secs(),
            dry_run = self.dry_run,
            api_version = %self.api_version,
            patients = self.patients_fetched,
            aggregates = self.aggregates_fetched,
            written = self.summaries_written,
            verified = self.rows_verified,
            consistent = self.is_consistent(),
            "Pipeline run completed"
        );

        if let Some(cohort) = &self.cohort {
            tracing::info!(
                patients_with_visits = cohort.patients_with_visits,
                avg_visits = format!("{:.2}", cohort.avg_visits),
                avg_prescriptions = format!("{:.2}", cohort.avg_prescriptions),
                "Cohort statistics"
            );
        }

        match &self.demo {
            DemoOutcome::Created { patient, verified } => tracing::info!(
                patient_id = %patient.patient_id,
                verified = verified,
                "Demonstration patient created"
            ),
            DemoOutcome::AlreadyExists(id) => tracing::info!(
                patient_id = %id,
                "Demonstration patient already exists"
            ),
            DemoOutcome::Failed(reason) => tracing::warn!(
                reason = %reason,
                "Demonstration create failed"
            ),
            DemoOutcome::Skipped => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn base_report() -> RunReport {
        RunReport {
            run_id: Uuid::new_v4(),
            duration: Duration::from_secs(2),
            dry_run: false,
            api_version: "1.0.0".to_string(),
            patients_fetched: 10,
            spotlight_patient: PatientRecord::new(
                PatientId::new(1001),
                "Alice",
                NaiveDate::from_ymd_opt(1980, 1, 1).unwrap(),
                None,
            ),
            insurance_matches: 4,
            api_stats: ApiStatistics {
                total_patients: 10,
                average_age: 44.5,
            },
            recent_visits: Vec::new(),
            prescriptions: Vec::new(),
            lab_results: Vec::new(),
            aggregates_fetched: 8,
            cohort: None,
            summaries_written: Some(10),
            rows_verified: Some(10),
            demo: DemoOutcome::Skipped,
        }
    }

    #[test]
    fn test_consistent_when_counts_match() {
        assert!(base_report().is_consistent());
    }

    #[test]
    fn test_inconsistent_when_counts_differ() {
        let mut report = base_report();
        report.rows_verified = Some(9);
        assert!(!report.is_consistent());
    }

    #[test]
    fn test_dry_run_is_consistent() {
        let mut report = base_report();
        report.dry_run = true;
        report.summaries_written = None;
        report.rows_verified = None;
        assert!(report.is_consistent());
    }

    #[test]
    fn test_half_finished_write_is_inconsistent() {
        let mut report = base_report();
        report.rows_verified = None;
        assert!(!report.is_consistent());
    }
}

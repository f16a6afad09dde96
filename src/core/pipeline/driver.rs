//! Pipeline driver
//!
//! Runs the reconciliation stages strictly in sequence: health gate, the
//! four API reads, the four database reads, merge, persist-and-verify, and
//! the best-effort create demonstration. Every stage is a hard dependency
//! on the previous one succeeding except the demonstration, which reports
//! failure instead of propagating it.

use crate::adapters::api::PatientDirectory;
use crate::adapters::postgres::ClinicalStore;
use crate::config::PipelineConfig;
use crate::core::pipeline::report::{DemoOutcome, RunReport};
use crate::core::reconcile::{merge, summarize};
use crate::domain::{
    ApiError, InsuranceId, MeridianError, PatientId, PatientRecord, Result,
};
use std::time::Instant;
use uuid::Uuid;

/// Orchestrates one reconciliation run
///
/// Owns both adapters for the duration of the run; dropping the driver
/// releases the HTTP client and the connection pool on every exit path,
/// including an early abort.
pub struct PipelineDriver<D, S> {
    directory: D,
    store: S,
    pipeline: PipelineConfig,
    dry_run: bool,
}

impl<D: PatientDirectory, S: ClinicalStore> PipelineDriver<D, S> {
    /// Create a new driver over the two adapters
    pub fn new(directory: D, store: S, pipeline: PipelineConfig, dry_run: bool) -> Self {
        Self {
            directory,
            store,
            pipeline,
            dry_run,
        }
    }

    /// Execute the pipeline and return the structured run report
    ///
    /// # Errors
    ///
    /// Returns the first fatal stage failure; the error names the endpoint
    /// or query that failed. The create demonstration never produces an
    /// error from here.
    pub async fn run(&self) -> Result<RunReport> {
        let run_id = Uuid::new_v4();
        let started = Instant::now();
        tracing::info!(run_id = %run_id, dry_run = self.dry_run, "Starting pipeline run");

        // Stage 1: health gate. Nothing else may run if this fails.
        tracing::info!(stage = "health_check", "Checking patient service health");
        let health = self.directory.check_health().await?;

        // Stage 2: API reads.
        tracing::info!(stage = "api_reads", "Fetching patient data from API");
        let patients = self.directory.list_patients().await?;
        tracing::info!(count = patients.len(), "Fetched patient collection");

        let spotlight_patient = self
            .directory
            .get_patient(PatientId::new(self.pipeline.spotlight_patient_id))
            .await?;

        let insurance_filter = InsuranceId::new(self.pipeline.insurance_filter.clone())
            .map_err(MeridianError::Configuration)?;
        let insured = self
            .directory
            .list_patients_by_insurance(&insurance_filter)
            .await?;
        tracing::info!(
            insurance_id = %insurance_filter,
            count = insured.len(),
            "Fetched patients by insurance"
        );

        let api_stats = self.directory.statistics().await?;
        tracing::info!(
            total_patients = api_stats.total_patients,
            average_age = api_stats.average_age,
            "Fetched service statistics"
        );

        // Stage 3: database reads. Independent of stage 2 but sequenced
        // after it; there is no parallel fan-out anywhere in the run.
        tracing::info!(stage = "database_reads", "Querying clinical tables");
        let recent_visits = self
            .store
            .recent_visits(self.pipeline.recent_visits_limit)
            .await?;

        let prescriptions = self
            .store
            .prescriptions_for_patient(PatientId::new(self.pipeline.prescriptions_patient_id))
            .await?;

        let lab_patient_ids: Vec<PatientId> = self
            .pipeline
            .lab_patient_ids
            .iter()
            .copied()
            .map(PatientId::new)
            .collect();
        let lab_results = self
            .store
            .lab_results_for_patients(&lab_patient_ids)
            .await?;

        let aggregates = self.store.visit_aggregates().await?;
        tracing::info!(
            visits = recent_visits.len(),
            prescriptions = prescriptions.len(),
            lab_results = lab_results.len(),
            aggregates = aggregates.len(),
            "Clinical reads complete"
        );

        // Stage 4: reconcile.
        tracing::info!(stage = "reconcile", "Merging patients with activity aggregates");
        let patients_fetched = patients.len();
        let aggregates_fetched = aggregates.len();
        let summaries = merge(patients, aggregates);
        let cohort = summarize(&summaries);

        // Stage 5: persist and verify.
        let (summaries_written, rows_verified) = if self.dry_run {
            tracing::info!(
                stage = "persist",
                count = summaries.len(),
                "DRY RUN: skipping summary replace"
            );
            (None, None)
        } else {
            tracing::info!(
                stage = "persist",
                table = %self.pipeline.summary_table,
                count = summaries.len(),
                "Replacing summary table"
            );
            let written = self
                .store
                .replace_summary(&self.pipeline.summary_table, &summaries)
                .await?;
            let verified = self.store.count_rows(&self.pipeline.summary_table).await?;
            if written != verified {
                tracing::warn!(
                    written = written,
                    verified = verified,
                    "Verification count does not match rows written"
                );
            }
            (Some(written), Some(verified))
        };

        // Stage 6: best-effort create demonstration.
        let demo = if self.dry_run {
            DemoOutcome::Skipped
        } else {
            self.create_demo_patient().await
        };

        let report = RunReport {
            run_id,
            duration: started.elapsed(),
            dry_run: self.dry_run,
            api_version: health.version,
            patients_fetched,
            spotlight_patient,
            insurance_matches: insured.len(),
            api_stats,
            recent_visits,
            prescriptions,
            lab_results,
            aggregates_fetched,
            cohort,
            summaries_written,
            rows_verified,
            demo,
        };
        report.log_summary();
        Ok(report)
    }

    /// Post the configured demonstration patient and re-fetch it
    ///
    /// Duplicates are expected on re-runs; every failure here is reported in
    /// the outcome rather than propagated.
    async fn create_demo_patient(&self) -> DemoOutcome {
        let demo = &self.pipeline.demo_patient;
        let insurance_id = demo
            .insurance_id
            .as_ref()
            .and_then(|raw| InsuranceId::new(raw.clone()).ok());
        let record = PatientRecord::new(
            PatientId::new(demo.patient_id),
            demo.name.clone(),
            demo.date_of_birth,
            insurance_id,
        );

        tracing::info!(stage = "create_demo", patient_id = %record.patient_id, "Creating demonstration patient");
        match self.directory.create_patient(&record).await {
            Ok(created) => match self.directory.get_patient(created.patient_id).await {
                Ok(fetched) => DemoOutcome::Created {
                    patient: fetched,
                    verified: true,
                },
                Err(e) => {
                    tracing::warn!(error = %e, "Created patient but re-fetch failed");
                    DemoOutcome::Created {
                        patient: created,
                        verified: false,
                    }
                }
            },
            Err(ApiError::DuplicatePatient(id)) => {
                tracing::info!(patient_id = %id, "Demonstration patient already exists");
                DemoOutcome::AlreadyExists(id)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Demonstration create failed");
                DemoOutcome::Failed(e.to_string())
            }
        }
    }
}

//! Run command implementation
//!
//! Builds the two adapters from configuration, executes one pipeline run,
//! and renders the structured report. Rendering lives here: the pipeline
//! core returns data, not text.

use crate::adapters::api::HttpPatientDirectory;
use crate::adapters::postgres::{PostgresClient, PostgresStore};
use crate::config::load_config;
use crate::core::pipeline::{DemoOutcome, PipelineDriver, RunReport};
use clap::Args;

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Simulate the run without writing to the database
    #[arg(long)]
    pub dry_run: bool,
}

impl RunArgs {
    /// Execute the run command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting run command");

        let mut config = match load_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Configuration error: {e}");
                return Ok(2);
            }
        };

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        if config.application.dry_run {
            println!("DRY RUN MODE - no data will be written to the database");
            println!();
        }

        let directory = HttpPatientDirectory::new(&config.api)?;

        let client = match PostgresClient::new(&config.database) {
            Ok(client) => client,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create database pool");
                eprintln!("Failed to initialize database: {e}");
                return Ok(4);
            }
        };

        // ConnectionError gate: fail before any query runs.
        if let Err(e) = client.test_connection().await {
            tracing::error!(error = %e, "Database unreachable");
            eprintln!("Database unreachable: {e}");
            return Ok(4);
        }

        let store = PostgresStore::new(client);
        let driver = PipelineDriver::new(
            directory,
            store,
            config.pipeline.clone(),
            config.application.dry_run,
        );

        match driver.run().await {
            Ok(report) => {
                print_report(&report);
                Ok(0)
            }
            Err(e) => {
                tracing::error!(error = %e, "Pipeline run failed");
                eprintln!("Pipeline run failed: {e}");
                Ok(1)
            }
        }
    }
}

fn print_report(report: &RunReport) {
    println!("=== Pipeline run {} ===", report.run_id);
    println!();
    println!("Patient service");
    println!("  Version:            {}", report.api_version);
    println!("  Patients fetched:   {}", report.patients_fetched);
    println!(
        "  Spotlight patient:  {} ({})",
        report.spotlight_patient.name, report.spotlight_patient.patient_id
    );
    println!("  Insurance matches:  {}", report.insurance_matches);
    println!(
        "  Service statistics: {} patients, average age {:.1}",
        report.api_stats.total_patients, report.api_stats.average_age
    );
    println!();

    println!("Clinical store");
    println!("  Recent visits ({}):", report.recent_visits.len());
    for visit in &report.recent_visits {
        println!(
            "    {}  patient {}  {}  {}",
            visit.visit_date, visit.patient_id, visit.provider_name, visit.diagnosis_code
        );
    }
    println!("  Prescriptions ({}):", report.prescriptions.len());
    for prescription in &report.prescriptions {
        println!(
            "    {}  {} {} ({})",
            prescription.start_date,
            prescription.medication_name,
            prescription.dosage,
            prescription.frequency
        );
    }
    println!("  Lab results ({}):", report.lab_results.len());
    for lab in &report.lab_results {
        println!(
            "    {}  patient {}  {}: {} {} (normal {})",
            lab.test_date,
            lab.patient_id,
            lab.test_name,
            lab.test_value,
            lab.test_unit,
            lab.normal_range
        );
    }
    println!("  Activity aggregates: {}", report.aggregates_fetched);
    println!();

    println!("Reconciliation");
    match &report.cohort {
        Some(cohort) => {
            println!(
                "  Patients with visits:      {}/{}",
                cohort.patients_with_visits, report.patients_fetched
            );
            println!("  Average visits:            {:.2}", cohort.avg_visits);
            println!(
                "  Average prescriptions:     {:.2}",
                cohort.avg_prescriptions
            );
        }
        None => println!("  No patients in cohort"),
    }

    match (report.summaries_written, report.rows_verified) {
        (Some(written), Some(verified)) => {
            println!("  Summary rows written:      {written}");
            println!("  Summary rows verified:     {verified}");
            if report.is_consistent() {
                println!("  ✅ Write verified");
            } else {
                println!("  ❌ Verification mismatch");
            }
        }
        _ => println!("  Summary write skipped (dry run)"),
    }
    println!();

    match &report.demo {
        DemoOutcome::Created { patient, verified } => {
            if *verified {
                println!(
                    "Demonstration: created and verified patient {} ({})",
                    patient.name, patient.patient_id
                );
            } else {
                println!(
                    "Demonstration: created patient {} but re-fetch failed",
                    patient.patient_id
                );
            }
        }
        DemoOutcome::AlreadyExists(id) => {
            println!("Demonstration: patient {id} already exists (expected on re-runs)");
        }
        DemoOutcome::Failed(reason) => {
            println!("Demonstration: create failed: {reason}");
        }
        DemoOutcome::Skipped => {
            println!("Demonstration: skipped");
        }
    }
    println!();
    println!("Completed in {:.2}s", report.duration.as_secs_f64());
}

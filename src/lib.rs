// Meridian - Patient Record Reconciliation Pipeline
// Copyright (c) 2025 Meridian Contributors
// Licensed under the MIT License

//! # Meridian - Patient Record Reconciliation Pipeline
//!
//! Meridian reconciles patient records from an external HTTP patient service
//! with clinical activity stored in PostgreSQL, and persists a combined
//! per-patient summary back to the database.
//!
//! ## Overview
//!
//! One run performs a single sequential pass:
//!
//! 1. **Health gate** - the patient service must answer before anything runs
//! 2. **API reads** - the full patient collection, one spotlight patient, a
//!    server-side insurance filter, and service statistics
//! 3. **Database reads** - recent visits, one patient's prescriptions, lab
//!    results for a fixed id set, and the grouped per-patient activity
//!    aggregates
//! 4. **Reconcile** - left-join patients with aggregates; missing activity
//!    becomes zero, never null
//! 5. **Persist** - replace the `patient_summary` table transactionally and
//!    verify the row count
//! 6. **Demonstrate** - best-effort create-then-verify of one new patient
//!
//! ## Architecture
//!
//! Meridian follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (reconcile, pipeline driver, run report)
//! - [`adapters`] - External integrations (patient API, PostgreSQL)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use meridian::adapters::api::HttpPatientDirectory;
//! use meridian::adapters::postgres::{PostgresClient, PostgresStore};
//! use meridian::config::load_config;
//! use meridian::core::pipeline::PipelineDriver;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("meridian.toml")?;
//!
//!     let directory = HttpPatientDirectory::new(&config.api)?;
//!     let client = PostgresClient::new(&config.database)?;
//!     client.test_connection().await?;
//!     let store = PostgresStore::new(client);
//!
//!     let driver = PipelineDriver::new(directory, store, config.pipeline.clone(), false);
//!     let report = driver.run().await?;
//!
//!     println!("Wrote {:?} summary rows", report.summaries_written);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Meridian uses the [`domain::MeridianError`] type for all errors. Stage
//! failures are fatal to the run and name the endpoint or query that failed;
//! the only recoverable condition is the demonstration create conflict:
//!
//! ```rust
//! use meridian::domain::{ApiError, MeridianError, PatientId};
//!
//! let err: MeridianError = ApiError::DuplicatePatient(PatientId::new(1011)).into();
//! assert!(matches!(err, MeridianError::Api(ApiError::DuplicatePatient(_))));
//! ```
//!
//! ## Logging
//!
//! Meridian uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn};
//!
//! info!(stage = "reconcile", "Merging patients with activity aggregates");
//! warn!(written = 10, verified = 9, "Verification count does not match rows written");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;

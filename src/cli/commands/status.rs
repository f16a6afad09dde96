//! Status command implementation
//!
//! Probes both external collaborators without running the pipeline.

use crate::adapters::api::{HttpPatientDirectory, PatientDirectory};
use crate::adapters::postgres::PostgresClient;
use crate::config::load_config;
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Configuration error: {e}");
                return Ok(2);
            }
        };

        let mut healthy = true;

        let directory = HttpPatientDirectory::new(&config.api)?;
        match directory.check_health().await {
            Ok(status) => {
                println!("✅ Patient service reachable (version {})", status.version);
            }
            Err(e) => {
                println!("❌ Patient service: {e}");
                healthy = false;
            }
        }

        match PostgresClient::new(&config.database) {
            Ok(client) => match client.test_connection().await {
                Ok(()) => println!("✅ Database reachable ({})", client.redacted_target()),
                Err(e) => {
                    println!("❌ Database: {e}");
                    healthy = false;
                }
            },
            Err(e) => {
                println!("❌ Database: {e}");
                healthy = false;
            }
        }

        Ok(if healthy { 0 } else { 4 })
    }
}

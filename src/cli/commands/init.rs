//! Init command implementation
//!
//! Generates a sample configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "meridian.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        match fs::write(&self.output, sample_config()) {
            Ok(()) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Set MERIDIAN_DB_PASSWORD in your environment or .env file");
                println!("  3. Validate configuration: meridian validate-config");
                println!("  4. Check connectivity:     meridian status");
                println!("  5. Run the pipeline:       meridian run");
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }
}

fn sample_config() -> &'static str {
    r#"# Meridian Configuration File
# Patient record reconciliation pipeline

[application]
log_level = "info"
dry_run = false

[api]
base_url = "http://localhost:8000"
timeout_seconds = 30

[database]
host = "localhost"
port = 5432
dbname = "healthcare"
user = "healthuser"
password = "${MERIDIAN_DB_PASSWORD}"
max_connections = 4
connection_timeout_seconds = 30
statement_timeout_seconds = 60

[pipeline]
summary_table = "patient_summary"
recent_visits_limit = 5
spotlight_patient_id = 1001
prescriptions_patient_id = 1002
lab_patient_ids = [1001, 1002]
insurance_filter = "INS001"

[pipeline.demo_patient]
patient_id = 1011
name = "Test Patient"
date_of_birth = "1995-06-15"
insurance_id = "INS002"

[logging]
local_enabled = false
local_path = "logs"
local_rotation = "daily"
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_config_parses_and_validates() {
        let substituted = sample_config().replace("${MERIDIAN_DB_PASSWORD}", "healthpass");
        let config: crate::config::MeridianConfig = toml::from_str(&substituted).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.pipeline.summary_table, "patient_summary");
    }
}

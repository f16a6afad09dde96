//! Validate-config command implementation

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config = config_path, "Validating configuration");

        match load_config(config_path) {
            Ok(config) => {
                println!("✅ Configuration is valid: {config_path}");
                println!("  API base URL:  {}", config.api.base_url);
                println!(
                    "  Database:      {}@{}:{}/{}",
                    config.database.user,
                    config.database.host,
                    config.database.port,
                    config.database.dbname
                );
                println!("  Summary table: {}", config.pipeline.summary_table);
                Ok(0)
            }
            Err(e) => {
                tracing::error!(error = %e, "Configuration validation failed");
                eprintln!("❌ {e}");
                Ok(2)
            }
        }
    }
}

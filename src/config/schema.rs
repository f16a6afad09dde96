//! Configuration schema types
//!
//! This module defines the configuration structure that maps to the
//! `meridian.toml` file. Connection parameters and the pipeline's fixed
//! constants are all externally supplied; there is no hidden state.

use crate::config::secret::{SecretString, SecretValue};
use chrono::NaiveDate;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

/// Main Meridian configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeridianConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Patient API configuration
    pub api: ApiConfig,

    /// Clinical database configuration
    pub database: DatabaseConfig,

    /// Pipeline constants
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MeridianConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid value found.
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.api.validate()?;
        self.database.validate()?;
        self.pipeline.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (skip the summary write and the create demonstration)
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Patient API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the patient service
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_api_timeout")]
    pub timeout_seconds: u64,
}

impl ApiConfig {
    fn validate(&self) -> Result<(), String> {
        url::Url::parse(&self.base_url)
            .map_err(|e| format!("Invalid api.base_url '{}': {}", self.base_url, e))?;
        if self.timeout_seconds == 0 {
            return Err("api.timeout_seconds must be greater than zero".to_string());
        }
        Ok(())
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_seconds: default_api_timeout(),
        }
    }
}

/// Clinical database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database host
    pub host: String,

    /// Database port
    #[serde(default = "default_db_port")]
    pub port: u16,

    /// Database name
    pub dbname: String,

    /// Database user
    pub user: String,

    /// Database password
    /// Stored securely in memory and automatically zeroized on drop
    pub password: SecretString,

    /// Maximum pool size
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,

    /// Timeout for acquiring a connection, in seconds
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout_seconds: u64,

    /// Per-statement timeout, in seconds
    #[serde(default = "default_statement_timeout")]
    pub statement_timeout_seconds: u64,
}

impl DatabaseConfig {
    fn validate(&self) -> Result<(), String> {
        if self.host.trim().is_empty() {
            return Err("database.host must not be empty".to_string());
        }
        if self.dbname.trim().is_empty() {
            return Err("database.dbname must not be empty".to_string());
        }
        if self.user.trim().is_empty() {
            return Err("database.user must not be empty".to_string());
        }
        if self.password.expose_secret().is_empty() {
            return Err("database.password must not be empty".to_string());
        }
        if self.max_connections == 0 {
            return Err("database.max_connections must be greater than zero".to_string());
        }
        Ok(())
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: default_db_port(),
            dbname: "healthcare".to_string(),
            user: "healthuser".to_string(),
            password: Secret::new(SecretValue::from(String::new())),
            max_connections: default_max_connections(),
            connection_timeout_seconds: default_connection_timeout(),
            statement_timeout_seconds: default_statement_timeout(),
        }
    }
}

/// Pipeline constants
///
/// The ids and limits the run uses are deployment facts, not code: which
/// patient to spotlight, which insurance plan to filter on, where the
/// reconciled summary lands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Name of the table the reconciled summary replaces on every run
    #[serde(default = "default_summary_table")]
    pub summary_table: String,

    /// Page size for the recent-visits read
    #[serde(default = "default_recent_visits_limit")]
    pub recent_visits_limit: i64,

    /// Patient fetched individually during the API stage
    #[serde(default = "default_spotlight_patient")]
    pub spotlight_patient_id: i64,

    /// Patient whose prescriptions are read during the database stage
    #[serde(default = "default_prescriptions_patient")]
    pub prescriptions_patient_id: i64,

    /// Patients whose lab results are read during the database stage
    #[serde(default = "default_lab_patients")]
    pub lab_patient_ids: Vec<i64>,

    /// Insurance plan used for the server-side filter read
    #[serde(default = "default_insurance_filter")]
    pub insurance_filter: String,

    /// Patient used by the best-effort create demonstration
    #[serde(default)]
    pub demo_patient: DemoPatientConfig,
}

impl PipelineConfig {
    fn validate(&self) -> Result<(), String> {
        if !is_bare_identifier(&self.summary_table) {
            return Err(format!(
                "pipeline.summary_table '{}' must be a bare SQL identifier",
                self.summary_table
            ));
        }
        if self.recent_visits_limit <= 0 {
            return Err("pipeline.recent_visits_limit must be greater than zero".to_string());
        }
        if self.lab_patient_ids.is_empty() {
            return Err("pipeline.lab_patient_ids must name at least one patient".to_string());
        }
        if self.insurance_filter.trim().is_empty() {
            return Err("pipeline.insurance_filter must not be empty".to_string());
        }
        if self.demo_patient.name.trim().is_empty() {
            return Err("pipeline.demo_patient.name must not be empty".to_string());
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            summary_table: default_summary_table(),
            recent_visits_limit: default_recent_visits_limit(),
            spotlight_patient_id: default_spotlight_patient(),
            prescriptions_patient_id: default_prescriptions_patient(),
            lab_patient_ids: default_lab_patients(),
            insurance_filter: default_insurance_filter(),
            demo_patient: DemoPatientConfig::default(),
        }
    }
}

/// Patient record the create demonstration posts on each run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoPatientConfig {
    pub patient_id: i64,
    pub name: String,
    pub date_of_birth: NaiveDate,
    #[serde(default)]
    pub insurance_id: Option<String>,
}

impl Default for DemoPatientConfig {
    fn default() -> Self {
        Self {
            patient_id: 1011,
            name: "Test Patient".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1995, 6, 15).expect("valid literal date"),
            insurance_id: Some("INS002".to_string()),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write JSON logs to a rolling file in addition to the console
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for rolling log files
    #[serde(default = "default_log_path")]
    pub local_path: String,

    /// Rotation schedule (daily or hourly)
    #[serde(default = "default_log_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        if !["daily", "hourly"].contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be 'daily' or 'hourly'",
                self.local_rotation
            ));
        }
        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path must not be empty when file logging is on".to_string());
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_log_path(),
            local_rotation: default_log_rotation(),
        }
    }
}

/// True when `name` is usable as an unquoted SQL identifier
pub fn is_bare_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_api_timeout() -> u64 {
    30
}

fn default_db_port() -> u16 {
    5432
}

fn default_max_connections() -> usize {
    4
}

fn default_connection_timeout() -> u64 {
    30
}

fn default_statement_timeout() -> u64 {
    60
}

fn default_summary_table() -> String {
    "patient_summary".to_string()
}

fn default_recent_visits_limit() -> i64 {
    5
}

fn default_spotlight_patient() -> i64 {
    1001
}

fn default_prescriptions_patient() -> i64 {
    1002
}

fn default_lab_patients() -> Vec<i64> {
    vec![1001, 1002]
}

fn default_insurance_filter() -> String {
    "INS001".to_string()
}

fn default_log_path() -> String {
    "logs".to_string()
}

fn default_log_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> MeridianConfig {
        MeridianConfig {
            application: ApplicationConfig::default(),
            api: ApiConfig::default(),
            database: DatabaseConfig {
                password: Secret::new(SecretValue::from("healthpass".to_string())),
                ..DatabaseConfig::default()
            },
            pipeline: PipelineConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let mut config = valid_config();
        config.application.log_level = "verbose".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.contains("log_level"));
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let mut config = valid_config();
        config.api.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_password_rejected() {
        let mut config = valid_config();
        config.database.password = Secret::new(SecretValue::from(String::new()));
        let err = config.validate().unwrap_err();
        assert!(err.contains("password"));
    }

    #[test]
    fn test_summary_table_must_be_bare_identifier() {
        let mut config = valid_config();
        config.pipeline.summary_table = "patient_summary; DROP TABLE visits".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_is_bare_identifier() {
        assert!(is_bare_identifier("patient_summary"));
        assert!(is_bare_identifier("_staging2"));
        assert!(!is_bare_identifier("2fast"));
        assert!(!is_bare_identifier("Patient"));
        assert!(!is_bare_identifier(""));
        assert!(!is_bare_identifier("a b"));
    }

    #[test]
    fn test_pipeline_defaults_match_deployment() {
        let pipeline = PipelineConfig::default();
        assert_eq!(pipeline.summary_table, "patient_summary");
        assert_eq!(pipeline.recent_visits_limit, 5);
        assert_eq!(pipeline.lab_patient_ids, vec![1001, 1002]);
        assert_eq!(pipeline.demo_patient.patient_id, 1011);
    }

    #[test]
    fn test_invalid_rotation_rejected() {
        let mut config = valid_config();
        config.logging.local_rotation = "weekly".to_string();
        assert!(config.validate().is_err());
    }
}

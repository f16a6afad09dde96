//! Integration tests for configuration loading

use meridian::config::load_config;
use meridian::domain::MeridianError;
use secrecy::ExposeSecret;
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

// load_config reads process-wide environment state; serialize the tests
// that depend on it.
static ENV_LOCK: Mutex<()> = Mutex::new(());

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const VALID_CONFIG: &str = r#"
[application]
log_level = "info"

[api]
base_url = "http://localhost:8000"
timeout_seconds = 10

[database]
host = "localhost"
port = 5432
dbname = "healthcare"
user = "healthuser"
password = "healthpass"

[pipeline]
summary_table = "patient_summary"
insurance_filter = "INS001"
"#;

#[test]
fn test_load_valid_config() {
    let _env = ENV_LOCK.lock().unwrap();
    let file = write_config(VALID_CONFIG);

    let config = load_config(file.path()).unwrap();

    assert_eq!(config.api.base_url, "http://localhost:8000");
    assert_eq!(config.database.dbname, "healthcare");
    assert_eq!(
        config.database.password.expose_secret().as_ref(),
        "healthpass"
    );
    // Unspecified pipeline keys fall back to their defaults.
    assert_eq!(config.pipeline.recent_visits_limit, 5);
    assert_eq!(config.pipeline.demo_patient.patient_id, 1011);
}

#[test]
fn test_env_substitution() {
    let _env = ENV_LOCK.lock().unwrap();
    std::env::set_var("MERIDIAN_TEST_PG_PASSWORD", "from-env");
    let contents = VALID_CONFIG.replace(
        "password = \"healthpass\"",
        "password = \"${MERIDIAN_TEST_PG_PASSWORD}\"",
    );
    let file = write_config(&contents);

    let config = load_config(file.path()).unwrap();
    assert_eq!(
        config.database.password.expose_secret().as_ref(),
        "from-env"
    );
    std::env::remove_var("MERIDIAN_TEST_PG_PASSWORD");
}

#[test]
fn test_missing_env_var_is_reported() {
    let _env = ENV_LOCK.lock().unwrap();
    let contents = VALID_CONFIG.replace(
        "password = \"healthpass\"",
        "password = \"${MERIDIAN_TEST_UNSET_PASSWORD}\"",
    );
    let file = write_config(&contents);

    let err = load_config(file.path()).unwrap_err();
    match err {
        MeridianError::Configuration(msg) => {
            assert!(msg.contains("MERIDIAN_TEST_UNSET_PASSWORD"));
        }
        other => panic!("expected configuration error, got {other}"),
    }
}

#[test]
fn test_env_override_wins() {
    let _env = ENV_LOCK.lock().unwrap();
    std::env::set_var("MERIDIAN_PIPELINE_SUMMARY_TABLE", "patient_summary_v2");
    let file = write_config(VALID_CONFIG);

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.pipeline.summary_table, "patient_summary_v2");
    std::env::remove_var("MERIDIAN_PIPELINE_SUMMARY_TABLE");
}

#[test]
fn test_validation_rejects_bad_log_level() {
    let _env = ENV_LOCK.lock().unwrap();
    let contents = VALID_CONFIG.replace("log_level = \"info\"", "log_level = \"loud\"");
    let file = write_config(&contents);

    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("log_level"));
}

#[test]
fn test_validation_rejects_injectable_table_name() {
    let _env = ENV_LOCK.lock().unwrap();
    let contents = VALID_CONFIG.replace(
        "summary_table = \"patient_summary\"",
        "summary_table = \"patient_summary; DROP TABLE visits\"",
    );
    let file = write_config(&contents);

    assert!(load_config(file.path()).is_err());
}

#[test]
fn test_missing_file_is_configuration_error() {
    let err = load_config("/definitely/not/here/meridian.toml").unwrap_err();
    assert!(matches!(err, MeridianError::Configuration(_)));
}

//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::MeridianConfig;
use super::secret::SecretValue;
use crate::domain::errors::MeridianError;
use crate::domain::result::Result;
use regex::Regex;
use secrecy::Secret;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into [`MeridianConfig`]
/// 4. Applies environment variable overrides (`MERIDIAN_*` prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if the file cannot be read, a referenced environment
/// variable is unset, TOML parsing fails, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use meridian::config::load_config;
///
/// let config = load_config("meridian.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<MeridianConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MeridianError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        MeridianError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: MeridianConfig = toml::from_str(&contents)
        .map_err(|e| MeridianError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        MeridianError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format `${VAR_NAME}`
///
/// Comment lines are passed through untouched. All missing variables are
/// collected and reported together.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("valid literal regex");
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        let trimmed = line.trim_start();

        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(MeridianError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the `MERIDIAN_*` prefix
///
/// Variables follow the pattern `MERIDIAN_<SECTION>_<KEY>`, for example
/// `MERIDIAN_API_BASE_URL` or `MERIDIAN_DATABASE_PASSWORD`.
fn apply_env_overrides(config: &mut MeridianConfig) {
    if let Ok(val) = std::env::var("MERIDIAN_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("MERIDIAN_APPLICATION_DRY_RUN") {
        config.application.dry_run = val.parse().unwrap_or(false);
    }

    if let Ok(val) = std::env::var("MERIDIAN_API_BASE_URL") {
        config.api.base_url = val;
    }
    if let Ok(val) = std::env::var("MERIDIAN_API_TIMEOUT_SECONDS") {
        if let Ok(parsed) = val.parse() {
            config.api.timeout_seconds = parsed;
        }
    }

    if let Ok(val) = std::env::var("MERIDIAN_DATABASE_HOST") {
        config.database.host = val;
    }
    if let Ok(val) = std::env::var("MERIDIAN_DATABASE_PORT") {
        if let Ok(parsed) = val.parse() {
            config.database.port = parsed;
        }
    }
    if let Ok(val) = std::env::var("MERIDIAN_DATABASE_DBNAME") {
        config.database.dbname = val;
    }
    if let Ok(val) = std::env::var("MERIDIAN_DATABASE_USER") {
        config.database.user = val;
    }
    if let Ok(val) = std::env::var("MERIDIAN_DATABASE_PASSWORD") {
        config.database.password = Secret::new(SecretValue::from(val));
    }

    if let Ok(val) = std::env::var("MERIDIAN_PIPELINE_SUMMARY_TABLE") {
        config.pipeline.summary_table = val;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitute_known_var() {
        std::env::set_var("MERIDIAN_TEST_SUBST_VAR", "resolved");
        let output = substitute_env_vars("value = \"${MERIDIAN_TEST_SUBST_VAR}\"").unwrap();
        assert_eq!(output, "value = \"resolved\"\n");
        std::env::remove_var("MERIDIAN_TEST_SUBST_VAR");
    }

    #[test]
    fn test_substitute_missing_var_is_reported() {
        let err = substitute_env_vars("value = \"${MERIDIAN_TEST_DEFINITELY_UNSET}\"").unwrap_err();
        assert!(err
            .to_string()
            .contains("MERIDIAN_TEST_DEFINITELY_UNSET"));
    }

    #[test]
    fn test_substitute_skips_comments() {
        let output = substitute_env_vars("# uses ${MERIDIAN_TEST_COMMENT_VAR}\nkey = 1").unwrap();
        assert!(output.contains("${MERIDIAN_TEST_COMMENT_VAR}"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config("/nonexistent/meridian.toml").unwrap_err();
        assert!(matches!(err, MeridianError::Configuration(_)));
    }
}

//! Domain error types
//!
//! The error hierarchy for Meridian. All errors are domain-specific and
//! don't expose third-party types; transport and driver errors are reduced
//! to strings at the adapter boundary.

use crate::domain::ids::PatientId;
use thiserror::Error;

/// Main Meridian error type
///
/// This is the primary error type used throughout the application. It wraps
/// the per-source error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum MeridianError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Patient API errors
    #[error("Patient API error: {0}")]
    Api(#[from] ApiError),

    /// Clinical database errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Patient-service errors
///
/// Failures while talking to the external patient API. A non-2xx status is
/// kept distinct from a network-layer failure even though both abort the
/// calling stage.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Health check failed; nothing else may run
    #[error("Patient service unavailable: health check returned status {status}")]
    ServiceUnavailable { status: u16 },

    /// Could not reach the service at all
    #[error("Failed to connect to patient service: {0}")]
    ConnectionFailed(String),

    /// The transport gave up waiting
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// A data endpoint answered with a non-success status
    #[error("Request to {endpoint} failed with status {status}")]
    RequestFailed { endpoint: String, status: u16 },

    /// The payload did not parse into the expected shape
    #[error("Failed to decode response from {endpoint}: {message}")]
    DecodeFailed { endpoint: String, message: String },

    /// The requested patient does not exist
    #[error("Patient not found: {0}")]
    PatientNotFound(PatientId),

    /// Create conflict; recoverable, the caller logs and moves on
    #[error("Patient already exists: {0}")]
    DuplicatePatient(PatientId),
}

/// Clinical-database errors
///
/// Failures while talking to PostgreSQL. Driver errors never leak; each
/// variant names the operation that failed.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Could not establish a connection at startup
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// A read statement failed
    #[error("Query '{context}' failed: {message}")]
    QueryFailed { context: String, message: String },

    /// A write statement failed
    #[error("Write to '{table}' failed: {message}")]
    WriteFailed { table: String, message: String },

    /// A returned row did not map into the expected shape
    #[error("Failed to decode row from '{context}': {message}")]
    RowDecode { context: String, message: String },

    /// A caller-supplied object name is not a bare SQL identifier
    #[error("Invalid table identifier: {0}")]
    InvalidIdentifier(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for MeridianError {
    fn from(err: std::io::Error) -> Self {
        MeridianError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for MeridianError {
    fn from(err: serde_json::Error) -> Self {
        MeridianError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for MeridianError {
    fn from(err: toml::de::Error) -> Self {
        MeridianError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meridian_error_display() {
        let err = MeridianError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_api_error_conversion() {
        let api_err = ApiError::ServiceUnavailable { status: 503 };
        let err: MeridianError = api_err.into();
        assert!(matches!(err, MeridianError::Api(_)));
    }

    #[test]
    fn test_database_error_conversion() {
        let db_err = DatabaseError::ConnectionFailed("refused".to_string());
        let err: MeridianError = db_err.into();
        assert!(matches!(err, MeridianError::Database(_)));
    }

    #[test]
    fn test_request_failed_names_endpoint() {
        let err = ApiError::RequestFailed {
            endpoint: "/patients".to_string(),
            status: 500,
        };
        assert_eq!(
            err.to_string(),
            "Request to /patients failed with status 500"
        );
    }

    #[test]
    fn test_duplicate_patient_is_distinguishable() {
        let err = ApiError::DuplicatePatient(PatientId::new(1011));
        assert!(matches!(err, ApiError::DuplicatePatient(id) if id.value() == 1011));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: MeridianError = io_err.into();
        assert!(matches!(err, MeridianError::Io(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: MeridianError = toml_err.into();
        assert!(matches!(err, MeridianError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_errors_implement_std_error() {
        let err = MeridianError::Other("x".to_string());
        let _: &dyn std::error::Error = &err;
        let api = ApiError::Timeout("deadline".to_string());
        let _: &dyn std::error::Error = &api;
        let db = DatabaseError::InvalidIdentifier("1bad".to_string());
        let _: &dyn std::error::Error = &db;
    }
}

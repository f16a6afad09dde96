//! Configuration management
//!
//! TOML configuration with `${VAR}` environment substitution, `MERIDIAN_*`
//! environment overrides, validation, and secrecy-wrapped credentials.

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::load_config;
pub use schema::{
    ApiConfig, ApplicationConfig, DatabaseConfig, DemoPatientConfig, LoggingConfig,
    MeridianConfig, PipelineConfig,
};
pub use secret::{SecretString, SecretValue};

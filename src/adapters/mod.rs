//! External integrations
//!
//! Adapters for the two data sources: the patient HTTP service and the
//! clinical PostgreSQL database. Each adapter exposes a trait the pipeline
//! core depends on, so the core never sees reqwest or tokio-postgres types.

pub mod api;
pub mod postgres;

//! Clinical database adapter
//!
//! Pooled PostgreSQL access behind the [`ClinicalStore`] trait seam.

pub mod client;
pub mod models;
pub mod store;

pub use client::PostgresClient;
pub use store::{ClinicalStore, PostgresStore};

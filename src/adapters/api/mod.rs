//! Patient service adapter
//!
//! HTTP access to the external patient API behind the [`PatientDirectory`]
//! trait seam.

pub mod client;
pub mod models;

pub use client::{HttpPatientDirectory, PatientDirectory};

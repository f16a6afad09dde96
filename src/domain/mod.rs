//! Domain models and types for Meridian.
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`PatientId`], [`InsuranceId`])
//! - **Source records** ([`PatientRecord`], [`VisitRecord`], [`Prescription`],
//!   [`LabResult`], [`VisitAggregate`])
//! - **The reconciled output** ([`PatientSummary`])
//! - **Error types** ([`MeridianError`], [`ApiError`], [`DatabaseError`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! Identifiers use the newtype pattern so a prescription id can never be
//! passed where a patient id is expected:
//!
//! ```
//! use meridian::domain::PatientId;
//!
//! let patient_id = PatientId::new(1001);
//! assert_eq!(patient_id.value(), 1001);
//! ```
//!
//! The reconciled [`PatientSummary`] carries unsigned counts: once the merge
//! has run, "activity counts are never null" is a property of the type, not
//! a convention downstream code has to remember.

pub mod clinical;
pub mod errors;
pub mod ids;
pub mod patient;
pub mod result;
pub mod summary;

// Re-export commonly used types for convenience
pub use clinical::{LabResult, Prescription, VisitAggregate, VisitRecord};
pub use errors::{ApiError, DatabaseError, MeridianError};
pub use ids::{InsuranceId, PatientId};
pub use patient::{ApiStatistics, HealthStatus, PatientRecord};
pub use result::Result;
pub use summary::PatientSummary;
